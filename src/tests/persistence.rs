use std::collections::BTreeMap;

use super::*;
use crate::behaviors::ParameterSnapshot;

const STORAGE_KEY: &str = "quantumGeneratorParams";

fn stored(record: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(STORAGE_KEY.to_string(), record.to_string())])
}

fn stored_snapshot(h: &Harness) -> Result<ParameterSnapshot> {
    let record = h
        .storage_record()
        .ok_or_else(|| Error::Storage("nothing stored".into()))?;
    ParameterSnapshot::from_json(record)
}

#[test]
fn input_saves_every_named_control() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    assert!(h.storage_record().is_none());

    h.type_text("#qubits", "7")?;
    let snapshot = stored_snapshot(&h)?;
    assert_eq!(snapshot.get("num_qubits"), Some("7"));
    assert_eq!(snapshot.get("shots"), Some("1024"));
    assert_eq!(snapshot.get("backend"), Some("qasm"));
    assert_eq!(snapshot.len(), 3);
    Ok(())
}

#[test]
fn unnamed_control_input_still_saves_snapshot() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.type_text("#scratch", "notes")?;
    let snapshot = stored_snapshot(&h)?;
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.iter().all(|(_, value)| value != "notes"));
    Ok(())
}

#[test]
fn reload_restores_saved_values() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.type_text("#qubits", "9")?;
    h.type_text("#backend", "statevector")?;

    let h = h.reload(GENERATOR_PAGE)?;
    assert!(h.report().is_clean());
    h.assert_value("#qubits", "9")?;
    h.assert_value("#shots", "1024")?;
    h.assert_value("#backend", "statevector")?;
    Ok(())
}

#[test]
fn names_missing_from_new_page_are_skipped() -> Result<()> {
    let record = r#"{"num_qubits":"12","retired_param":"x"}"#;
    let h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(record))?;
    assert!(h.report().is_clean());
    h.assert_value("#qubits", "12")?;
    assert!(h.page().select("[name='retired_param']").is_err());
    Ok(())
}

#[test]
fn malformed_record_leaves_rendered_defaults() -> Result<()> {
    for record in ["not-json", "[1,2,3]", "42"] {
        let mut h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(record))?;
        assert!(
            matches!(
                h.report().failure(Component::ParameterLoad),
                Some(Error::MalformedSnapshot(_))
            ),
            "{record} should be reported"
        );
        h.assert_value("#qubits", "4")?;
        h.assert_value("#backend", "qasm")?;

        h.click("#generate")?;
        h.assert_style("#generate", "transform", "scale(0.98)")?;
        h.type_text("#qubits", "5")?;
        assert_eq!(stored_snapshot(&h)?.get("num_qubits"), Some("5"));
    }
    Ok(())
}

#[test]
fn numeric_values_are_restored_as_text() -> Result<()> {
    let record = r#"{"num_qubits":6,"shots":2048.5}"#;
    let h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(record))?;
    h.assert_value("#qubits", "6")?;
    h.assert_value("#shots", "2048.5")?;
    Ok(())
}

#[test]
fn null_entry_does_not_block_other_parameters() -> Result<()> {
    let html = "<input id='qubits' name='qubits' value='2'><input id='notes' name='notes' value='n'>";
    let h = Harness::from_html_with_storage(html, stored(r#"{"qubits":"7","notes":null}"#))?;
    assert!(h.report().is_clean(), "report: {:?}", h.report());
    h.assert_value("#qubits", "7")?;
    h.assert_value("#notes", "")?;
    Ok(())
}

#[test]
fn nested_entry_is_skipped_and_others_restored() -> Result<()> {
    let record = r#"{"num_qubits":{"nested":1},"shots":"512"}"#;
    let h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(record))?;
    assert!(h.report().is_clean());
    h.assert_value("#qubits", "4")?;
    h.assert_value("#shots", "512")?;
    Ok(())
}

#[test]
fn unknown_select_option_clears_selection() -> Result<()> {
    let h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(r#"{"backend":"gpu"}"#))?;
    h.assert_value("#backend", "")?;
    Ok(())
}

#[test]
fn later_control_wins_when_names_collide() -> Result<()> {
    let html = r#"
        <input id='first' name='seed' value='1'>
        <input id='second' name='seed' value='2'>
    "#;
    let mut h = Harness::from_html(html)?;
    h.type_text("#first", "10")?;
    assert_eq!(stored_snapshot(&h)?.get("seed"), Some("2"));
    Ok(())
}

#[test]
fn restore_targets_first_control_with_name() -> Result<()> {
    let html = r#"
        <input id='first' name='seed' value='1'>
        <input id='second' name='seed' value='2'>
    "#;
    let h = Harness::from_html_with_storage(html, stored(r#"{"seed":"99"}"#))?;
    h.assert_value("#first", "99")?;
    h.assert_value("#second", "2")?;
    Ok(())
}

#[test]
fn unavailable_storage_is_contained() -> Result<()> {
    let mut page = Page::from_html(GENERATOR_PAGE)?;
    page.set_storage_failure(Some("SecurityError: storage disabled"));
    let mut h = Harness::from_page(page, EnhancerConfig::default())?;

    assert!(matches!(
        h.report().failure(Component::ParameterLoad),
        Some(Error::Storage(_))
    ));
    h.type_text("#qubits", "5")?;
    h.assert_value("#qubits", "5")?;
    h.assert_style(
        "#qubits-slider",
        "box-shadow",
        "0 0 10px rgba(102, 126, 234, 0.3)",
    )?;
    assert!(h.storage_record().is_none());
    Ok(())
}

#[test]
fn snapshot_record_is_overwritten_not_merged() -> Result<()> {
    let record = r#"{"num_qubits":"3","legacy":"keep-me?"}"#;
    let mut h = Harness::from_html_with_storage(GENERATOR_PAGE, stored(record))?;
    h.type_text("#shots", "16")?;
    let snapshot = stored_snapshot(&h)?;
    assert_eq!(snapshot.get("legacy"), None);
    assert_eq!(snapshot.get("num_qubits"), Some("3"));
    assert_eq!(snapshot.get("shots"), Some("16"));
    Ok(())
}
