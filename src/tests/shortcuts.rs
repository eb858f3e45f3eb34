use super::*;

#[test]
fn ctrl_g_clicks_generate_button_with_feedback() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.key_down(KeyPress::ctrl("g"))?;

    assert!(h.last_default_prevented());
    assert_eq!(h.activations(), &[h.select("#generate")?]);
    h.assert_style("#generate", "transform", "scale(0.98)")?;
    h.advance_time(150)?;
    h.assert_style("#generate", "transform", "")?;
    Ok(())
}

#[test]
fn ctrl_d_clicks_secondary_button() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.key_down(KeyPress::ctrl("d"))?;

    assert!(h.last_default_prevented());
    assert_eq!(h.activations(), &[h.select("#download")?]);
    Ok(())
}

#[test]
fn generate_chord_without_generate_button_is_suppressed_noop() -> Result<()> {
    let html = r#"
        <div class='stButton'><button id='reset'>Reset</button></div>
        <div class='stButton'><button id='export'>Export</button></div>
    "#;
    let mut h = Harness::from_html(html)?;
    h.key_down(KeyPress::ctrl("g"))?;

    assert!(h.last_default_prevented());
    assert!(h.activations().is_empty());
    h.assert_style("#reset", "transform", "")?;
    Ok(())
}

#[test]
fn generate_chord_finds_generate_button_after_others() -> Result<()> {
    let html = r#"
        <div class='stButton'><button id='reset'>Reset</button></div>
        <div class='stButton'><button id='go'>
            <span>Generate</span>   Quantum   Data
        </button></div>
    "#;
    let mut h = Harness::from_html(html)?;
    h.key_down(KeyPress::ctrl("g"))?;
    assert_eq!(h.activations(), &[h.select("#go")?]);
    h.assert_style("#reset", "transform", "")?;
    h.assert_style("#go", "transform", "scale(0.98)")?;
    Ok(())
}

#[test]
fn download_chord_without_secondary_button_is_suppressed_noop() -> Result<()> {
    let mut h = Harness::from_html("<button id='primary'>Download</button>")?;
    h.key_down(KeyPress::ctrl("d"))?;
    assert!(h.last_default_prevented());
    assert!(h.activations().is_empty());
    Ok(())
}

#[test]
fn other_keys_pass_through() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    let presses = [
        KeyPress::plain("g"),
        KeyPress::ctrl("G"),
        KeyPress::ctrl("s"),
        KeyPress::meta("g"),
        KeyPress::plain("Enter"),
    ];
    for press in presses {
        h.key_down(press.clone())?;
        assert!(!h.last_default_prevented(), "{press:?} should pass through");
    }
    assert!(h.activations().is_empty());
    Ok(())
}

#[test]
fn meta_modifier_can_be_configured() -> Result<()> {
    let mut config = EnhancerConfig::default();
    config.shortcuts.modifier = ShortcutModifier::Meta;
    let mut h = Harness::with_config(GENERATOR_PAGE, config)?;

    h.key_down(KeyPress::ctrl("g"))?;
    assert!(!h.last_default_prevented());
    h.key_down(KeyPress::meta("g"))?;
    assert!(h.last_default_prevented());
    assert_eq!(h.activations(), &[h.select("#generate")?]);
    Ok(())
}

#[test]
fn ctrl_or_meta_accepts_either_modifier() -> Result<()> {
    let mut config = EnhancerConfig::default();
    config.shortcuts.modifier = ShortcutModifier::CtrlOrMeta;
    let mut h = Harness::with_config(GENERATOR_PAGE, config)?;

    h.key_down(KeyPress::ctrl("d"))?;
    h.key_down(KeyPress::meta("d"))?;
    let download = h.select("#download")?;
    assert_eq!(h.activations(), &[download, download]);
    Ok(())
}

#[test]
fn disabled_generate_button_is_not_clicked() -> Result<()> {
    let html = "<div class='stButton'><button id='go' disabled>Generate</button></div>";
    let mut h = Harness::from_html(html)?;
    h.key_down(KeyPress::ctrl("g"))?;
    assert!(h.last_default_prevented());
    h.assert_style("#go", "transform", "")?;
    Ok(())
}

#[test]
fn decomposed_label_matches_composed_label() -> Result<()> {
    let mut config = EnhancerConfig::default();
    config.shortcuts.generate_label = "Générer".to_string();
    let html = "<div class='stButton'><button id='go'>Ge\u{301}ne\u{301}rer les données</button></div>";
    let mut h = Harness::with_config(html, config)?;
    h.key_down(KeyPress::ctrl("g"))?;
    assert_eq!(h.activations(), &[h.select("#go")?]);
    Ok(())
}
