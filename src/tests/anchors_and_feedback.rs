use super::*;

#[test]
fn fragment_link_scrolls_smoothly_to_target() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.click("#jump")?;

    assert!(h.last_default_prevented());
    let results = h.select("#results")?;
    assert_eq!(
        h.scrolls(),
        &[ScrollRecord {
            node: results,
            behavior: ScrollBehavior::Smooth,
            align: ScrollAlign::Start,
        }]
    );
    Ok(())
}

#[test]
fn fragment_link_without_target_is_suppressed_silently() -> Result<()> {
    let html = r#"
        <a id='missing' href='#nowhere'>missing</a>
        <a id='bare' href='#'>top</a>
        <a id='odd' href='#a:b'>odd</a>
        <a id='external' href='https://example.com/#results'>external</a>
        <section id='results'></section>
    "#;
    let mut h = Harness::from_html(html)?;

    for link in ["#missing", "#bare", "#odd"] {
        h.click(link)?;
        assert!(h.last_default_prevented(), "{link} should be suppressed");
    }
    assert!(h.scrolls().is_empty());

    h.click("#external")?;
    assert!(!h.last_default_prevented());
    assert!(h.scrolls().is_empty());
    Ok(())
}

#[test]
fn primary_button_press_reverts_after_delay() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.click("#generate")?;
    h.assert_style("#generate", "transform", "scale(0.98)")?;

    h.advance_time(149)?;
    h.assert_style("#generate", "transform", "scale(0.98)")?;
    h.advance_time(1)?;
    h.assert_style("#generate", "transform", "")?;
    assert!(h.page().pending_timers().is_empty());
    Ok(())
}

#[test]
fn cancel_previous_policy_extends_effect() -> Result<()> {
    let mut config = EnhancerConfig::default();
    config.revert_policy = RevertPolicy::CancelPrevious;
    let mut h = Harness::with_config(GENERATOR_PAGE, config)?;
    h.click("#generate")?;
    h.advance_time(100)?;
    h.click("#generate")?;
    assert_eq!(h.page().pending_timers().len(), 1);

    h.advance_time(50)?;
    h.assert_style("#generate", "transform", "scale(0.98)")?;
    h.advance_time(100)?;
    h.assert_style("#generate", "transform", "")?;
    Ok(())
}

#[test]
fn repeated_press_keeps_independent_reverts_by_default() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;

    h.click("#generate")?;
    h.advance_time(100)?;
    h.click("#generate")?;
    assert_eq!(h.page().pending_timers().len(), 2);

    h.advance_time(50)?;
    h.assert_style("#generate", "transform", "")?;
    h.advance_time(100)?;
    h.assert_style("#generate", "transform", "")?;
    assert!(h.page().pending_timers().is_empty());
    Ok(())
}

#[test]
fn slider_input_glows_its_container() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.type_text("#qubits", "8")?;

    h.assert_style(
        "#qubits-slider",
        "box-shadow",
        "0 0 10px rgba(102, 126, 234, 0.3)",
    )?;
    h.assert_style("#shots-slider", "box-shadow", "")?;

    h.advance_time(299)?;
    h.assert_style(
        "#qubits-slider",
        "box-shadow",
        "0 0 10px rgba(102, 126, 234, 0.3)",
    )?;
    h.advance_time(1)?;
    h.assert_style("#qubits-slider", "box-shadow", "")?;
    Ok(())
}

#[test]
fn sliders_keep_separate_revert_timers() -> Result<()> {
    let mut h = Harness::from_html(GENERATOR_PAGE)?;
    h.type_text("#qubits", "8")?;
    h.advance_time(200)?;
    h.type_text("#shots", "2048")?;

    h.advance_time(100)?;
    h.assert_style("#qubits-slider", "box-shadow", "")?;
    h.assert_style(
        "#shots-slider",
        "box-shadow",
        "0 0 10px rgba(102, 126, 234, 0.3)",
    )?;
    h.flush()?;
    h.assert_style("#shots-slider", "box-shadow", "")?;
    assert_eq!(h.page().now_ms(), 500);
    Ok(())
}

#[test]
fn existing_inline_styles_survive_revert() -> Result<()> {
    let html = r#"
        <div class='stButton'><button id='b' style='color: red'>Run</button></div>
    "#;
    let mut h = Harness::from_html(html)?;
    h.click("#b")?;
    h.advance_time(150)?;
    h.assert_style("#b", "transform", "")?;
    h.assert_style("#b", "color", "red")?;
    Ok(())
}

#[test]
fn buttons_outside_streamlit_wrapper_get_no_feedback() -> Result<()> {
    let html = r#"
        <div class='stButton'><span><button id='nested'>Nested</button></span></div>
        <button id='loose'>Loose</button>
    "#;
    let mut h = Harness::from_html(html)?;
    h.click("#nested")?;
    h.click("#loose")?;
    h.assert_style("#nested", "transform", "")?;
    h.assert_style("#loose", "transform", "")?;
    assert!(h.page().pending_timers().is_empty());
    Ok(())
}
