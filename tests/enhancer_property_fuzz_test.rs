use page_enhancer::{EnhancerConfig, Harness, Result, RevertPolicy};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const ENHANCER_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/enhancer_property_fuzz_test.txt";
const DEFAULT_ENHANCER_PROPTEST_CASES: u32 = 96;

const PARAMETER_FORM_HTML: &str = r#"
<form>
  <div class="stSlider" id="qubits-slider">
    <input id="qubits" type="range" name="num_qubits" value="4">
  </div>
  <input id="label" name="dataset_label" value="run">
  <textarea id="notes" name="notes">initial</textarea>
  <span id="help" data-tooltip="Depth of the circuit">?</span>
</form>
<div class="stButton"><button id="generate">Generate Data</button></div>
<section id="results" class="results-container"></section>
"#;

#[derive(Clone, Debug)]
enum PointerAction {
    Enter,
    Leave,
}

#[derive(Clone, Debug)]
enum PressAction {
    Click,
    Wait(u64),
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn enhancer_proptest_cases() -> u32 {
    env_proptest_cases(
        "PAGE_ENHANCER_PROPTEST_CASES",
        DEFAULT_ENHANCER_PROPTEST_CASES,
    )
}

fn field_value_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('z'),
            Just('0'),
            Just('7'),
            Just(' '),
            Just('-'),
            Just('"'),
            Just('\\'),
            Just('{'),
            Just('}'),
            Just('é'),
            Just('量'),
        ],
        0..=12,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn pointer_actions_strategy() -> BoxedStrategy<Vec<PointerAction>> {
    vec(
        prop_oneof![
            3 => Just(PointerAction::Enter),
            2 => Just(PointerAction::Leave),
        ],
        1..=24,
    )
    .boxed()
}

fn press_actions_strategy() -> BoxedStrategy<Vec<PressAction>> {
    vec(
        prop_oneof![
            2 => Just(PressAction::Click),
            3 => (1u64..=200).prop_map(PressAction::Wait),
        ],
        1..=20,
    )
    .boxed()
}

fn fail(err: page_enhancer::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn tooltip_count(harness: &Harness) -> Result<usize> {
    Ok(harness.page().select_all(".custom-tooltip")?.len())
}

fn assert_round_trip(qubits: &str, label: &str, notes: &str) -> TestCaseResult {
    let mut harness = Harness::from_html(PARAMETER_FORM_HTML).map_err(fail)?;
    harness.type_text("#qubits", qubits).map_err(fail)?;
    harness.type_text("#label", label).map_err(fail)?;
    harness.type_text("#notes", notes).map_err(fail)?;

    let harness = harness.reload(PARAMETER_FORM_HTML).map_err(fail)?;
    prop_assert!(harness.report().is_clean(), "report: {:?}", harness.report());
    prop_assert_eq!(harness.page().value_of("#qubits").map_err(fail)?, qubits);
    prop_assert_eq!(harness.page().value_of("#label").map_err(fail)?, label);
    // textarea is not part of the `input, select` scan
    prop_assert_eq!(harness.page().value_of("#notes").map_err(fail)?, "initial");
    Ok(())
}

fn assert_single_tooltip(actions: &[PointerAction]) -> TestCaseResult {
    let mut harness = Harness::from_html(PARAMETER_FORM_HTML).map_err(fail)?;
    let mut shown = false;
    for (step, action) in actions.iter().enumerate() {
        match action {
            PointerAction::Enter => {
                harness.hover("#help").map_err(fail)?;
                shown = true;
            }
            PointerAction::Leave => {
                harness.unhover("#help").map_err(fail)?;
                shown = false;
            }
        }
        let count = tooltip_count(&harness).map_err(fail)?;
        prop_assert_eq!(
            count,
            usize::from(shown),
            "step {}: {:?}, actions={:?}",
            step,
            action,
            actions
        );
    }
    Ok(())
}

fn assert_entrance_is_monotonic(observations: &[bool]) -> TestCaseResult {
    let mut harness = Harness::from_html(PARAMETER_FORM_HTML).map_err(fail)?;
    let mut seen = false;
    for (step, intersecting) in observations.iter().enumerate() {
        harness
            .set_intersecting("#results", *intersecting)
            .map_err(fail)?;
        seen |= *intersecting;
        let tagged = harness
            .page()
            .has_class("#results", "fadeInUp")
            .map_err(fail)?;
        prop_assert_eq!(tagged, seen, "step {}: observations={:?}", step, observations);
    }
    Ok(())
}

fn assert_press_lasts_full_delay(actions: &[PressAction]) -> TestCaseResult {
    let mut config = EnhancerConfig::default();
    config.revert_policy = RevertPolicy::CancelPrevious;
    let mut harness = Harness::with_config(PARAMETER_FORM_HTML, config).map_err(fail)?;
    let mut last_click: Option<u64> = None;
    for (step, action) in actions.iter().enumerate() {
        match action {
            PressAction::Click => {
                harness.click("#generate").map_err(fail)?;
                last_click = Some(harness.page().now_ms());
            }
            PressAction::Wait(ms) => harness.advance_time(*ms).map_err(fail)?,
        }
        let now = harness.page().now_ms();
        let expected = match last_click {
            Some(at) if now < at + 150 => "scale(0.98)",
            _ => "",
        };
        let actual = harness
            .page()
            .style("#generate", "transform")
            .map_err(fail)?;
        prop_assert_eq!(actual.as_str(), expected, "step {}: actions={:?}", step, actions);
        prop_assert!(harness.page().pending_timers().len() <= 1);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: enhancer_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(ENHANCER_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn saved_parameters_restore_after_reload(
        qubits in field_value_strategy(),
        label in field_value_strategy(),
        notes in field_value_strategy(),
    ) {
        assert_round_trip(&qubits, &label, &notes)?;
    }

    #[test]
    fn hovering_never_duplicates_tooltip(actions in pointer_actions_strategy()) {
        assert_single_tooltip(&actions)?;
    }

    #[test]
    fn entrance_class_is_never_removed(observations in vec(any::<bool>(), 1..=16)) {
        assert_entrance_is_monotonic(&observations)?;
    }

    #[test]
    fn press_feedback_tracks_last_click(actions in press_actions_strategy()) {
        assert_press_lasts_full_delay(&actions)?;
    }
}
