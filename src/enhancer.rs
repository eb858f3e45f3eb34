use std::fmt;

use tracing::{info, warn};

use crate::behaviors::{
    ControlFeedback, ErrorReporter, ParameterStore, ShortcutDispatcher, SmoothAnchors,
    TooltipManager, VisibilityBinder, progress, stylesheet,
};
use crate::config::EnhancerConfig;
use crate::events::{Binding, HostEvent, IntersectionEntry};
use crate::host::Host;
use crate::{Error, Result};

/// Initialization units, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Stylesheet,
    Anchors,
    Visibility,
    PressFeedback,
    SliderGlow,
    Tooltips,
    ErrorReporter,
    Shortcuts,
    ParameterLoad,
    ParameterSave,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stylesheet => "stylesheet",
            Self::Anchors => "anchors",
            Self::Visibility => "visibility",
            Self::PressFeedback => "press-feedback",
            Self::SliderGlow => "slider-glow",
            Self::Tooltips => "tooltips",
            Self::ErrorReporter => "error-reporter",
            Self::Shortcuts => "shortcuts",
            Self::ParameterLoad => "parameter-load",
            Self::ParameterSave => "parameter-save",
        };
        f.write_str(name)
    }
}

/// Failures contained during [`Enhancer::initialize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    pub failures: Vec<(Component, Error)>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, component: Component) -> Option<&Error> {
        self.failures
            .iter()
            .find(|(failed, _)| *failed == component)
            .map(|(_, err)| err)
    }
}

/// The initialized enhancement layer for one document.
///
/// `N` is the host's node handle. Events fired by the host come back through
/// [`Enhancer::handle`] with the [`Binding`] they were registered under.
#[derive(Debug, Clone)]
pub struct Enhancer<N> {
    config: EnhancerConfig,
    anchors: SmoothAnchors,
    visibility: VisibilityBinder,
    feedback: ControlFeedback<N>,
    tooltips: TooltipManager<N>,
    shortcuts: ShortcutDispatcher,
    parameters: ParameterStore,
    errors: ErrorReporter,
    report: InitReport,
}

impl<N: Clone + PartialEq + fmt::Debug> Enhancer<N> {
    /// Binds every behavior to `host`. A component that fails is recorded in
    /// the [`InitReport`] and the remaining ones still bind.
    pub fn initialize<H: Host<Node = N>>(host: &mut H, config: EnhancerConfig) -> Self {
        let mut enhancer = Self {
            anchors: SmoothAnchors,
            visibility: VisibilityBinder::new(config.classes.entrance.clone()),
            feedback: ControlFeedback::new(config.timing.clone(), config.revert_policy),
            tooltips: TooltipManager::new(
                config.classes.tooltip.clone(),
                config.tooltip_attribute.clone(),
                config.timing.tooltip_gap_px,
            ),
            shortcuts: ShortcutDispatcher::new(
                config.shortcuts.clone(),
                config.selectors.primary_buttons.clone(),
                config.selectors.secondary_button.clone(),
            ),
            parameters: ParameterStore::new(
                config.storage_key.clone(),
                config.selectors.named_inputs.clone(),
            ),
            errors: ErrorReporter::new(config.error_prefix.clone()),
            report: InitReport::default(),
            config,
        };
        let selectors = enhancer.config.selectors.clone();

        let result = stylesheet::inject(host).map(drop);
        enhancer.contain(Component::Stylesheet, result);

        let result = enhancer.anchors.bind(host, &selectors.anchors).map(drop);
        enhancer.contain(Component::Anchors, result);

        let result = enhancer
            .visibility
            .bind(host, &selectors.results_containers)
            .map(drop);
        enhancer.contain(Component::Visibility, result);

        let result = enhancer
            .feedback
            .bind_buttons(host, &selectors.primary_buttons)
            .map(drop);
        enhancer.contain(Component::PressFeedback, result);

        let result = enhancer
            .feedback
            .bind_sliders(host, &selectors.sliders)
            .map(drop);
        enhancer.contain(Component::SliderGlow, result);

        let result = enhancer
            .tooltips
            .bind(host, &selectors.tooltip_triggers)
            .map(drop);
        enhancer.contain(Component::Tooltips, result);

        let result = enhancer.errors.bind(host);
        enhancer.contain(Component::ErrorReporter, result);

        let result = enhancer.shortcuts.bind(host);
        enhancer.contain(Component::Shortcuts, result);

        let result = enhancer.parameters.load(host).map(drop);
        enhancer.contain(Component::ParameterLoad, result);

        let result = enhancer.parameters.bind(host);
        enhancer.contain(Component::ParameterSave, result);

        info!(
            failures = enhancer.report.failures.len(),
            "page enhancements loaded"
        );
        if !enhancer.config.loaded_message.is_empty() {
            host.console_log(&enhancer.config.loaded_message);
        }
        enhancer
    }

    fn contain(&mut self, component: Component, result: Result<()>) {
        if let Err(err) = result {
            warn!(%component, %err, "component failed to initialize");
            self.report.failures.push((component, err));
        }
    }

    /// Runs the behavior registered under `binding`. Storage failures while
    /// saving are logged and swallowed; other errors are returned.
    pub fn handle<H: Host<Node = N>>(
        &mut self,
        host: &mut H,
        binding: Binding,
        event: &mut HostEvent<N>,
    ) -> Result<()> {
        match binding {
            Binding::AnchorClick => self.anchors.on_click(host, event),
            Binding::PressFeedback(index) => self.feedback.press(host, index),
            Binding::SliderGlow(index) => self.feedback.glow(host, index),
            Binding::TooltipEnter(index) => self.tooltips.show(host, index),
            Binding::TooltipLeave(index) => self.tooltips.hide(host, index),
            Binding::Shortcut => self.shortcuts.on_key_down(host, event),
            Binding::SaveParameters => {
                if let Err(err) = self.parameters.save(host) {
                    warn!(%err, "could not save parameters");
                }
                Ok(())
            }
            Binding::ReportError => {
                self.errors.report(host, event);
                Ok(())
            }
        }
    }

    /// Delivers a batch of viewport observations.
    pub fn on_intersection<H: Host<Node = N>>(
        &self,
        host: &mut H,
        entries: &[IntersectionEntry<N>],
    ) -> Result<()> {
        self.visibility.on_entries(host, entries)
    }

    /// A new, detached progress widget.
    pub fn progress_widget<H: Host<Node = N>>(&self, host: &mut H) -> Result<N> {
        progress::build(host, &self.config.classes, &self.config.progress_message)
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn report(&self) -> &InitReport {
        &self.report
    }

    pub fn tooltips(&self) -> &TooltipManager<N> {
        &self.tooltips
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }
}
