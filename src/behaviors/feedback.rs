use tracing::debug;

use crate::Result;
use crate::config::{RevertPolicy, Timing};
use crate::events::{Binding, EventKind, ListenTarget};
use crate::host::{Host, StyleProperty, TimerId, TimerTask};

#[derive(Debug, Clone)]
struct Control<N> {
    node: N,
    pending_revert: Option<TimerId>,
}

impl<N> Control<N> {
    fn new(node: N) -> Self {
        Self {
            node,
            pending_revert: None,
        }
    }
}

/// Short-lived inline styles on primary buttons (press) and slider
/// containers (glow).
#[derive(Debug, Clone)]
pub struct ControlFeedback<N> {
    buttons: Vec<Control<N>>,
    sliders: Vec<Control<N>>,
    timing: Timing,
    policy: RevertPolicy,
}

impl<N: Clone + PartialEq> ControlFeedback<N> {
    pub fn new(timing: Timing, policy: RevertPolicy) -> Self {
        Self {
            buttons: Vec::new(),
            sliders: Vec::new(),
            timing,
            policy,
        }
    }

    pub fn bind_buttons<H: Host<Node = N>>(&mut self, host: &mut H, selector: &str) -> Result<usize> {
        for node in host.query_all(selector)? {
            let index = self.buttons.len();
            host.listen(
                ListenTarget::Node(node.clone()),
                EventKind::Click,
                Binding::PressFeedback(index),
            )?;
            self.buttons.push(Control::new(node));
        }
        debug!(count = self.buttons.len(), "bound press feedback");
        Ok(self.buttons.len())
    }

    pub fn bind_sliders<H: Host<Node = N>>(&mut self, host: &mut H, selector: &str) -> Result<usize> {
        for node in host.query_all(selector)? {
            let index = self.sliders.len();
            host.listen(
                ListenTarget::Node(node.clone()),
                EventKind::Input,
                Binding::SliderGlow(index),
            )?;
            self.sliders.push(Control::new(node));
        }
        debug!(count = self.sliders.len(), "bound slider glow");
        Ok(self.sliders.len())
    }

    pub fn press<H: Host<Node = N>>(&mut self, host: &mut H, index: usize) -> Result<()> {
        let Some(control) = self.buttons.get_mut(index) else {
            return Ok(());
        };
        apply(
            host,
            control,
            self.policy,
            StyleProperty::Transform,
            &self.timing.press_transform,
            self.timing.press_revert_ms,
        )
    }

    pub fn glow<H: Host<Node = N>>(&mut self, host: &mut H, index: usize) -> Result<()> {
        let Some(control) = self.sliders.get_mut(index) else {
            return Ok(());
        };
        apply(
            host,
            control,
            self.policy,
            StyleProperty::BoxShadow,
            &self.timing.glow_shadow,
            self.timing.glow_revert_ms,
        )
    }
}

fn apply<H: Host>(
    host: &mut H,
    control: &mut Control<H::Node>,
    policy: RevertPolicy,
    property: StyleProperty,
    value: &str,
    revert_after_ms: u32,
) -> Result<()> {
    if policy == RevertPolicy::CancelPrevious {
        if let Some(previous) = control.pending_revert.take() {
            host.clear_timeout(previous);
        }
    }
    host.set_style(&control.node, property, value)?;
    let id = host.set_timeout(
        revert_after_ms,
        TimerTask::ClearStyle {
            node: control.node.clone(),
            property,
        },
    )?;
    control.pending_revert = Some(id);
    Ok(())
}
