use tracing::debug;

use crate::Result;
use crate::core_dom_utils::format_px;
use crate::events::{Binding, EventKind, ListenTarget};
use crate::host::{Host, StyleProperty};

#[derive(Debug, Clone)]
struct Tooltip<N> {
    trigger: N,
    node: N,
}

/// One floating annotation per trigger. The tooltip node is built once at
/// bind time and moved in and out of `body` on hover.
#[derive(Debug, Clone)]
pub struct TooltipManager<N> {
    tooltips: Vec<Tooltip<N>>,
    class_name: String,
    attribute: String,
    gap_px: f64,
}

impl<N: Clone + PartialEq> TooltipManager<N> {
    pub fn new(class_name: impl Into<String>, attribute: impl Into<String>, gap_px: f64) -> Self {
        Self {
            tooltips: Vec::new(),
            class_name: class_name.into(),
            attribute: attribute.into(),
            gap_px,
        }
    }

    pub fn bind<H: Host<Node = N>>(&mut self, host: &mut H, selector: &str) -> Result<usize> {
        for trigger in host.query_all(selector)? {
            let text = host.attribute(&trigger, &self.attribute).unwrap_or_default();
            let node = host.create_element("div", &self.class_name)?;
            host.set_text(&node, &text)?;

            let index = self.tooltips.len();
            host.listen(
                ListenTarget::Node(trigger.clone()),
                EventKind::MouseEnter,
                Binding::TooltipEnter(index),
            )?;
            host.listen(
                ListenTarget::Node(trigger.clone()),
                EventKind::MouseLeave,
                Binding::TooltipLeave(index),
            )?;
            self.tooltips.push(Tooltip { trigger, node });
        }
        debug!(count = self.tooltips.len(), "bound tooltips");
        Ok(self.tooltips.len())
    }

    /// The tooltip node of the `index`-th trigger.
    pub fn tooltip(&self, index: usize) -> Option<&N> {
        self.tooltips.get(index).map(|tooltip| &tooltip.node)
    }

    pub fn len(&self) -> usize {
        self.tooltips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tooltips.is_empty()
    }

    /// Height is read after attaching; a detached node has none.
    pub fn show<H: Host<Node = N>>(&self, host: &mut H, index: usize) -> Result<()> {
        let Some(tooltip) = self.tooltips.get(index) else {
            return Ok(());
        };
        let Some(body) = host.body() else {
            return Ok(());
        };
        host.append_child(&body, &tooltip.node)?;
        let rect = host.bounding_rect(&tooltip.trigger)?;
        let height = host.offset_height(&tooltip.node)?;
        host.set_style(&tooltip.node, StyleProperty::Left, &format_px(rect.left))?;
        host.set_style(
            &tooltip.node,
            StyleProperty::Top,
            &format_px(rect.top - height - self.gap_px),
        )?;
        host.set_style(&tooltip.node, StyleProperty::Opacity, "1")
    }

    pub fn hide<H: Host<Node = N>>(&self, host: &mut H, index: usize) -> Result<()> {
        if let Some(tooltip) = self.tooltips.get(index) {
            host.detach(&tooltip.node)?;
        }
        Ok(())
    }
}
