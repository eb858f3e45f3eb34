use tracing::{debug, trace};

use crate::Result;
use crate::events::{Binding, EventKind, HostEvent, ListenTarget};
use crate::host::{Host, ScrollAlign, ScrollBehavior};

/// Smooth scrolling for in-page fragment links.
#[derive(Debug, Clone, Default)]
pub struct SmoothAnchors;

impl SmoothAnchors {
    pub fn bind<H: Host>(&self, host: &mut H, selector: &str) -> Result<usize> {
        let anchors = host.query_all(selector)?;
        for anchor in &anchors {
            host.listen(
                ListenTarget::Node(anchor.clone()),
                EventKind::Click,
                Binding::AnchorClick,
            )?;
        }
        debug!(count = anchors.len(), "bound fragment links");
        Ok(anchors.len())
    }

    /// The default navigation is always suppressed. The fragment is read at
    /// click time; a missing or unusable target means no scroll.
    pub fn on_click<H: Host>(&self, host: &mut H, event: &mut HostEvent<H::Node>) -> Result<()> {
        event.prevent_default();
        let Some(anchor) = event.current_target.clone() else {
            return Ok(());
        };
        let Some(href) = host.attribute(&anchor, "href") else {
            return Ok(());
        };
        if href == "#" {
            return Ok(());
        }
        let target = match host.query_first(&href) {
            Ok(target) => target,
            Err(err) => {
                trace!(%href, %err, "fragment is not a usable selector");
                None
            }
        };
        if let Some(target) = target {
            host.scroll_into_view(&target, ScrollBehavior::Smooth, ScrollAlign::Start)?;
        }
        Ok(())
    }
}
