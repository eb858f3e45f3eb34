use tracing::debug;

use crate::Result;
use crate::events::IntersectionEntry;
use crate::host::Host;

/// Tags observed containers with an entrance class the first time they
/// scroll into view. The class is never removed.
#[derive(Debug, Clone)]
pub struct VisibilityBinder {
    class_name: String,
}

impl VisibilityBinder {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }

    pub fn bind<H: Host>(&self, host: &mut H, selector: &str) -> Result<usize> {
        let containers = host.query_all(selector)?;
        for container in &containers {
            host.observe_visibility(container)?;
        }
        debug!(count = containers.len(), "observing result containers");
        Ok(containers.len())
    }

    pub fn on_entries<H: Host>(
        &self,
        host: &mut H,
        entries: &[IntersectionEntry<H::Node>],
    ) -> Result<()> {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            host.add_class(&entry.target, &self.class_name)?;
        }
        Ok(())
    }
}
