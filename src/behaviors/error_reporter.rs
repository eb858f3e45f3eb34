use tracing::error;

use crate::Result;
use crate::events::{Binding, EventKind, HostEvent, ListenTarget};
use crate::host::Host;

/// Mirrors uncaught page errors to the console. The error keeps propagating
/// to the browser's own handling.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    prefix: String,
}

impl ErrorReporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn bind<H: Host>(&self, host: &mut H) -> Result<()> {
        host.listen(ListenTarget::Window, EventKind::Error, Binding::ReportError)
    }

    pub fn report<H: Host>(&self, host: &mut H, event: &HostEvent<H::Node>) {
        let message = event.message.as_deref().unwrap_or_default();
        error!(%message, "uncaught page error");
        host.console_error(&format!("{} {message}", self.prefix));
    }
}
