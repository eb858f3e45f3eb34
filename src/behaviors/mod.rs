//! The individual page behaviors. Each owns its own state and talks to the
//! document only through [`Host`](crate::Host).

pub mod anchors;
pub mod error_reporter;
pub mod feedback;
pub mod persistence;
pub mod progress;
pub mod shortcuts;
pub mod stylesheet;
pub mod tooltip;
pub mod visibility;

pub use anchors::SmoothAnchors;
pub use error_reporter::ErrorReporter;
pub use feedback::ControlFeedback;
pub use persistence::{ParameterSnapshot, ParameterStore};
pub use shortcuts::{ShortcutAction, ShortcutDispatcher};
pub use tooltip::TooltipManager;
pub use visibility::VisibilityBinder;
