//! `page_enhancer` is the client-side behavior layer of a parameter-driven
//! generator page.
//!
//! Every behavior (smooth anchors, control feedback, tooltips, shortcuts,
//! parameter persistence, error reporting, entrance animations) is written
//! once against the [`Host`] trait. Two hosts are provided:
//!
//! - [`Page`]: an in-memory, deterministic document with a fake clock and
//!   in-memory local storage. [`Harness`] couples it with an initialized
//!   [`Enhancer`] and drives it with user-level actions.
//! - `WebHost` (`wasm32` only): the real browser DOM through `web-sys`,
//!   started from JS with `start_enhancer`.
//!
//! ```
//! use page_enhancer::{Harness, Result};
//!
//! fn main() -> Result<()> {
//!     let mut h = Harness::from_html(
//!         "<div class='stButton'><button id='go'>Generate Data</button></div>",
//!     )?;
//!     h.click("#go")?;
//!     h.assert_style("#go", "transform", "scale(0.98)")?;
//!     h.advance_time(150)?;
//!     h.assert_style("#go", "transform", "")?;
//!     Ok(())
//! }
//! ```

pub mod behaviors;
mod config;
mod core_dom_utils;
mod dom;
mod enhancer;
mod events;
mod harness;
mod host;
mod html;
mod page;
mod selector;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{Classes, EnhancerConfig, RevertPolicy, Selectors, ShortcutModifier, Shortcuts, Timing};
pub use dom::NodeId;
pub use enhancer::{Component, Enhancer, InitReport};
pub use events::{Binding, EventKind, HostEvent, IntersectionEntry, KeyPress, ListenTarget};
pub use harness::Harness;
pub use host::{Host, Rect, ScrollAlign, ScrollBehavior, StyleProperty, TimerId, TimerTask};
pub use page::{ConsoleLevel, ConsoleLine, Page, PendingTimer, ScrollRecord};

#[cfg(target_arch = "wasm32")]
pub use web::{WebHost, start_enhancer};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("malformed parameter snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("timer error: {0}")]
    Timer(String),
    #[error("assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}")]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}
