use std::collections::BTreeMap;

use tracing::trace;

use crate::config::EnhancerConfig;
use crate::core_dom_utils::truncate_chars;
use crate::dom::NodeId;
use crate::enhancer::{Enhancer, InitReport};
use crate::events::{EventKind, HostEvent, IntersectionEntry, KeyPress, ListenTarget};
use crate::host::Host;
use crate::page::{ConsoleLine, Page, ScrollRecord};
use crate::{Error, Result};

// Synthetic clicks may queue further clicks; stop runaway chains.
const ACTIVATION_LIMIT: usize = 1_000;

/// An in-memory page with an initialized [`Enhancer`], driven by user-level
/// actions.
///
/// ```
/// use page_enhancer::{Harness, KeyPress, Result};
///
/// fn main() -> Result<()> {
///     let mut h = Harness::from_html(
///         "<div class='stButton'><button id='go'>Generate Data</button></div>",
///     )?;
///     h.key_down(KeyPress::ctrl("g"))?;
///     assert!(h.last_default_prevented());
///     h.assert_style("#go", "transform", "scale(0.98)")?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Harness {
    page: Page,
    enhancer: Enhancer<NodeId>,
    activated: Vec<NodeId>,
    last_default_prevented: bool,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, EnhancerConfig::default())
    }

    pub fn with_config(html: &str, config: EnhancerConfig) -> Result<Self> {
        Self::from_page(Page::from_html(html)?, config)
    }

    pub fn from_html_with_storage(html: &str, storage: BTreeMap<String, String>) -> Result<Self> {
        Self::from_page(Page::with_storage(html, storage)?, EnhancerConfig::default())
    }

    /// Initializes the enhancer against an already prepared page, e.g. one
    /// with boxes assigned or storage made unavailable.
    pub fn from_page(mut page: Page, config: EnhancerConfig) -> Result<Self> {
        config.validate()?;
        let enhancer = Enhancer::initialize(&mut page, config);
        Ok(Self {
            page,
            enhancer,
            activated: Vec::new(),
            last_default_prevented: false,
        })
    }

    /// Navigates to a new document, keeping local storage and the config.
    pub fn reload(self, html: &str) -> Result<Self> {
        let config = self.enhancer.config().clone();
        let storage = self.page.into_storage();
        Self::from_page(Page::with_storage(html, storage)?, config)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn enhancer(&self) -> &Enhancer<NodeId> {
        &self.enhancer
    }

    pub fn report(&self) -> &InitReport {
        self.enhancer.report()
    }

    pub fn console_lines(&self) -> &[ConsoleLine] {
        self.page.console_lines()
    }

    pub fn scrolls(&self) -> &[ScrollRecord] {
        self.page.scrolls()
    }

    /// The stored parameter record, if any.
    pub fn storage_record(&self) -> Option<&str> {
        self.page.storage_item(self.enhancer.parameters().key())
    }

    /// Nodes clicked programmatically, in order.
    pub fn activations(&self) -> &[NodeId] {
        &self.activated
    }

    /// Whether any listener suppressed the default action of the most recent
    /// user-level event.
    pub fn last_default_prevented(&self) -> bool {
        self.last_default_prevented
    }

    pub fn select(&self, selector: &str) -> Result<NodeId> {
        self.page.select(selector)
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        self.click_node(target)
    }

    pub fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.is_disabled(target) {
            return Ok(());
        }
        let event = HostEvent::new(EventKind::Click).with_target(target);
        self.dispatch(ListenTarget::Node(target), event)?;
        Ok(())
    }

    /// Replaces the control's value and fires `input` at it.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        self.page.set_value_of(selector, text)?;
        let event = HostEvent::new(EventKind::Input).with_target(target);
        self.dispatch(ListenTarget::Node(target), event)?;
        Ok(())
    }

    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        let event = HostEvent::new(EventKind::MouseEnter).with_target(target);
        self.dispatch(ListenTarget::Node(target), event)?;
        Ok(())
    }

    pub fn unhover(&mut self, selector: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        let event = HostEvent::new(EventKind::MouseLeave).with_target(target);
        self.dispatch(ListenTarget::Node(target), event)?;
        Ok(())
    }

    /// Fires a key-down at `body`, from where it bubbles to the document.
    pub fn key_down(&mut self, key: KeyPress) -> Result<()> {
        let mut event = HostEvent::new(EventKind::KeyDown).with_key(key);
        let target = match self.page.select("body") {
            Ok(body) => {
                event = event.with_target(body);
                ListenTarget::Node(body)
            }
            Err(_) => ListenTarget::Document,
        };
        self.dispatch(target, event)?;
        Ok(())
    }

    /// Simulates an uncaught error reaching the window.
    pub fn raise_error(&mut self, message: &str) -> Result<()> {
        let event = HostEvent::new(EventKind::Error).with_message(message);
        self.dispatch(ListenTarget::Window, event)?;
        Ok(())
    }

    /// Reports every observed element matching `selector` as entering or
    /// leaving the viewport. Unobserved elements produce no entries.
    pub fn set_intersecting(&mut self, selector: &str, intersecting: bool) -> Result<()> {
        let entries = self
            .page
            .select_all(selector)?
            .into_iter()
            .filter(|node| self.page.is_observed(*node))
            .map(|target| IntersectionEntry {
                target,
                is_intersecting: intersecting,
            })
            .collect::<Vec<_>>();
        if entries.is_empty() {
            return Ok(());
        }
        self.enhancer.on_intersection(&mut self.page, &entries)
    }

    pub fn progress_widget(&mut self) -> Result<NodeId> {
        self.enhancer.progress_widget(&mut self.page)
    }

    pub fn advance_time(&mut self, delta_ms: u64) -> Result<()> {
        self.page.advance_time(delta_ms)
    }

    pub fn advance_time_to(&mut self, target_ms: u64) -> Result<()> {
        self.page.advance_time_to(target_ms)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        self.page.run_due_timers()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.page.flush()
    }

    /// Fires `event` at `target`, then delivers any clicks the listeners
    /// queued. Returns the event as the listeners left it.
    pub fn dispatch(
        &mut self,
        target: ListenTarget<NodeId>,
        event: HostEvent<NodeId>,
    ) -> Result<HostEvent<NodeId>> {
        let event = self.fire(&target, event)?;
        self.last_default_prevented = event.default_prevented();
        self.drain_activations()?;
        Ok(event)
    }

    fn fire(
        &mut self,
        target: &ListenTarget<NodeId>,
        mut event: HostEvent<NodeId>,
    ) -> Result<HostEvent<NodeId>> {
        let path = self.page.dispatch_path(target, event.kind);
        trace!(kind = event.kind.as_str(), listeners = path.len(), "dispatch");
        for (hop, binding) in path {
            event.current_target = match hop {
                ListenTarget::Node(node) => Some(node),
                ListenTarget::Document | ListenTarget::Window => None,
            };
            self.enhancer.handle(&mut self.page, binding, &mut event)?;
        }
        event.current_target = None;
        Ok(event)
    }

    fn drain_activations(&mut self) -> Result<()> {
        let mut delivered = 0usize;
        while let Some(node) = self.page.take_activation() {
            delivered += 1;
            if delivered > ACTIVATION_LIMIT {
                return Err(Error::Dom(format!(
                    "synthetic clicks exceeded limit of {ACTIVATION_LIMIT}"
                )));
            }
            self.activated.push(node);
            if self.is_disabled(node) {
                continue;
            }
            let event = HostEvent::new(EventKind::Click).with_target(node);
            self.fire(&ListenTarget::Node(node), event)?;
        }
        Ok(())
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.page.attribute(&node, "disabled").is_some()
    }

    fn node_snippet(&self, node: NodeId) -> String {
        truncate_chars(&self.page.dump_node(node), 200)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        let actual = self.page.text(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        let actual = self.page.value_of(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.page.select(selector)?;
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        if !self.page.has_class(selector, class_name)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name}"),
                actual: "missing".to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    /// An empty `expected` asserts the property is unset.
    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.page.select(selector)?;
        let actual = self.page.style(selector, property)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{property}: {expected}"),
                actual: format!("{property}: {actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        self.page.dump(selector)
    }
}
