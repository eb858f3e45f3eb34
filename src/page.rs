use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use crate::dom::{Dom, NodeId};
use crate::events::{Binding, EventKind, ListenTarget};
use crate::host::{Host, Rect, ScrollAlign, ScrollBehavior, StyleProperty, TimerId, TimerTask};
use crate::html::parse_html;
use crate::{Error, Result};

/// A timer waiting in the fake-clock queue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due_at: u64,
    pub order: u64,
    pub task: TimerTask<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRecord {
    pub node: NodeId,
    pub behavior: ScrollBehavior,
    pub align: ScrollAlign,
}

#[derive(Debug, Clone)]
struct Listener {
    target: ListenTarget<NodeId>,
    kind: EventKind,
    binding: Binding,
}

#[derive(Debug)]
struct SchedulerState {
    task_queue: Vec<PendingTimer>,
    now_ms: u64,
    timer_step_limit: usize,
    next_timer_id: u64,
    next_task_order: u64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }
}

impl SchedulerState {
    fn allocate_timer_id(&mut self) -> TimerId {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        TimerId(id)
    }

    fn allocate_task_order(&mut self) -> u64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }
}

/// An in-memory document implementing [`Host`].
///
/// Time only moves when asked to. Local storage is a plain map that can be
/// carried over to a new page with [`Page::into_storage`].
#[derive(Debug)]
pub struct Page {
    dom: Dom,
    listeners: Vec<Listener>,
    scheduler: SchedulerState,
    storage: BTreeMap<String, String>,
    storage_failure: Option<String>,
    console: Vec<ConsoleLine>,
    scrolls: Vec<ScrollRecord>,
    observed: Vec<NodeId>,
    activations: VecDeque<NodeId>,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_storage(html, BTreeMap::new())
    }

    pub fn with_storage(html: &str, storage: BTreeMap<String, String>) -> Result<Self> {
        Ok(Self {
            dom: parse_html(html)?,
            listeners: Vec::new(),
            scheduler: SchedulerState::default(),
            storage,
            storage_failure: None,
            console: Vec::new(),
            scrolls: Vec::new(),
            observed: Vec::new(),
            activations: VecDeque::new(),
        })
    }

    pub fn into_storage(self) -> BTreeMap<String, String> {
        self.storage
    }

    pub fn select(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        Ok(self.dom.text_content(self.select(selector)?))
    }

    pub fn value_of(&self, selector: &str) -> Result<String> {
        self.dom.value(self.select(selector)?)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        self.dom.style_get(self.select(selector)?, property)
    }

    pub fn style_of(&self, node: NodeId, property: &str) -> Result<String> {
        self.dom.style_get(node, property)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        self.dom.class_contains(self.select(selector)?, class_name)
    }

    pub fn set_rect(&mut self, selector: &str, rect: Rect) -> Result<()> {
        let node = self.select(selector)?;
        self.dom.set_rect(node, rect)
    }

    pub fn set_value_of(&mut self, selector: &str, value: &str) -> Result<()> {
        let node = self.select(selector)?;
        self.dom.set_value(node, value)
    }

    /// Serialized markup of the node matching `selector`.
    pub fn dump(&self, selector: &str) -> Result<String> {
        Ok(self.dom.dump_node(self.select(selector)?))
    }

    pub fn dump_node(&self, node: NodeId) -> String {
        self.dom.dump_node(node)
    }

    pub fn dump_document(&self) -> String {
        self.dom.dump_node(self.dom.root)
    }

    pub fn storage_item(&self, key: &str) -> Option<&str> {
        self.storage.get(key).map(String::as_str)
    }

    pub fn set_storage_item(&mut self, key: &str, value: &str) {
        self.storage.insert(key.to_string(), value.to_string());
    }

    /// Makes every later storage access fail with `reason`, as a browser does
    /// when storage is disabled. `None` restores access.
    pub fn set_storage_failure(&mut self, reason: Option<&str>) {
        self.storage_failure = reason.map(str::to_string);
    }

    pub fn console_lines(&self) -> &[ConsoleLine] {
        &self.console
    }

    pub fn scrolls(&self) -> &[ScrollRecord] {
        &self.scrolls
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    /// Number of listeners registered for `kind` anywhere in the page.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|listener| listener.kind == kind)
            .count()
    }

    /// Listeners `kind` reaches when fired at `target`, in dispatch order.
    /// Bubbling kinds walk from the target up to the document, then the
    /// window; the others stay on the target.
    pub(crate) fn dispatch_path(
        &self,
        target: &ListenTarget<NodeId>,
        kind: EventKind,
    ) -> Vec<(ListenTarget<NodeId>, Binding)> {
        let mut path = Vec::new();
        match target {
            ListenTarget::Node(node) => {
                path.push(ListenTarget::Node(*node));
                if kind.bubbles() {
                    let mut cursor = self.dom.parent(*node);
                    while let Some(parent) = cursor {
                        if parent == self.dom.root {
                            break;
                        }
                        path.push(ListenTarget::Node(parent));
                        cursor = self.dom.parent(parent);
                    }
                    if self.dom.is_connected(*node) {
                        path.push(ListenTarget::Document);
                        path.push(ListenTarget::Window);
                    }
                }
            }
            ListenTarget::Document => {
                path.push(ListenTarget::Document);
                if kind.bubbles() {
                    path.push(ListenTarget::Window);
                }
            }
            ListenTarget::Window => path.push(ListenTarget::Window),
        }

        path.into_iter()
            .flat_map(|hop| {
                self.listeners
                    .iter()
                    .filter(move |listener| listener.kind == kind && listener.target == hop)
                    .map(|listener| (listener.target.clone(), listener.binding))
            })
            .collect()
    }

    pub(crate) fn take_activation(&mut self) -> Option<NodeId> {
        self.activations.pop_front()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self.scheduler.task_queue.clone();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::Timer(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.scheduler.timer_step_limit = max_steps;
        Ok(())
    }

    pub fn advance_time(&mut self, delta_ms: u64) -> Result<()> {
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = self.scheduler.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        trace!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.scheduler.now_ms, ran
        );
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: u64) -> Result<()> {
        if target_ms < self.scheduler.now_ms {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.scheduler.now_ms
            )));
        }
        let from = self.scheduler.now_ms;
        self.scheduler.now_ms = target_ms;
        let ran = self.run_timer_queue(Some(target_ms), false)?;
        trace!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.scheduler.now_ms, ran
        );
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.scheduler.now_ms), false)?;
        trace!("[timer] run_due now_ms={} ran={}", self.scheduler.now_ms, ran);
        Ok(ran)
    }

    /// Runs every pending timer, moving the clock to each one's due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        trace!(
            "[timer] flush from={} to={} ran={}",
            from, self.scheduler.now_ms, ran
        );
        Ok(())
    }

    fn run_timer_queue(&mut self, due_limit: Option<u64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.scheduler.timer_step_limit {
                return Err(Error::Timer(format!(
                    "timer queue exceeded max steps: limit={}, now_ms={}, pending_tasks={}",
                    self.scheduler.timer_step_limit,
                    self.scheduler.now_ms,
                    self.scheduler.task_queue.len()
                )));
            }
            let task = self.scheduler.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.scheduler.now_ms {
                self.scheduler.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn next_task_index(&self, due_limit: Option<u64>) -> Option<usize> {
        self.scheduler
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_timer_task(&mut self, timer: PendingTimer) -> Result<()> {
        trace!(
            "[timer] run id={} due_at={} now_ms={}",
            timer.id.0, timer.due_at, self.scheduler.now_ms
        );
        match timer.task {
            TimerTask::ClearStyle { node, property } => {
                self.dom.style_set(node, property.css_name(), "")
            }
        }
    }

    fn expect_element(&self, node: NodeId) -> Result<()> {
        if self.dom.element(node).is_none() {
            return Err(Error::Dom(format!("node {} is not an element", node.0)));
        }
        Ok(())
    }

    fn check_storage(&self) -> Result<()> {
        match &self.storage_failure {
            Some(reason) => Err(Error::Storage(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Host for Page {
    type Node = NodeId;

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.dom.attr(*node, name)
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.dom.text_content(*node)
    }

    fn value(&self, node: &NodeId) -> Result<String> {
        self.dom.value(*node)
    }

    fn set_value(&mut self, node: &NodeId, value: &str) -> Result<()> {
        self.dom.set_value(*node, value)
    }

    fn add_class(&mut self, node: &NodeId, class_name: &str) -> Result<()> {
        self.dom.class_add(*node, class_name)
    }

    fn set_style(&mut self, node: &NodeId, property: StyleProperty, value: &str) -> Result<()> {
        self.dom.style_set(*node, property.css_name(), value)
    }

    fn create_element(&mut self, tag: &str, class_name: &str) -> Result<NodeId> {
        let node = self.dom.create_detached_element(tag);
        self.dom.class_add(node, class_name)?;
        Ok(node)
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> Result<()> {
        self.dom.set_text_content(*node, text)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.dom.append_child(*parent, *child)
    }

    fn body(&self) -> Option<NodeId> {
        self.dom.first_by_tag("body")
    }

    fn detach(&mut self, node: &NodeId) -> Result<bool> {
        self.expect_element(*node)?;
        match self.dom.parent(*node) {
            Some(parent) => {
                self.dom.remove_child(parent, *node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.dom.is_connected(*node)
    }

    fn bounding_rect(&self, node: &NodeId) -> Result<Rect> {
        self.dom.bounding_rect(*node)
    }

    fn offset_height(&self, node: &NodeId) -> Result<f64> {
        self.dom.offset_height(*node)
    }

    fn scroll_into_view(
        &mut self,
        node: &NodeId,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> Result<()> {
        self.expect_element(*node)?;
        self.scrolls.push(ScrollRecord {
            node: *node,
            behavior,
            align,
        });
        Ok(())
    }

    fn activate(&mut self, node: &NodeId) {
        self.activations.push_back(*node);
    }

    fn storage_get(&self, key: &str) -> Result<Option<String>> {
        self.check_storage()?;
        Ok(self.storage.get(key).cloned())
    }

    fn storage_set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_storage()?;
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_timeout(&mut self, delay_ms: u32, task: TimerTask<NodeId>) -> Result<TimerId> {
        let id = self.scheduler.allocate_timer_id();
        let order = self.scheduler.allocate_task_order();
        let due_at = self.scheduler.now_ms.saturating_add(u64::from(delay_ms));
        self.scheduler.task_queue.push(PendingTimer {
            id,
            due_at,
            order,
            task,
        });
        trace!(
            "[timer] schedule id={} due_at={} delay_ms={}",
            id.0, due_at, delay_ms
        );
        Ok(id)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        let before = self.scheduler.task_queue.len();
        self.scheduler.task_queue.retain(|task| task.id != id);
        if self.scheduler.task_queue.len() != before {
            trace!("[timer] clear id={}", id.0);
        }
    }

    fn listen(&mut self, target: ListenTarget<NodeId>, kind: EventKind, binding: Binding) -> Result<()> {
        if let ListenTarget::Node(node) = &target {
            self.expect_element(*node)?;
        }
        self.listeners.push(Listener {
            target,
            kind,
            binding,
        });
        Ok(())
    }

    fn observe_visibility(&mut self, node: &NodeId) -> Result<()> {
        self.expect_element(*node)?;
        if !self.observed.contains(node) {
            self.observed.push(*node);
        }
        Ok(())
    }

    fn inject_style(&mut self, id: &str, css: &str) -> Result<()> {
        let head = self
            .dom
            .first_by_tag("head")
            .ok_or_else(|| Error::Dom("document has no head".into()))?;
        let style = self.dom.create_detached_element("style");
        self.dom.set_attr(style, "id", id)?;
        self.dom.set_text_content(style, css)?;
        self.dom.append_child(head, style)
    }

    fn console_log(&mut self, message: &str) {
        self.console.push(ConsoleLine {
            level: ConsoleLevel::Log,
            message: message.to_string(),
        });
    }

    fn console_error(&mut self, message: &str) {
        self.console.push(ConsoleLine {
            level: ConsoleLevel::Error,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_run_in_due_then_schedule_order() -> Result<()> {
        let mut page = Page::from_html("<p id='a' style='opacity: 1; left: 2px'>x</p>")?;
        let node = page.select("#a")?;
        page.set_timeout(
            20,
            TimerTask::ClearStyle {
                node,
                property: StyleProperty::Left,
            },
        )?;
        page.set_timeout(
            10,
            TimerTask::ClearStyle {
                node,
                property: StyleProperty::Opacity,
            },
        )?;
        let due = page
            .pending_timers()
            .iter()
            .map(|timer| timer.due_at)
            .collect::<Vec<_>>();
        assert_eq!(due, vec![10, 20]);

        page.advance_time(10)?;
        assert_eq!(page.style("#a", "opacity")?, "");
        assert_eq!(page.style("#a", "left")?, "2px");
        assert_eq!(page.pending_timers().len(), 1);

        page.flush()?;
        assert_eq!(page.now_ms(), 20);
        assert_eq!(page.style("#a", "left")?, "");
        Ok(())
    }

    #[test]
    fn cleared_timer_never_runs() -> Result<()> {
        let mut page = Page::from_html("<p id='a' style='left: 2px'>x</p>")?;
        let node = page.select("#a")?;
        let id = page.set_timeout(
            5,
            TimerTask::ClearStyle {
                node,
                property: StyleProperty::Left,
            },
        )?;
        page.clear_timeout(id);
        page.clear_timeout(id);
        page.advance_time(100)?;
        assert_eq!(page.style("#a", "left")?, "2px");
        Ok(())
    }

    #[test]
    fn advance_time_to_rejects_past_target() -> Result<()> {
        let mut page = Page::from_html("<p></p>")?;
        page.advance_time(50)?;
        match page.advance_time_to(10) {
            Err(Error::Timer(msg)) => assert!(msg.contains("target >= now_ms")),
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn timer_step_limit_rejects_zero() -> Result<()> {
        let mut page = Page::from_html("<p></p>")?;
        assert!(page.set_timer_step_limit(0).is_err());
        page.set_timer_step_limit(1)?;
        Ok(())
    }

    #[test]
    fn click_path_bubbles_to_document_and_window() -> Result<()> {
        let mut page = Page::from_html("<div id='outer'><button id='b'>x</button></div>")?;
        let button = page.select("#b")?;
        let outer = page.select("#outer")?;
        page.listen(ListenTarget::Window, EventKind::Click, Binding::ReportError)?;
        page.listen(ListenTarget::Node(outer), EventKind::Click, Binding::SliderGlow(0))?;
        page.listen(ListenTarget::Document, EventKind::Click, Binding::Shortcut)?;
        page.listen(ListenTarget::Node(button), EventKind::Click, Binding::PressFeedback(0))?;

        let bindings = page
            .dispatch_path(&ListenTarget::Node(button), EventKind::Click)
            .into_iter()
            .map(|(_, binding)| binding)
            .collect::<Vec<_>>();
        assert_eq!(
            bindings,
            vec![
                Binding::PressFeedback(0),
                Binding::SliderGlow(0),
                Binding::Shortcut,
                Binding::ReportError,
            ]
        );
        Ok(())
    }

    #[test]
    fn mouseenter_does_not_bubble() -> Result<()> {
        let mut page = Page::from_html("<div id='outer'><span id='s'>x</span></div>")?;
        let outer = page.select("#outer")?;
        let span = page.select("#s")?;
        page.listen(ListenTarget::Node(outer), EventKind::MouseEnter, Binding::TooltipEnter(0))?;
        assert!(
            page.dispatch_path(&ListenTarget::Node(span), EventKind::MouseEnter)
                .is_empty()
        );
        Ok(())
    }

    #[test]
    fn storage_failure_is_reported() -> Result<()> {
        let mut page = Page::from_html("<p></p>")?;
        page.set_storage_failure(Some("SecurityError"));
        assert_eq!(
            page.storage_set("k", "v"),
            Err(Error::Storage("SecurityError".into()))
        );
        page.set_storage_failure(None);
        page.storage_set("k", "v")?;
        assert_eq!(page.storage_get("k")?, Some("v".to_string()));
        Ok(())
    }

    #[test]
    fn injected_style_lands_in_head() -> Result<()> {
        let mut page = Page::from_html("<p>x</p>")?;
        page.inject_style("s", ".a { color: red; }")?;
        assert_eq!(page.text("head > style#s")?, ".a { color: red; }");
        Ok(())
    }
}
