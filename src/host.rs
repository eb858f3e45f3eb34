use crate::Result;
use crate::events::{Binding, EventKind, ListenTarget};

/// Viewport-relative box of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    Nearest,
}

/// Inline style properties the layer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Transform,
    BoxShadow,
    Left,
    Top,
    Opacity,
}

impl StyleProperty {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::BoxShadow => "box-shadow",
            Self::Left => "left",
            Self::Top => "top",
            Self::Opacity => "opacity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Deferred work scheduled through [`Host::set_timeout`]. The host runs it
/// itself when due; no callback into the enhancer is needed.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask<N> {
    /// Reset an inline style property to empty.
    ClearStyle { node: N, property: StyleProperty },
}

/// Everything the enhancement layer needs from a document.
///
/// Listeners are registered as data ([`Binding`]); the host routes a fired
/// event back to [`Enhancer::handle`](crate::Enhancer::handle) together with
/// the binding it was registered with.
pub trait Host {
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// Elements matching `selector` in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    fn query_first(&self, selector: &str) -> Result<Option<Self::Node>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn text_content(&self, node: &Self::Node) -> String;

    fn value(&self, node: &Self::Node) -> Result<String>;

    fn set_value(&mut self, node: &Self::Node, value: &str) -> Result<()>;

    fn add_class(&mut self, node: &Self::Node, class_name: &str) -> Result<()>;

    fn set_style(&mut self, node: &Self::Node, property: StyleProperty, value: &str)
    -> Result<()>;

    /// A new detached element carrying `class_name`.
    fn create_element(&mut self, tag: &str, class_name: &str) -> Result<Self::Node>;

    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()>;

    /// Appends `child` to `parent`; an attached child is moved, never copied.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    fn body(&self) -> Option<Self::Node>;

    /// Removes `node` from its parent. Returns `false` if it was detached.
    fn detach(&mut self, node: &Self::Node) -> Result<bool>;

    fn is_attached(&self, node: &Self::Node) -> bool;

    fn bounding_rect(&self, node: &Self::Node) -> Result<Rect>;

    fn offset_height(&self, node: &Self::Node) -> Result<f64>;

    fn scroll_into_view(
        &mut self,
        node: &Self::Node,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> Result<()>;

    /// Queues a synthetic click on `node`, delivered after the running
    /// handler returns.
    fn activate(&mut self, node: &Self::Node);

    fn storage_get(&self, key: &str) -> Result<Option<String>>;

    fn storage_set(&mut self, key: &str, value: &str) -> Result<()>;

    fn set_timeout(&mut self, delay_ms: u32, task: TimerTask<Self::Node>) -> Result<TimerId>;

    /// Cancelling an unknown or already fired timer is a no-op.
    fn clear_timeout(&mut self, id: TimerId);

    fn listen(
        &mut self,
        target: ListenTarget<Self::Node>,
        kind: EventKind,
        binding: Binding,
    ) -> Result<()>;

    /// Adds `node` to the shared viewport observer.
    fn observe_visibility(&mut self, node: &Self::Node) -> Result<()>;

    /// Appends a `<style>` element with `id` and `css` to the document head.
    fn inject_style(&mut self, id: &str, css: &str) -> Result<()>;

    fn console_log(&mut self, message: &str);

    fn console_error(&mut self, message: &str);
}
