//! Browser host. Binds the behaviors to the live DOM through `web-sys`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, ErrorEvent, Event, EventTarget, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    KeyboardEvent, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::config::EnhancerConfig;
use crate::enhancer::Enhancer;
use crate::events::{Binding, EventKind, HostEvent, IntersectionEntry, KeyPress, ListenTarget};
use crate::host::{Host, Rect, ScrollAlign, ScrollBehavior, StyleProperty, TimerId, TimerTask};
use crate::{Error, Result};

struct Runtime {
    host: WebHost,
    enhancer: Option<Enhancer<Element>>,
}

/// [`Host`] over the document of the current window.
pub struct WebHost {
    window: Window,
    document: Document,
    runtime: Weak<RefCell<Runtime>>,
    observer: Option<IntersectionObserver>,
    activations: Vec<Element>,
}

fn dom_error(context: &'static str) -> impl Fn(JsValue) -> Error {
    move |err| Error::Dom(format!("{context}: {err:?}"))
}

fn storage_error(err: JsValue) -> Error {
    Error::Storage(format!("{err:?}"))
}

fn as_html(node: &Element) -> Result<&HtmlElement> {
    node.dyn_ref::<HtmlElement>()
        .ok_or_else(|| Error::Dom(format!("<{}> is not an HTML element", node.tag_name())))
}

impl WebHost {
    fn event_target(&self, target: &ListenTarget<Element>) -> EventTarget {
        match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Node(node) => node.clone().into(),
        }
    }

    fn storage(&self) -> Result<web_sys::Storage> {
        self.window
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| Error::Storage("local storage is unavailable".into()))
    }

    fn ensure_observer(&mut self) -> Result<IntersectionObserver> {
        if let Some(observer) = &self.observer {
            return Ok(observer.clone());
        }
        let runtime = self.runtime.clone();
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let entries = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionEntry {
                    target: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect::<Vec<_>>();
            deliver_intersections(&runtime, &entries);
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())
            .map_err(dom_error("IntersectionObserver"))?;
        callback.forget();
        self.observer = Some(observer.clone());
        Ok(observer)
    }
}

impl Host for WebHost {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|_| Error::UnsupportedSelector(selector.to_string()))?;
        Ok((0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn query_first(&self, selector: &str) -> Result<Option<Element>> {
        self.document
            .query_selector(selector)
            .map_err(|_| Error::UnsupportedSelector(selector.to_string()))
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn value(&self, node: &Element) -> Result<String> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            Ok(input.value())
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            Ok(select.value())
        } else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            Ok(textarea.value())
        } else {
            Err(Error::Dom(format!("<{}> has no value", node.tag_name())))
        }
    }

    fn set_value(&mut self, node: &Element, value: &str) -> Result<()> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        } else {
            return Err(Error::Dom(format!("<{}> has no value", node.tag_name())));
        }
        Ok(())
    }

    fn add_class(&mut self, node: &Element, class_name: &str) -> Result<()> {
        node.class_list()
            .add_1(class_name)
            .map_err(dom_error("classList.add"))
    }

    fn set_style(&mut self, node: &Element, property: StyleProperty, value: &str) -> Result<()> {
        as_html(node)?
            .style()
            .set_property(property.css_name(), value)
            .map_err(dom_error("style.setProperty"))
    }

    fn create_element(&mut self, tag: &str, class_name: &str) -> Result<Element> {
        let node = self
            .document
            .create_element(tag)
            .map_err(dom_error("createElement"))?;
        node.set_class_name(class_name);
        Ok(node)
    }

    fn set_text(&mut self, node: &Element, text: &str) -> Result<()> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<()> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(dom_error("appendChild"))
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn detach(&mut self, node: &Element) -> Result<bool> {
        let Some(parent) = node.parent_node() else {
            return Ok(false);
        };
        parent
            .remove_child(node)
            .map_err(dom_error("removeChild"))?;
        Ok(true)
    }

    fn is_attached(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn bounding_rect(&self, node: &Element) -> Result<Rect> {
        let rect = node.get_bounding_client_rect();
        Ok(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn offset_height(&self, node: &Element) -> Result<f64> {
        Ok(f64::from(as_html(node)?.offset_height()))
    }

    fn scroll_into_view(
        &mut self,
        node: &Element,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> Result<()> {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        options.set_block(match align {
            ScrollAlign::Start => ScrollLogicalPosition::Start,
            ScrollAlign::Center => ScrollLogicalPosition::Center,
            ScrollAlign::End => ScrollLogicalPosition::End,
            ScrollAlign::Nearest => ScrollLogicalPosition::Nearest,
        });
        node.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn activate(&mut self, node: &Element) {
        self.activations.push(node.clone());
    }

    fn storage_get(&self, key: &str) -> Result<Option<String>> {
        self.storage()?.get_item(key).map_err(storage_error)
    }

    fn storage_set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(storage_error)
    }

    fn set_timeout(&mut self, delay_ms: u32, task: TimerTask<Element>) -> Result<TimerId> {
        let callback = Closure::once_into_js(move || match task {
            TimerTask::ClearStyle { node, property } => {
                if let Some(node) = node.dyn_ref::<HtmlElement>() {
                    if let Err(err) = node.style().set_property(property.css_name(), "") {
                        warn!(property = property.css_name(), ?err, "style revert failed");
                    }
                }
            }
        });
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
            .map_err(|err| Error::Timer(format!("{err:?}")))?;
        Ok(TimerId(u64::from(handle.unsigned_abs())))
    }

    fn clear_timeout(&mut self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn listen(&mut self, target: ListenTarget<Element>, kind: EventKind, binding: Binding) -> Result<()> {
        let runtime = self.runtime.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            deliver_event(&runtime, binding, kind, &event);
        }) as Box<dyn FnMut(Event)>);
        self.event_target(&target)
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
            .map_err(dom_error("addEventListener"))?;
        callback.forget();
        Ok(())
    }

    fn observe_visibility(&mut self, node: &Element) -> Result<()> {
        self.ensure_observer()?.observe(node);
        Ok(())
    }

    fn inject_style(&mut self, id: &str, css: &str) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| Error::Dom("document has no head".into()))?;
        let style = self
            .document
            .create_element("style")
            .map_err(dom_error("createElement"))?;
        style.set_id(id);
        style.set_text_content(Some(css));
        head.append_child(&style)
            .map(drop)
            .map_err(dom_error("appendChild"))
    }

    fn console_log(&mut self, message: &str) {
        web_sys::console::log_1(&JsValue::from_str(message));
    }

    fn console_error(&mut self, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
    }
}

fn host_event(kind: EventKind, raw: &Event) -> HostEvent<Element> {
    let mut event = HostEvent::new(kind);
    event.target = raw.target().and_then(|target| target.dyn_into::<Element>().ok());
    event.current_target = raw
        .current_target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    if let Some(key) = raw.dyn_ref::<KeyboardEvent>() {
        event.key = Some(KeyPress {
            key: key.key(),
            ctrl: key.ctrl_key(),
            meta: key.meta_key(),
            alt: key.alt_key(),
            shift: key.shift_key(),
        });
    }
    if let Some(error) = raw.dyn_ref::<ErrorEvent>() {
        event.message = Some(error.message());
    }
    event
}

/// Runs one listener. Synthetic clicks queued by the handler are delivered
/// once the runtime is released, since they re-enter this function.
fn deliver_event(runtime: &Weak<RefCell<Runtime>>, binding: Binding, kind: EventKind, raw: &Event) {
    let Some(runtime) = runtime.upgrade() else {
        return;
    };
    let activations = {
        let Ok(mut state) = runtime.try_borrow_mut() else {
            warn!(?binding, "event delivered while the enhancer was busy");
            return;
        };
        let Runtime { host, enhancer } = &mut *state;
        let Some(enhancer) = enhancer.as_mut() else {
            return;
        };
        let mut event = host_event(kind, raw);
        if let Err(err) = enhancer.handle(host, binding, &mut event) {
            warn!(?binding, %err, "listener failed");
        }
        if event.default_prevented() {
            raw.prevent_default();
        }
        std::mem::take(&mut host.activations)
    };
    for node in activations {
        if let Some(node) = node.dyn_ref::<HtmlElement>() {
            node.click();
        }
    }
}

fn deliver_intersections(runtime: &Weak<RefCell<Runtime>>, entries: &[IntersectionEntry<Element>]) {
    let Some(runtime) = runtime.upgrade() else {
        return;
    };
    let Ok(mut state) = runtime.try_borrow_mut() else {
        return;
    };
    let Runtime { host, enhancer } = &mut *state;
    if let Some(enhancer) = enhancer.as_ref() {
        if let Err(err) = enhancer.on_intersection(host, entries) {
            warn!(%err, "visibility update failed");
        }
    }
}

fn initialize(window: Window, document: Document, config: EnhancerConfig) {
    let runtime = Rc::new_cyclic(|weak| {
        RefCell::new(Runtime {
            host: WebHost {
                window,
                document,
                runtime: weak.clone(),
                observer: None,
                activations: Vec::new(),
            },
            enhancer: None,
        })
    });
    {
        let mut state = runtime.borrow_mut();
        let Runtime { host, enhancer } = &mut *state;
        *enhancer = Some(Enhancer::initialize(host, config));
    }
    // Listeners hold weak references; the runtime lives as long as the page.
    std::mem::forget(runtime);
}

/// Entry point for the page script. `config_json` overrides the defaults;
/// runs now if the document is parsed, otherwise on `DOMContentLoaded`.
#[wasm_bindgen]
pub fn start_enhancer(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    let config = match config_json {
        Some(raw) => EnhancerConfig::from_json(&raw),
        None => Ok(EnhancerConfig::default()),
    }
    .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() != "loading" {
        initialize(window, document, config);
        return Ok(());
    }

    let target = document.clone();
    let callback = Closure::once_into_js(move || initialize(window, document, config));
    target.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    Ok(())
}
