use foundation::bounds::{Rect, Size};
use foundation::ids::NodeRef;
use overview::{
    FocusDispatcher, FocusEvent, OverviewError, OverviewFrame, OverviewSurface, PrimarySurface,
};
use runtime::Timer;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, MutationObserverInit, Window,
};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn js_err(err: JsValue) -> OverviewError {
    OverviewError::Surface(format!("{err:?}"))
}

fn client_size(el: &Element) -> Size {
    Size::new(f64::from(el.client_width()), f64::from(el.client_height()))
}

/// `setTimeout` takes an `i32` delay.
pub fn timeout_ms(delay_ms: u64) -> i32 {
    i32::try_from(delay_ms).unwrap_or(i32::MAX)
}

/// The graph rendering owned by the page's layout engine.
#[derive(Debug, Clone)]
pub struct DomPrimarySurface {
    document: Document,
    root_selector: String,
    container_id: String,
}

impl DomPrimarySurface {
    pub fn new(document: Document, root_selector: &str, container_id: &str) -> Self {
        Self {
            document,
            root_selector: root_selector.to_string(),
            container_id: container_id.to_string(),
        }
    }

    pub fn root(&self) -> Option<Element> {
        self.document.query_selector(&self.root_selector).ok().flatten()
    }
}

impl PrimarySurface for DomPrimarySurface {
    fn markup(&self) -> Option<String> {
        self.root().map(|el| el.inner_html())
    }

    fn content_bbox(&self) -> Option<Rect> {
        let root = self.root()?;
        // getBBox throws for elements that are not rendered (display:none,
        // detached); call it through Reflect so that surfaces as `None`.
        let get_bbox = js_sys::Reflect::get(&root, &JsValue::from_str("getBBox"))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        let bbox = get_bbox.call0(&root).ok()?;
        let field = |name: &str| {
            js_sys::Reflect::get(&bbox, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.as_f64())
        };
        Some(Rect::new(
            field("x")?,
            field("y")?,
            field("width")?,
            field("height")?,
        ))
    }

    fn viewport_size(&self) -> Size {
        self.document
            .get_element_by_id(&self.container_id)
            .map(|el| client_size(&el))
            .unwrap_or_default()
    }
}

/// The overview mount point. Owns its children and their click handlers.
pub struct DomOverviewSurface {
    document: Document,
    container_id: String,
    focus_selector: String,
    handlers: Vec<Closure<dyn FnMut(Event)>>,
}

impl DomOverviewSurface {
    pub fn new(document: Document, container_id: &str, focus_selector: String) -> Self {
        Self {
            document,
            container_id: container_id.to_string(),
            focus_selector,
            handlers: Vec::new(),
        }
    }

    fn container(&self) -> Option<Element> {
        self.document.get_element_by_id(&self.container_id)
    }
}

impl OverviewSurface for DomOverviewSurface {
    fn container_size(&self) -> Option<Size> {
        self.container().map(|el| client_size(&el))
    }

    fn clear(&mut self) {
        if let Some(container) = self.container() {
            container.set_inner_html("");
        }
        // The elements these were attached to are gone.
        self.handlers.clear();
    }

    fn mount(
        &mut self,
        frame: &OverviewFrame,
        focus: &FocusDispatcher,
    ) -> Result<usize, OverviewError> {
        let container = self.container().ok_or_else(|| {
            OverviewError::Surface(format!("#{} left the document", self.container_id))
        })?;
        container.set_inner_html(&frame.svg);

        // The browser's parse of the clone is authoritative for which
        // elements exist, so select them from the live DOM.
        let targets = container
            .query_selector_all(&self.focus_selector)
            .map_err(js_err)?;
        for i in 0..targets.length() {
            let Some(el) = targets.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(id) = el.get_attribute("id").filter(|id| !id.trim().is_empty()) else {
                continue;
            };
            let node = NodeRef::new(id);
            let focus = focus.clone();
            let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                focus.dispatch_focus(&node);
            });
            el.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
                .map_err(js_err)?;
            self.handlers.push(on_click);
        }
        Ok(self.handlers.len())
    }
}

/// Observer options for the primary root: attribute, child-list and subtree changes.
pub fn observer_init() -> MutationObserverInit {
    let init = MutationObserverInit::new();
    init.set_attributes(true);
    init.set_child_list(true);
    init.set_subtree(true);
    init
}

/// `window.setTimeout` backed timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn defer(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> bool {
        let Ok(window) = window() else {
            warn!("no window; deferred callback dropped");
            return false;
        };
        let cb = Closure::once_into_js(move || callback());
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.unchecked_ref(),
            timeout_ms(delay_ms),
        ) {
            Ok(_) => true,
            Err(err) => {
                warn!(?err, "setTimeout failed; deferred callback dropped");
                false
            }
        }
    }
}

/// Re-publishes a focus request as a `window` `CustomEvent` with `detail = { id }`.
pub fn publish_focus(window: &Window, event_name: &str, event: &FocusEvent) {
    let detail = match serde_wasm_bindgen::to_value(&event.detail()) {
        Ok(detail) => detail,
        Err(err) => {
            warn!(%err, "focus detail not serializable");
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(event_name, &init) {
        Ok(custom) => {
            if let Err(err) = window.dispatch_event(&custom) {
                warn!(?err, event_name, "focus event dispatch failed");
            }
        }
        Err(err) => warn!(?err, event_name, "focus event not constructible"),
    }
}
