use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MutationObserver;

use foundation::math::Vec2;
use overview::{OverviewConfig, OverviewRenderer, OverviewSurface, RenderOutcome};
use runtime::metrics::Metrics;
use runtime::{ChangeDetector, ListenerId, Notification};
use tracing::{debug, info, warn};

pub mod dom;
use dom::{BrowserTimer, DomOverviewSurface, DomPrimarySurface, publish_focus};

static TRACING_SET: OnceLock<()> = OnceLock::new();

/// One running overview: observer, detector and renderer bound to the page.
struct Birdview {
    renderer: OverviewRenderer,
    detector: ChangeDetector,
    primary: DomPrimarySurface,
    overview: RefCell<DomOverviewSurface>,
    observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    focus_listener: ListenerId,
}

impl Birdview {
    fn notify(&self) -> Notification {
        self.detector.notify(|| self.rebuild())
    }

    fn rebuild(&self) {
        let mut overview = self.overview.borrow_mut();
        match self.renderer.render(&self.primary, &mut *overview) {
            Ok(RenderOutcome::Rendered(report)) => debug!(
                nodes = report.nodes,
                focus_targets = report.focus_targets,
                "bird-view rebuilt"
            ),
            Ok(RenderOutcome::Skipped(reason)) => debug!(?reason, "bird-view not rebuilt"),
            Err(err) => warn!(%err, "bird-view rebuild failed"),
        }
    }

    fn shutdown(&self) {
        self.observer.disconnect();
        self.detector.stop();
        self.renderer.focus().unsubscribe(self.focus_listener);
        debug!(
            remaining_focus_listeners = self.renderer.focus().listener_count(),
            "focus publisher detached"
        );
        // Mounted clones hold listeners backed by closures that die with this
        // instance; remove the clones first.
        self.overview.borrow_mut().clear();
    }
}

thread_local! {
    static BIRDVIEW: RefCell<Option<Rc<Birdview>>> = const { RefCell::new(None) };
}

fn current() -> Option<Rc<Birdview>> {
    BIRDVIEW.try_with(|b| b.borrow().clone()).ok().flatten()
}

fn init_tracing() {
    TRACING_SET.get_or_init(|| {
        tracing_wasm::set_as_global_default();
    });
}

fn on_mutations() {
    // Clone out of the thread-local so no borrow is held during the rebuild.
    if let Some(bv) = current() {
        bv.notify();
    }
}

pub fn metrics_json(metrics: &Metrics) -> serde_json::Value {
    let snap = metrics.snapshot();
    let counters: serde_json::Map<String, serde_json::Value> = snap
        .counters
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::from(v)))
        .collect();
    let gauges: serde_json::Map<String, serde_json::Value> = snap
        .gauges
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::from(v)))
        .collect();
    serde_json::json!({ "counters": counters, "gauges": gauges })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    init_tracing();
    Ok(())
}

/// Starts observing the primary graph and mirroring it into the overview.
///
/// `config_json` is an optional JSON object (see `OverviewConfig`); omitted
/// fields use the stock page defaults. Returns `false` when the primary
/// surface is not in the document yet; call again once it is.
/// Starting twice replaces the previous instance.
#[wasm_bindgen]
pub fn birdview_start(config_json: Option<String>) -> Result<bool, JsValue> {
    init_tracing();

    let config = match config_json.as_deref() {
        Some(json) => {
            OverviewConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => OverviewConfig::default(),
    };

    birdview_stop();

    let window = dom::window()?;
    let document = dom::document()?;
    let primary = DomPrimarySurface::new(
        document.clone(),
        &config.dom.primary_root_selector,
        &config.dom.primary_container_id,
    );
    let Some(root) = primary.root() else {
        debug!(selector = %config.dom.primary_root_selector, "primary surface not in document");
        return Ok(false);
    };
    let overview = DomOverviewSurface::new(
        document,
        &config.dom.overview_container_id,
        config.focus.selector(),
    );

    let detector =
        ChangeDetector::with_release_delay(Rc::new(BrowserTimer), config.release_delay_ms);
    let renderer = OverviewRenderer::new(config.clone());
    let event_name = config.focus.event_name.clone();
    let focus_listener = renderer
        .focus()
        .subscribe(move |event| publish_focus(&window, &event_name, event));

    let on_mutation = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |_records: js_sys::Array, _observer: MutationObserver| on_mutations(),
    );
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    observer.observe_with_options(&root, &dom::observer_init())?;

    let bv = Rc::new(Birdview {
        renderer,
        detector,
        primary,
        overview: RefCell::new(overview),
        observer,
        _on_mutation: on_mutation,
        focus_listener,
    });
    BIRDVIEW.with(|b| *b.borrow_mut() = Some(Rc::clone(&bv)));
    info!(
        release_delay_ms = config.release_delay_ms,
        focus_event = %config.focus.event_name,
        "bird-view observing primary surface"
    );

    // Content drawn before observation started would otherwise wait for the next mutation.
    bv.notify();
    Ok(true)
}

/// Disconnects the observer and stops the detector. Safe to call when not started.
#[wasm_bindgen]
pub fn birdview_stop() {
    let previous = BIRDVIEW
        .try_with(|b| b.borrow_mut().take())
        .ok()
        .flatten();
    if let Some(bv) = previous {
        bv.shutdown();
        debug!("bird-view stopped");
    }
}

/// Requests a rebuild as if the primary surface had changed.
///
/// Returns `true` if a rebuild ran, `false` if it was coalesced or the
/// overview is not running.
#[wasm_bindgen]
pub fn birdview_render_now() -> bool {
    current().is_some_and(|bv| bv.notify() == Notification::Rendered)
}

/// Maps an overview pointer position to primary-content coordinates, as `[x, y]`.
#[wasm_bindgen]
pub fn birdview_content_point(x: f64, y: f64) -> Option<Vec<f64>> {
    let bv = current()?;
    let p = bv.renderer.content_point_at(Vec2::new(x, y))?;
    Some(vec![p.x, p.y])
}

/// Detector and renderer counters as a JSON string.
#[wasm_bindgen]
pub fn birdview_metrics() -> String {
    let mut metrics = Metrics::new();
    if let Some(bv) = current() {
        metrics.merge(&bv.detector.metrics());
        metrics.merge(&bv.renderer.metrics());
    }
    metrics_json(&metrics).to_string()
}

#[cfg(test)]
mod tests {
    use super::metrics_json;
    use pretty_assertions::assert_eq;
    use runtime::metrics::Metrics;

    #[test]
    fn metrics_json_groups_counters_and_gauges() {
        let mut m = Metrics::new();
        m.inc_counter("detector.renders", 2);
        m.set_gauge("render.focus_targets", 3);
        assert_eq!(
            metrics_json(&m),
            serde_json::json!({
                "counters": { "detector.renders": 2 },
                "gauges": { "render.focus_targets": 3 }
            })
        );
    }

    #[test]
    fn metrics_json_of_nothing_is_empty_groups() {
        assert_eq!(
            metrics_json(&Metrics::new()).to_string(),
            r#"{"counters":{},"gauges":{}}"#
        );
    }
}
