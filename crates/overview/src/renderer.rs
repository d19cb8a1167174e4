use std::cell::{Cell, RefCell};

use foundation::bounds::Rect;
use foundation::math::{FitTransform, Vec2, compute_fit, compute_viewport_indicator};
use runtime::metrics::Metrics;
use tracing::{debug, warn};

use crate::config::OverviewConfig;
use crate::error::Result;
use crate::focus::FocusDispatcher;
use crate::markup::scan_nodes;
use crate::surface::{OverviewFrame, OverviewSurface, PrimarySurface};
use crate::svg::overview_svg;

/// Why a render left the overview untouched or blank.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Primary surface or overview container is not in the document.
    MissingSurface,
    /// Primary surface exists but has no markup yet.
    EmptyContent,
    /// Zero-area or unmeasurable content or container; the overview is left blank.
    DegenerateGeometry,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderReport {
    pub fit: FitTransform,
    pub indicator: Rect,
    /// Node groups found by scanning the cloned markup.
    pub nodes: usize,
    /// Nodes the overview surface actually wired for clicks.
    pub focus_targets: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered(RenderReport),
    Skipped(SkipReason),
}

/// Rebuilds the overview from whatever the primary surface currently shows.
///
/// Steps of one [`render`](Self::render):
/// 1. read primary markup and measure (absent or empty: no-op)
/// 2. clear the overview
/// 3. fit content into the container (degenerate: stop, overview stays blank)
/// 4. derive the viewport indicator
/// 5. scan cloned nodes, mount the frame and wire focusable nodes
///
/// Re-entrancy and cooldown are the caller's concern; see
/// `runtime::ChangeDetector`.
#[derive(Debug)]
pub struct OverviewRenderer {
    config: OverviewConfig,
    focus: FocusDispatcher,
    last_fit: Cell<Option<FitTransform>>,
    metrics: RefCell<Metrics>,
}

impl OverviewRenderer {
    pub fn new(config: OverviewConfig) -> Self {
        Self::with_dispatcher(config, FocusDispatcher::new())
    }

    pub fn with_dispatcher(config: OverviewConfig, focus: FocusDispatcher) -> Self {
        Self {
            config,
            focus,
            last_fit: Cell::new(None),
            metrics: RefCell::new(Metrics::new()),
        }
    }

    pub fn focus(&self) -> &FocusDispatcher {
        &self.focus
    }

    /// Transform of the most recent successful render.
    pub fn last_fit(&self) -> Option<FitTransform> {
        self.last_fit.get()
    }

    /// Maps an overview pointer position to primary-content coordinates.
    pub fn content_point_at(&self, overview_point: Vec2) -> Option<Vec2> {
        self.last_fit.get().map(|fit| fit.to_content(overview_point))
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.borrow().clone()
    }

    fn skipped(&self, reason: SkipReason) -> Result<RenderOutcome> {
        debug!(?reason, "overview render skipped");
        let name = match reason {
            SkipReason::MissingSurface => "render.skipped.missing_surface",
            SkipReason::EmptyContent => "render.skipped.empty_content",
            SkipReason::DegenerateGeometry => "render.skipped.degenerate_geometry",
        };
        self.metrics.borrow_mut().inc_counter(name, 1);
        Ok(RenderOutcome::Skipped(reason))
    }

    pub fn render<P, O>(&self, primary: &P, overview: &mut O) -> Result<RenderOutcome>
    where
        P: PrimarySurface + ?Sized,
        O: OverviewSurface + ?Sized,
    {
        let Some(markup) = primary.markup() else {
            return self.skipped(SkipReason::MissingSurface);
        };
        if markup.trim().is_empty() {
            return self.skipped(SkipReason::EmptyContent);
        }
        let Some(container) = overview.container_size() else {
            return self.skipped(SkipReason::MissingSurface);
        };

        overview.clear();
        self.last_fit.set(None);

        let fit = primary
            .content_bbox()
            .and_then(|bbox| compute_fit(bbox, container));
        let Some(fit) = fit else {
            return self.skipped(SkipReason::DegenerateGeometry);
        };
        let indicator = compute_viewport_indicator(&fit, primary.viewport_size());

        let nodes = scan_nodes(&markup, &self.config.focus).unwrap_or_else(|err| {
            warn!(%err, "cloned markup not scannable; overview nodes will not be clickable");
            Vec::new()
        });

        let frame = OverviewFrame {
            svg: overview_svg(&markup, &fit, &indicator, &self.config),
            fit,
            indicator,
            nodes,
        };
        let focus_targets = overview.mount(&frame, &self.focus)?;
        self.last_fit.set(Some(fit));

        let report = RenderReport {
            fit,
            indicator,
            nodes: frame.nodes.len(),
            focus_targets,
        };
        {
            let mut m = self.metrics.borrow_mut();
            m.inc_counter("render.rendered", 1);
            m.set_gauge("render.nodes", report.nodes as i64);
            m.set_gauge("render.focus_targets", report.focus_targets as i64);
        }
        debug!(
            scale = fit.scale,
            translate_x = fit.translate_x,
            translate_y = fit.translate_y,
            nodes = report.nodes,
            focus_targets = report.focus_targets,
            "overview rendered"
        );
        Ok(RenderOutcome::Rendered(report))
    }
}
