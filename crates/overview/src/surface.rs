use foundation::bounds::{Rect, Size};
use foundation::ids::NodeRef;
use foundation::math::FitTransform;

use crate::error::Result;
use crate::focus::FocusDispatcher;
use crate::markup::OverviewNode;

/// The externally owned graph rendering. Read-only from the overview's side.
pub trait PrimarySurface {
    /// Serialized drawable content, or `None` if the surface is not in the document.
    fn markup(&self) -> Option<String>;

    /// Bounding box of the drawable content in the surface's own coordinates.
    fn content_bbox(&self) -> Option<Rect>;

    /// Rendered pixel size of the primary container.
    fn viewport_size(&self) -> Size;
}

/// The overview mount point. Its content is fully replaced on every rebuild.
pub trait OverviewSurface {
    /// Measured pixel size, or `None` if the container is not in the document.
    fn container_size(&self) -> Option<Size>;

    /// Drops everything previously mounted, including click handlers.
    fn clear(&mut self);

    /// Mounts `frame` and wires each focusable node to `focus`.
    ///
    /// Returns how many nodes were wired. Surfaces that select targets
    /// themselves may disagree with `frame.nodes`.
    fn mount(&mut self, frame: &OverviewFrame, focus: &FocusDispatcher) -> Result<usize>;
}

/// One complete overview rebuild, ready to be mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewFrame {
    /// Complete overview document (see [`crate::svg::overview_svg`]).
    pub svg: String,
    pub fit: FitTransform,
    pub indicator: Rect,
    pub nodes: Vec<OverviewNode>,
}

impl OverviewFrame {
    pub fn node(&self, id: &str) -> Option<&OverviewNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn focus_targets(&self) -> impl Iterator<Item = &NodeRef> + '_ {
        self.nodes.iter().filter(|n| n.focusable).map(|n| &n.id)
    }
}

/// Primary surface backed by plain values; useful for tests and headless runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPrimarySurface {
    pub markup: Option<String>,
    pub content_bbox: Option<Rect>,
    pub viewport: Size,
}

impl MemoryPrimarySurface {
    pub fn new(markup: impl Into<String>, content_bbox: Rect, viewport: Size) -> Self {
        Self {
            markup: Some(markup.into()),
            content_bbox: Some(content_bbox),
            viewport,
        }
    }

    /// A surface that is not attached to any document.
    pub fn absent() -> Self {
        Self::default()
    }
}

impl PrimarySurface for MemoryPrimarySurface {
    fn markup(&self) -> Option<String> {
        self.markup.clone()
    }

    fn content_bbox(&self) -> Option<Rect> {
        self.content_bbox
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }
}

#[derive(Debug, Clone)]
struct Mounted {
    frame: OverviewFrame,
    focus: FocusDispatcher,
}

/// Overview surface that keeps the mounted frame in memory and simulates clicks.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverviewSurface {
    container: Option<Size>,
    mounted: Option<Mounted>,
    clears: usize,
    mounts: usize,
}

impl MemoryOverviewSurface {
    pub fn new(container: Size) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<&OverviewFrame> {
        self.mounted.as_ref().map(|m| &m.frame)
    }

    pub fn svg(&self) -> Option<&str> {
        self.frame().map(|f| f.svg.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.mounted.is_none()
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    /// Clicks the cloned node `id`.
    ///
    /// Returns `true` if the node had a click handler, i.e. it exists and is
    /// focusable.
    pub fn click(&self, id: &str) -> bool {
        let Some(mounted) = &self.mounted else {
            return false;
        };
        match mounted.frame.node(id) {
            Some(node) if node.focusable => {
                mounted.focus.dispatch_focus(&node.id);
                true
            }
            _ => false,
        }
    }
}

impl OverviewSurface for MemoryOverviewSurface {
    fn container_size(&self) -> Option<Size> {
        self.container
    }

    fn clear(&mut self) {
        self.mounted = None;
        self.clears += 1;
    }

    fn mount(&mut self, frame: &OverviewFrame, focus: &FocusDispatcher) -> Result<usize> {
        self.mounted = Some(Mounted {
            frame: frame.clone(),
            focus: focus.clone(),
        });
        self.mounts += 1;
        Ok(frame.focus_targets().count())
    }
}
