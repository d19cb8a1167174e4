use serde::{Deserialize, Serialize};

use crate::error::{OverviewError, Result};

/// Overview settings, usually handed over by the page as JSON.
///
/// Every field has a default matching the stock graph explorer page, so an
/// empty object (`{}`) is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverviewConfig {
    /// Cooldown after a rebuild before another change may trigger one.
    pub release_delay_ms: u64,
    pub indicator: IndicatorStyle,
    pub focus: FocusConfig,
    pub dom: DomTargets,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            release_delay_ms: 100,
            indicator: IndicatorStyle::default(),
            focus: FocusConfig::default(),
            dom: DomTargets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndicatorStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self {
            stroke: "red".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Which cloned nodes accept clicks, and what event a click publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FocusConfig {
    pub event_name: String,
    /// Class token carried by node groups.
    pub node_class: String,
    /// Attribute that must equal `"true"` for a node to be focusable.
    pub flag_attribute: String,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            event_name: crate::focus::FOCUS_EVENT.to_string(),
            node_class: "node".to_string(),
            flag_attribute: "click-focus".to_string(),
        }
    }
}

impl FocusConfig {
    /// CSS selector matching focusable node groups, e.g. `g.node[click-focus='true']`.
    pub fn selector(&self) -> String {
        format!("g.{}[{}='true']", self.node_class, self.flag_attribute)
    }
}

/// Element lookups used by the browser binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomTargets {
    /// Root element of the primary rendering; observed for mutations.
    pub primary_root_selector: String,
    /// Element whose client size is the primary viewport.
    pub primary_container_id: String,
    /// Mount point owned by the overview.
    pub overview_container_id: String,
    pub overview_svg_id: String,
    pub content_wrapper_id: String,
    pub indicator_id: String,
}

impl Default for DomTargets {
    fn default() -> Self {
        Self {
            primary_root_selector: "#main-canvas svg".to_string(),
            primary_container_id: "main-canvas".to_string(),
            overview_container_id: "bird-content".to_string(),
            overview_svg_id: "bird-view-svg".to_string(),
            content_wrapper_id: "bird-content-wrapper".to_string(),
            indicator_id: "bird-view-border".to_string(),
        }
    }
}

fn is_css_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl OverviewConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: OverviewConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.indicator.stroke_width.is_finite() || self.indicator.stroke_width < 0.0 {
            return Err(OverviewError::Config(format!(
                "indicator.strokeWidth must be a finite non-negative number, got {}",
                self.indicator.stroke_width
            )));
        }
        if self.focus.event_name.trim().is_empty() {
            return Err(OverviewError::Config(
                "focus.eventName must not be empty".to_string(),
            ));
        }
        // Both end up inside a CSS selector.
        for (field, value) in [
            ("focus.nodeClass", &self.focus.node_class),
            ("focus.flagAttribute", &self.focus.flag_attribute),
        ] {
            if !is_css_ident(value) {
                return Err(OverviewError::Config(format!(
                    "{field} must be a plain identifier, got {value:?}"
                )));
            }
        }
        Ok(())
    }
}
