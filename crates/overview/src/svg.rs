//! SVG emission for the overview surface.

use std::fmt::Write as _;

use foundation::bounds::Rect;
use foundation::math::FitTransform;
use foundation::math::precision::canonical_f64;

use crate::config::{IndicatorStyle, OverviewConfig};

/// Shortest round-trippable number, with `-0` folded to `0`.
pub fn fmt(v: f64) -> String {
    format!("{}", canonical_f64(v))
}

pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `translate(tx,ty) scale(s)`: scale applies first, then the offset.
pub fn transform_attr(fit: &FitTransform) -> String {
    format!(
        "translate({},{}) scale({})",
        fmt(fit.translate_x),
        fmt(fit.translate_y),
        fmt(fit.scale)
    )
}

pub fn indicator_rect(rect: &Rect, style: &IndicatorStyle, id: &str) -> String {
    format!(
        r#"<rect id="{}" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
        escape_xml(id),
        fmt(rect.x),
        fmt(rect.y),
        fmt(rect.width),
        fmt(rect.height),
        escape_xml(&style.stroke),
        fmt(style.stroke_width)
    )
}

/// Full overview document: the cloned content inside a transformed group,
/// with the viewport indicator drawn after it so it stays on top.
pub fn overview_svg(
    content_markup: &str,
    fit: &FitTransform,
    indicator: &Rect,
    cfg: &OverviewConfig,
) -> String {
    let mut out = String::with_capacity(content_markup.len() + 256);
    let _ = write!(
        &mut out,
        r#"<svg id="{}" width="100%" height="100%">"#,
        escape_xml(&cfg.dom.overview_svg_id)
    );
    let _ = write!(
        &mut out,
        r#"<g id="{}" transform="{}">"#,
        escape_xml(&cfg.dom.content_wrapper_id),
        transform_attr(fit)
    );
    out.push_str(content_markup);
    out.push_str("</g>");
    out.push_str(&indicator_rect(indicator, &cfg.indicator, &cfg.dom.indicator_id));
    out.push_str("</svg>");
    out
}
