//! Node discovery in cloned primary markup.
//!
//! The primary surface hands over the inner markup of its root `<svg>`, which
//! is a fragment with possibly several top-level elements and namespaced
//! attributes. It is wrapped in a synthetic root declaring the SVG and XLink
//! namespaces before parsing.
//!
//! Browsers serialize `innerHTML` with HTML rules, which write U+00A0 as
//! `&nbsp;`. That is the only named entity the serializer emits beyond the
//! XML built-ins, so the wrapper declares it.

use foundation::ids::NodeRef;
use tracing::trace;

use crate::config::FocusConfig;
use crate::error::Result;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A node group found in the cloned markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewNode {
    pub id: NodeRef,
    pub focusable: bool,
}

fn has_class(node: &roxmltree::Node<'_, '_>, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|c| c.split_whitespace().any(|token| token == class))
}

/// Lists every `<g>` carrying the node class and an `id`, in document order.
///
/// A node is focusable when its flag attribute is exactly `"true"`. Node
/// groups without an `id` cannot be correlated back to the primary surface
/// and are skipped.
pub fn scan_nodes(markup: &str, focus: &FocusConfig) -> Result<Vec<OverviewNode>> {
    let wrapped = format!(
        r#"<!DOCTYPE svg [<!ENTITY nbsp "&#160;">]><svg xmlns="{SVG_NS}" xmlns:xlink="{XLINK_NS}">{markup}</svg>"#
    );
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(&wrapped, options)?;

    let mut nodes = Vec::new();
    for node in doc.descendants() {
        if !node.is_element() || node.tag_name().name() != "g" {
            continue;
        }
        if !has_class(&node, &focus.node_class) {
            continue;
        }
        let focusable = node.attribute(focus.flag_attribute.as_str()) == Some("true");
        match node.attribute("id").filter(|id| !id.trim().is_empty()) {
            Some(id) => nodes.push(OverviewNode {
                id: NodeRef::new(id),
                focusable,
            }),
            None => trace!(focusable, "skipping node group without id"),
        }
    }
    Ok(nodes)
}
