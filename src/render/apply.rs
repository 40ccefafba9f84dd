//! Attribute and style application.
//!
//! Splits a descriptor into what the host should set for a lifecycle state:
//! - attribute fields (everything that is not structural or an event field)
//! - inline styles
//! - text content, and HTML markup when a node starts
//!
//! Field names are camelCase in descriptors and kebab-case on nodes, except
//! for SVG attributes whose canonical spelling is mixed case
//! ([`PRESERVED_ATTRIBUTES`]).

use std::borrow::Cow;

use crate::descriptor::{ElementDescriptor, is_structural};
use crate::host::{Scene, Targets};
use crate::types::{LifecycleState, NodeId};

use super::resolve::evaluate;

/// SVG attribute names that keep their mixed-case spelling.
pub const PRESERVED_ATTRIBUTES: &[&str] = &[
    "allowReorder",
    "attributeName",
    "attributeType",
    "autoReverse",
    "baseFrequency",
    "baseProfile",
    "calcMode",
    "clipPathUnits",
    "contentScriptType",
    "contentStyleType",
    "diffuseConstant",
    "edgeMode",
    "externalResourceRequired",
    "filterRes",
    "filterUnits",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "kernelMatrix",
    "kernelUnitLength",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lengthAdjust",
    "limitingConeAngle",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "maskContentUnits",
    "maskUnits",
    "numOctaves",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "referrerPolicy",
    "refX",
    "refY",
    "repeatCount",
    "repeatDur",
    "requiredExtensions",
    "requiredFeatures",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "surfaceScale",
    "systemLanguage",
    "tableValues",
    "targetX",
    "targetY",
    "textLength",
    "viewBox",
    "xChannelSelector",
    "yChannelSelector",
    "zoomAndPan",
];

/// Convert `camelCase` to `kebab-case`.
///
/// Every ASCII uppercase letter becomes `-` plus its lowercase form, so a
/// leading capital yields a leading hyphen (`WebkitTransform` →
/// `-webkit-transform`).
pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Host attribute name for a descriptor field name.
pub fn attribute_name(field: &str) -> Cow<'_, str> {
    if PRESERVED_ATTRIBUTES.contains(&field) {
        Cow::Borrowed(field)
    } else {
        Cow::Owned(camel_to_kebab(field))
    }
}

/// Resolve and evaluate every attribute, style and text field for `state`.
///
/// Fields that resolve to unset are left out. Structural names and names
/// starting with `event_prefix` never become attributes.
pub fn targets(
    datum: &ElementDescriptor,
    index: usize,
    node: NodeId,
    state: LifecycleState,
    event_prefix: &str,
) -> Targets {
    let mut targets = Targets::default();

    for (name, field) in &datum.attributes {
        if is_structural(name) || (!event_prefix.is_empty() && name.starts_with(event_prefix)) {
            continue;
        }
        if let Some(value) = evaluate(field, state, datum, index, node) {
            targets
                .attributes
                .push((attribute_name(name).into_owned(), value.to_string()));
        }
    }

    if let Some(text) = datum.text.as_deref().filter(|t| !t.is_empty()) {
        targets.text = Some(text.to_string());
    }

    for (name, field) in &datum.style {
        if let Some(value) = evaluate(field, state, datum, index, node) {
            targets.styles.push((camel_to_kebab(name), value.to_string()));
        }
    }

    targets
}

/// Write `targets` to `node` immediately.
///
/// Best effort: a rejected field is logged and the rest still applied.
pub fn write_targets(scene: &mut dyn Scene, node: NodeId, targets: &Targets) {
    for (name, value) in &targets.attributes {
        if let Err(err) = scene.set_attribute(node, name, Some(value)) {
            tracing::warn!(%node, attribute = %name, error = %err, "attribute not applied");
        }
    }

    if let Some(text) = &targets.text {
        if let Err(err) = scene.set_text(node, text) {
            tracing::warn!(%node, error = %err, "text not applied");
        }
    }

    for (name, value) in &targets.styles {
        if let Err(err) = scene.set_style(node, name, Some(value)) {
            tracing::warn!(%node, style = %name, error = %err, "style not applied");
        }
    }
}

/// Apply the values of `datum` for `state` to `node` without animation.
///
/// In the `Start` state the `html` field is applied as well.
pub fn apply(
    scene: &mut dyn Scene,
    node: NodeId,
    datum: &ElementDescriptor,
    index: usize,
    state: LifecycleState,
    event_prefix: &str,
) {
    let targets = targets(datum, index, node, state, event_prefix);
    write_targets(scene, node, &targets);

    if state == LifecycleState::Start {
        if let Some(html) = datum.html.as_deref().filter(|h| !h.is_empty()) {
            if let Err(err) = scene.set_html(node, html) {
                tracing::warn!(%node, error = %err, "html not applied");
            }
        }
    }
}
