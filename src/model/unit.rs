use super::{BundleKind, Component, Hint};
use serde::{Deserialize, Serialize};

/// A scanned unit as described by the surrounding pipeline.
///
/// Unit files are JSON documents of this shape:
///
/// ```json
/// {
///   "bundle_kind": "package",
///   "bundle_id": "foo",
///   "components": [
///     { "component": { "id": "org.example.Foo", "kind": "desktop-application" },
///       "data": ["<metainfo data>", "<desktop-entry data>"] }
///   ],
///   "hints": [ { "component_id": "org.example.Foo",
///                "hint": { "tag": "icon-not-found", "severity": "warning" } } ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_kind: Option<BundleKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentInput>,
    #[serde(default)]
    pub hints: Vec<HintInput>,
}

/// A discovered component plus the data fragments found for it, in the order
/// they were found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInput {
    pub component: Component,
    #[serde(default)]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintInput {
    pub component_id: String,
    pub hint: Hint,
}
