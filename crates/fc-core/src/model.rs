//! Core data model for flow diagrams.
//!
//! A diagram is a flat [`Snapshot`] of nodes and edges. Containment is a
//! `parentId` on the child, not a nested structure, so snapshots clone and
//! compare as plain values — undo history and version diffing both lean on
//! that. All geometry is in world coordinates (f32).

use crate::id::ElementId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum width enforced while resizing a container.
pub const MIN_CONTAINER_WIDTH: f32 = 300.0;
/// Minimum height enforced while resizing a container.
pub const MIN_CONTAINER_HEIGHT: f32 = 200.0;

// ─── Node kinds ─────────────────────────────────────────────────────────────

/// The closed set of node kinds. Only `Page` can contain other nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Screen/page container. The only kind that can hold children.
    Page,
    /// On-screen element (button, form, list).
    Ui,
    /// User or system action.
    Action,
    /// Branching or computation step.
    Logic,
    /// Data entity.
    Entity,
    /// Third-party system boundary.
    External,
    /// Freestanding annotation. Carries no edges.
    Note,
}

impl NodeType {
    /// Whether nodes of this kind may contain children via `parentId`.
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Page)
    }

    /// Whether nodes of this kind expose a connection anchor and may be
    /// used as edge endpoints. Containers and notes carry no edges.
    pub fn is_connectable(self) -> bool {
        !matches!(self, NodeType::Page | NodeType::Note)
    }

    /// Human-facing name, used as the default title for new nodes.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeType::Page => "Page",
            NodeType::Ui => "UI Element",
            NodeType::Action => "Action",
            NodeType::Logic => "Logic",
            NodeType::Entity => "Entity",
            NodeType::External => "External System",
            NodeType::Note => "Note",
        }
    }

    /// Default (width, height) for newly added nodes of this kind.
    pub fn default_size(self) -> (f32, f32) {
        match self {
            NodeType::Page => (400.0, 300.0),
            NodeType::Note => (200.0, 120.0),
            _ => (160.0, 100.0),
        }
    }
}

/// Semantic flavor of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Screen-to-screen flow.
    #[default]
    Navigation,
    /// Conditional/branch flow.
    Logic,
    /// Data read/write.
    Data,
    /// Call into an external system.
    System,
}

// ─── Geometry ───────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Whether the world point is inside these bounds. Edges count as inside.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the right edge — where the connection anchor sits.
    pub fn right_center(&self) -> (f32, f32) {
        (self.x + self.width, self.y + self.height / 2.0)
    }
}

// ─── Elements ───────────────────────────────────────────────────────────────

/// A key/value variable attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: ElementId,
    pub key: String,
    pub value: String,
}

/// A single diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Containing node's id. Must name a container; anything else is
    /// treated as unparented by the hierarchy walks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Locked nodes cannot be dragged, resized, or targeted by drops.
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl Node {
    /// Create a node at (x, y) with its kind's default size and title.
    pub fn new(id: ElementId, node_type: NodeType, x: f32, y: f32) -> Self {
        let (width, height) = node_type.default_size();
        Node {
            id,
            node_type,
            x,
            y,
            width,
            height,
            title: node_type.display_name().to_string(),
            description: String::new(),
            parent_id: None,
            locked: false,
            variables: Vec::new(),
            docs: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, width: self.width, height: self.height }
    }

    /// Overlay a partial update. Only `Some` fields overwrite.
    pub fn apply(&mut self, patch: &NodePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(variables) = &patch.variables {
            self.variables = variables.clone();
        }
        if let Some(docs) = &patch.docs {
            self.docs = docs.clone();
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: ElementId,
    pub source_id: ElementId,
    pub target_id: ElementId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Edge {
    /// Create an edge with the default type and an empty label.
    pub fn new(id: ElementId, source_id: ElementId, target_id: ElementId) -> Self {
        Edge {
            id,
            source_id,
            target_id,
            label: String::new(),
            edge_type: EdgeType::default(),
            condition: None,
        }
    }

    /// Overlay a partial update. Only `Some` fields overwrite.
    pub fn apply(&mut self, patch: &EdgePatch) {
        if let Some(source_id) = patch.source_id {
            self.source_id = source_id;
        }
        if let Some(target_id) = patch.target_id {
            self.target_id = target_id;
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(edge_type) = patch.edge_type {
            self.edge_type = edge_type;
        }
        if let Some(condition) = &patch.condition {
            self.condition = condition.clone();
        }
    }
}

// ─── Patches ────────────────────────────────────────────────────────────────

/// Partial node update from the property form. `parent_id` and `docs`
/// distinguish "leave alone" (`None`) from "set to nothing" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub parent_id: Option<Option<ElementId>>,
    pub locked: Option<bool>,
    pub variables: Option<Vec<Variable>>,
    pub docs: Option<Option<String>>,
}

/// Partial edge update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub source_id: Option<ElementId>,
    pub target_id: Option<ElementId>,
    pub label: Option<String>,
    pub edge_type: Option<EdgeType>,
    pub condition: Option<Option<String>>,
}

// ─── Snapshot ───────────────────────────────────────────────────────────────

/// The entire canvas at one point in time. Plain value: cloning is a deep
/// copy, equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: ElementId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: ElementId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: ElementId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn contains_edge(&self, id: ElementId) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }
}

/// A named, timestamped copy of the whole canvas.
///
/// Serializes flat: `{id, name, timestamp, nodes, edges}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: ElementId,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(id: &str, node_type: NodeType) -> Node {
        Node::new(ElementId::intern(id), node_type, 0.0, 0.0)
    }

    #[test]
    fn only_pages_are_containers() {
        assert!(NodeType::Page.is_container());
        for ty in [
            NodeType::Ui,
            NodeType::Action,
            NodeType::Logic,
            NodeType::Entity,
            NodeType::External,
            NodeType::Note,
        ] {
            assert!(!ty.is_container(), "{ty:?} must not contain children");
        }
    }

    #[test]
    fn pages_and_notes_are_not_connectable() {
        assert!(!NodeType::Page.is_connectable());
        assert!(!NodeType::Note.is_connectable());
        assert!(NodeType::Ui.is_connectable());
        assert!(NodeType::External.is_connectable());
    }

    #[test]
    fn new_node_gets_type_defaults() {
        let page = node("home", NodeType::Page);
        assert_eq!((page.width, page.height), (400.0, 300.0));
        assert_eq!(page.title, "Page");

        let note = node("n1", NodeType::Note);
        assert_eq!((note.width, note.height), (200.0, 120.0));

        let action = node("a1", NodeType::Action);
        assert_eq!((action.width, action.height), (160.0, 100.0));
        assert_eq!(action.title, "Action");
    }

    #[test]
    fn bounds_contains_is_edge_inclusive() {
        let b = Bounds { x: 10.0, y: 20.0, width: 100.0, height: 50.0 };
        assert!(b.contains(10.0, 20.0));
        assert!(b.contains(110.0, 70.0));
        assert!(b.contains(60.0, 45.0));
        assert!(!b.contains(9.9, 45.0));
        assert!(!b.contains(110.1, 45.0));
    }

    #[test]
    fn node_patch_overwrites_only_some_fields() {
        let mut n = node("login", NodeType::Ui);
        n.description = "before".to_string();
        let patch = NodePatch { title: Some("Login button".to_string()), x: Some(42.0), ..Default::default() };
        n.apply(&patch);
        assert_eq!(n.title, "Login button");
        assert_eq!(n.x, 42.0);
        assert_eq!(n.description, "before");
        assert_eq!(n.y, 0.0);
    }

    #[test]
    fn node_patch_can_clear_parent() {
        let mut n = node("btn", NodeType::Ui);
        n.parent_id = Some(ElementId::intern("home"));
        n.apply(&NodePatch::default());
        assert_eq!(n.parent_id, Some(ElementId::intern("home")));
        n.apply(&NodePatch { parent_id: Some(None), ..Default::default() });
        assert_eq!(n.parent_id, None);
    }

    #[test]
    fn node_serializes_with_camel_case_keys() {
        let mut n = node("btn", NodeType::Ui);
        n.parent_id = Some(ElementId::intern("home"));
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "ui");
        assert_eq!(json["parentId"], "home");
        assert_eq!(json["locked"], false);
        assert!(json.get("docs").is_none(), "empty docs must not serialize");
    }

    #[test]
    fn edge_defaults_to_navigation() {
        let e = Edge::new(
            ElementId::intern("e1"),
            ElementId::intern("a"),
            ElementId::intern("b"),
        );
        assert_eq!(e.edge_type, EdgeType::Navigation);
        assert_eq!(e.label, "");

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["sourceId"], "a");
        assert_eq!(json["targetId"], "b");
        assert_eq!(json["type"], "navigation");
    }

    #[test]
    fn bare_edge_json_fills_defaults() {
        let e: Edge = serde_json::from_str(r#"{"id":"e1","sourceId":"a","targetId":"b"}"#).unwrap();
        assert_eq!(e.edge_type, EdgeType::Navigation);
        assert_eq!(e.label, "");
        assert_eq!(e.condition, None);
    }

    #[test]
    fn snapshot_equality_is_structural() {
        let mut a = Snapshot::default();
        a.nodes.push(node("home", NodeType::Page));
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = b.clone();
        if let Some(n) = c.node_mut(ElementId::intern("home")) {
            n.x += 1.0;
        }
        assert_ne!(a, c);
    }

    #[test]
    fn version_serializes_flat() {
        let mut snapshot = Snapshot::default();
        snapshot.nodes.push(node("home", NodeType::Page));
        let v = Version {
            id: ElementId::intern("v_1"),
            name: "first draft".to_string(),
            timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
            snapshot,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["id"], "v_1");
        assert_eq!(json["name"], "first draft");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert!(json["nodes"].is_array(), "snapshot must flatten into the version");
        assert!(json["edges"].is_array());

        let back: Version = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }
}
