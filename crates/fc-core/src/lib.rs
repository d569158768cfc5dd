//! FlowCanvas core: the flow-diagram data model and the pure derivations
//! over it — containment hierarchy, hit-testing, and snapshot diffing.
//!
//! Everything here is value-semantic and side-effect free. The editor
//! crate layers history, interactions, and persistence on top.

pub mod diff;
pub mod geometry;
pub mod hierarchy;
pub mod hit;
pub mod id;
pub mod model;

pub use diff::{DiffHighlight, DiffMode, DiffStatus, SnapshotDiff, snapshot_diff};
pub use geometry::{Camera, Point, Viewport, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
pub use id::ElementId;
pub use model::{
    Bounds, Edge, EdgePatch, EdgeType, MIN_CONTAINER_HEIGHT, MIN_CONTAINER_WIDTH, Node, NodePatch,
    NodeType, Snapshot, Variable, Version,
};
