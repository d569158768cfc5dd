//! Structural diff between two snapshots.
//!
//! Derived data: recomputed from (reference, current) on demand, never
//! stored or incrementally maintained. Nodes and edges are compared
//! independently, keyed by id, with whole-record equality deciding
//! modified vs unchanged.

use crate::id::ElementId;
use crate::model::{Edge, Node, Snapshot};
use std::collections::HashMap;

/// Per-element comparison status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

/// Display granularity for version comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    #[default]
    Off,
    /// One color for anything added or modified.
    Simple,
    /// Distinct treatment per status.
    Detailed,
}

/// Visual treatment a status maps to at a given granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffHighlight {
    Changed,
    Added,
    Modified,
    Deleted,
}

impl DiffMode {
    /// Map a status to its visual treatment. `None` means no special
    /// treatment (unchanged, or diffing off).
    pub fn highlight(self, status: DiffStatus) -> Option<DiffHighlight> {
        match (self, status) {
            (DiffMode::Off, _) | (_, DiffStatus::Unchanged) => None,
            (DiffMode::Simple, DiffStatus::Added | DiffStatus::Modified) => {
                Some(DiffHighlight::Changed)
            }
            (_, DiffStatus::Deleted) => Some(DiffHighlight::Deleted),
            (DiffMode::Detailed, DiffStatus::Added) => Some(DiffHighlight::Added),
            (DiffMode::Detailed, DiffStatus::Modified) => Some(DiffHighlight::Modified),
        }
    }
}

/// Result of comparing a current snapshot against a reference.
///
/// The status maps cover every id present in either snapshot, deleted ones
/// included. Ghost lists carry the full records of reference-only elements
/// so they can be shown semi-transparent; they are not part of the current
/// snapshot and can never be selected or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    pub nodes: HashMap<ElementId, DiffStatus>,
    pub edges: HashMap<ElementId, DiffStatus>,
    pub ghost_nodes: Vec<Node>,
    pub ghost_edges: Vec<Edge>,
}

impl SnapshotDiff {
    /// Status of a node id; ids unknown to both snapshots are unchanged.
    pub fn node_status(&self, id: ElementId) -> DiffStatus {
        self.nodes.get(&id).copied().unwrap_or(DiffStatus::Unchanged)
    }

    pub fn edge_status(&self, id: ElementId) -> DiffStatus {
        self.edges.get(&id).copied().unwrap_or(DiffStatus::Unchanged)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.values().all(|s| *s == DiffStatus::Unchanged)
            && self.edges.values().all(|s| *s == DiffStatus::Unchanged)
    }
}

/// Compare `current` against `reference`.
pub fn snapshot_diff(reference: &Snapshot, current: &Snapshot) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();
    diff_elements(&reference.nodes, &current.nodes, |n| n.id, &mut diff.nodes, &mut diff.ghost_nodes);
    diff_elements(&reference.edges, &current.edges, |e| e.id, &mut diff.edges, &mut diff.ghost_edges);
    diff
}

fn diff_elements<T: Clone + PartialEq>(
    reference: &[T],
    current: &[T],
    id_of: impl Fn(&T) -> ElementId,
    statuses: &mut HashMap<ElementId, DiffStatus>,
    ghosts: &mut Vec<T>,
) {
    let by_id: HashMap<ElementId, &T> = reference.iter().map(|e| (id_of(e), e)).collect();
    for element in current {
        let status = match by_id.get(&id_of(element)) {
            None => DiffStatus::Added,
            Some(&previous) if previous != element => DiffStatus::Modified,
            Some(_) => DiffStatus::Unchanged,
        };
        statuses.insert(id_of(element), status);
    }
    // Everything left over exists only in the reference.
    for element in reference {
        if !statuses.contains_key(&id_of(element)) {
            statuses.insert(id_of(element), DiffStatus::Deleted);
            ghosts.push(element.clone());
        }
    }
}
