//! Pure snapshot mutations.
//!
//! Free functions over `&mut Snapshot`, run inside history commits. Each
//! validates its target and declines by returning `false` rather than
//! leaving the snapshot half-updated. Declines are normal control flow
//! (stale ids, policy violations), logged at debug and otherwise silent.

use fc_core::hierarchy::{descendants, is_ancestor};
use fc_core::{Edge, EdgePatch, ElementId, Node, NodePatch, Snapshot};
use std::collections::HashSet;

/// Append a node. Declines when the id is already taken.
pub fn add_node(snapshot: &mut Snapshot, node: Node) -> bool {
    if snapshot.contains_node(node.id) {
        log::debug!("add_node: id {} already present", node.id);
        return false;
    }
    snapshot.nodes.push(node);
    true
}

/// Append an edge between two distinct connectable nodes. Containers and
/// notes never terminate an edge; self-loops are declined.
pub fn add_edge(snapshot: &mut Snapshot, edge: Edge) -> bool {
    if snapshot.contains_edge(edge.id) {
        log::debug!("add_edge: id {} already present", edge.id);
        return false;
    }
    if edge.source_id == edge.target_id {
        log::debug!("add_edge: self-loop on {} declined", edge.source_id);
        return false;
    }
    if !valid_endpoint(snapshot, edge.source_id) || !valid_endpoint(snapshot, edge.target_id) {
        log::debug!("add_edge: {} -> {} has an invalid endpoint", edge.source_id, edge.target_id);
        return false;
    }
    snapshot.edges.push(edge);
    true
}

/// Apply a partial node update. A parent change must keep the hierarchy
/// acyclic and point at a container; an invalid target declines the whole
/// patch.
pub fn update_node(snapshot: &mut Snapshot, id: ElementId, patch: &NodePatch) -> bool {
    if !snapshot.contains_node(id) {
        return false;
    }
    if let Some(Some(new_parent)) = patch.parent_id
        && !parent_allowed(snapshot, id, new_parent)
    {
        log::debug!("update_node: cannot parent {id} under {new_parent}");
        return false;
    }
    match snapshot.node_mut(id) {
        Some(node) => {
            node.apply(patch);
            true
        }
        None => false,
    }
}

/// Apply a partial edge update. Endpoint reassignment keeps the
/// connectable policy and must not produce a self-loop.
pub fn update_edge(snapshot: &mut Snapshot, id: ElementId, patch: &EdgePatch) -> bool {
    let Some(edge) = snapshot.edge(id) else {
        return false;
    };
    let source = patch.source_id.unwrap_or(edge.source_id);
    let target = patch.target_id.unwrap_or(edge.target_id);
    if source == target {
        log::debug!("update_edge: {id} would become a self-loop");
        return false;
    }
    for endpoint in [patch.source_id, patch.target_id].into_iter().flatten() {
        if !valid_endpoint(snapshot, endpoint) {
            log::debug!("update_edge: {id} cannot terminate at {endpoint}");
            return false;
        }
    }
    match snapshot.edge_mut(id) {
        Some(edge) => {
            edge.apply(patch);
            true
        }
        None => false,
    }
}

/// Remove a node, its transitive descendants, and every edge with an
/// endpoint among the removed.
pub fn delete_node_cascade(snapshot: &mut Snapshot, id: ElementId) -> bool {
    if !snapshot.contains_node(id) {
        return false;
    }
    let mut doomed: HashSet<ElementId> = descendants(snapshot, id).into_iter().collect();
    doomed.insert(id);
    snapshot.nodes.retain(|n| !doomed.contains(&n.id));
    snapshot
        .edges
        .retain(|e| !doomed.contains(&e.source_id) && !doomed.contains(&e.target_id));
    log::debug!("delete_node_cascade: removed {} node(s) under {id}", doomed.len());
    true
}

pub fn delete_edge(snapshot: &mut Snapshot, id: ElementId) -> bool {
    let before = snapshot.edges.len();
    snapshot.edges.retain(|e| e.id != id);
    snapshot.edges.len() != before
}

/// Whether `id` may terminate an edge: it must exist and be connectable.
pub fn valid_endpoint(snapshot: &Snapshot, id: ElementId) -> bool {
    snapshot.node(id).is_some_and(|n| n.node_type.is_connectable())
}

/// Whether a node may be parented under `parent_id`: the target must
/// exist, be a container, and be neither the node itself nor anything in
/// its subtree.
pub fn parent_allowed(snapshot: &Snapshot, id: ElementId, parent_id: ElementId) -> bool {
    if parent_id == id {
        return false;
    }
    let Some(target) = snapshot.node(parent_id) else {
        return false;
    };
    if !target.node_type.is_container() {
        return false;
    }
    !is_ancestor(snapshot, id, parent_id)
}
