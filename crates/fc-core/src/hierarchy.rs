//! Parent/child derivations over a snapshot.
//!
//! Containment is a `parentId` on the child, so every relationship here is
//! derived by scanning. The walks are defensive: a parent id naming a
//! missing or non-container node counts as no parent, and chain walks carry
//! visited sets so a malformed document (a cycle smuggled in by import)
//! terminates instead of hanging.

use crate::id::ElementId;
use crate::model::{Node, Snapshot};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Resolve a node's effective parent. The referenced node must exist and
/// be a container; anything else counts as unparented.
pub fn effective_parent(snapshot: &Snapshot, node: &Node) -> Option<ElementId> {
    let parent_id = node.parent_id?;
    match snapshot.node(parent_id) {
        Some(parent) if parent.node_type.is_container() => Some(parent_id),
        _ => {
            log::trace!("node {} has dangling parent {parent_id}", node.id);
            None
        }
    }
}

/// Direct children of `id`.
pub fn children_of(snapshot: &Snapshot, id: ElementId) -> SmallVec<[ElementId; 8]> {
    snapshot
        .nodes
        .iter()
        .filter(|n| effective_parent(snapshot, n) == Some(id))
        .map(|n| n.id)
        .collect()
}

/// All nodes transitively parented under `id`, not including `id` itself.
pub fn descendants(snapshot: &Snapshot, id: ElementId) -> Vec<ElementId> {
    let mut out = Vec::new();
    let mut seen: HashSet<ElementId> = HashSet::new();
    seen.insert(id);
    let mut frontier = vec![id];
    while let Some(next) = frontier.pop() {
        for child in children_of(snapshot, next) {
            if seen.insert(child) {
                out.push(child);
                frontier.push(child);
            }
        }
    }
    out
}

/// Whether `ancestor` appears on `node`'s parent chain. A node is not its
/// own ancestor.
pub fn is_ancestor(snapshot: &Snapshot, ancestor: ElementId, node: ElementId) -> bool {
    if ancestor == node {
        return false;
    }
    let mut seen: HashSet<ElementId> = HashSet::new();
    seen.insert(node);
    let mut current = snapshot.node(node).and_then(|n| effective_parent(snapshot, n));
    while let Some(parent_id) = current {
        if parent_id == ancestor {
            return true;
        }
        if !seen.insert(parent_id) {
            break;
        }
        current = snapshot.node(parent_id).and_then(|n| effective_parent(snapshot, n));
    }
    false
}

/// Nesting depth: 0 for roots, parents walked to the top.
pub fn depth(snapshot: &Snapshot, id: ElementId) -> usize {
    let mut d = 0;
    let mut seen: HashSet<ElementId> = HashSet::new();
    seen.insert(id);
    let mut current = snapshot.node(id).and_then(|n| effective_parent(snapshot, n));
    while let Some(parent_id) = current {
        if !seen.insert(parent_id) {
            break;
        }
        d += 1;
        current = snapshot.node(parent_id).and_then(|n| effective_parent(snapshot, n));
    }
    d
}

/// Node ids in paint order: shallower first, insertion order within a
/// depth. Hit-testing walks the reverse of this so children win over the
/// container they sit in.
pub fn render_order(snapshot: &Snapshot) -> Vec<ElementId> {
    let mut order: Vec<(usize, usize, ElementId)> = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(index, n)| (depth(snapshot, n.id), index, n.id))
        .collect();
    order.sort_by_key(|&(d, index, _)| (d, index));
    order.into_iter().map(|(_, _, id)| id).collect()
}
