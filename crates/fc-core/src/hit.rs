//! Hit testing: world-space pointer position → element lookup.
//!
//! Every walk goes through the render order in reverse so the topmost
//! element wins. Handle sizes are fixed on screen and divided by zoom
//! before comparing in world space.

use crate::geometry::{Camera, Point};
use crate::hierarchy::{descendants, render_order};
use crate::id::ElementId;
use crate::model::{Node, Snapshot};
use std::collections::HashSet;

/// Screen-pixel side of the square resize affordance at a container's
/// bottom-right corner.
pub const RESIZE_HANDLE_PX: f32 = 12.0;
/// Screen-pixel radius of the circular connection anchor at a connectable
/// node's right-center.
pub const CONNECT_HANDLE_PX: f32 = 8.0;

/// Topmost node whose bounds contain the world point.
pub fn node_at_point(snapshot: &Snapshot, world_pt: Point) -> Option<ElementId> {
    for id in render_order(snapshot).iter().rev() {
        if let Some(node) = snapshot.node(*id)
            && node.bounds().contains(world_pt.x, world_pt.y)
        {
            return Some(*id);
        }
    }
    None
}

/// Topmost unlocked container whose bounds contain the world point,
/// skipping everything in `exclude`. Drop-target resolution for drags.
pub fn drop_target_at(
    snapshot: &Snapshot,
    world_pt: Point,
    exclude: &HashSet<ElementId>,
) -> Option<ElementId> {
    for id in render_order(snapshot).iter().rev() {
        if exclude.contains(id) {
            continue;
        }
        if let Some(node) = snapshot.node(*id)
            && node.node_type.is_container()
            && !node.locked
            && node.bounds().contains(world_pt.x, world_pt.y)
        {
            return Some(*id);
        }
    }
    None
}

/// Exclusion set for dragging `id`: the node itself plus its descendants.
/// A container can never be dropped into its own subtree.
pub fn drag_exclusions(snapshot: &Snapshot, id: ElementId) -> HashSet<ElementId> {
    let mut exclude: HashSet<ElementId> = descendants(snapshot, id).into_iter().collect();
    exclude.insert(id);
    exclude
}

/// Whether the world point sits on `node`'s resize handle at the current
/// zoom. The handle is a square centered on the bottom-right corner.
pub fn resize_handle_contains(node: &Node, world_pt: Point, camera: &Camera) -> bool {
    let half = camera.screen_dist_to_world(RESIZE_HANDLE_PX) / 2.0;
    let bounds = node.bounds();
    let corner_x = bounds.x + bounds.width;
    let corner_y = bounds.y + bounds.height;
    (world_pt.x - corner_x).abs() <= half && (world_pt.y - corner_y).abs() <= half
}

/// Topmost connectable node whose right-center connection anchor contains
/// the world point.
pub fn connect_handle_at(snapshot: &Snapshot, world_pt: Point, camera: &Camera) -> Option<ElementId> {
    let radius = camera.screen_dist_to_world(CONNECT_HANDLE_PX);
    for id in render_order(snapshot).iter().rev() {
        if let Some(node) = snapshot.node(*id)
            && node.node_type.is_connectable()
        {
            let (anchor_x, anchor_y) = node.bounds().right_center();
            let dx = world_pt.x - anchor_x;
            let dy = world_pt.y - anchor_y;
            if dx * dx + dy * dy <= radius * radius {
                return Some(*id);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn place(snapshot: &mut Snapshot, name: &str, node_type: NodeType, x: f32, y: f32, w: f32, h: f32) {
        let mut node = Node::new(id(name), node_type, x, y);
        node.width = w;
        node.height = h;
        snapshot.nodes.push(node);
    }

    fn nested_scene() -> Snapshot {
        let mut snapshot = Snapshot::default();
        place(&mut snapshot, "home", NodeType::Page, 0.0, 0.0, 400.0, 300.0);
        place(&mut snapshot, "btn", NodeType::Ui, 50.0, 50.0, 100.0, 40.0);
        if let Some(n) = snapshot.node_mut(id("btn")) {
            n.parent_id = Some(id("home"));
        }
        place(&mut snapshot, "aside", NodeType::Page, 500.0, 0.0, 300.0, 300.0);
        snapshot
    }

    #[test]
    fn topmost_node_wins() {
        let snapshot = nested_scene();
        assert_eq!(node_at_point(&snapshot, Point::new(60.0, 60.0)), Some(id("btn")));
        assert_eq!(node_at_point(&snapshot, Point::new(300.0, 200.0)), Some(id("home")));
        assert_eq!(node_at_point(&snapshot, Point::new(900.0, 900.0)), None);
    }

    #[test]
    fn drop_target_skips_excluded_and_locked() {
        let mut snapshot = nested_scene();
        let pt = Point::new(100.0, 100.0);

        let mut exclude = HashSet::new();
        assert_eq!(drop_target_at(&snapshot, pt, &exclude), Some(id("home")));

        exclude.insert(id("home"));
        assert_eq!(drop_target_at(&snapshot, pt, &exclude), None);

        exclude.clear();
        if let Some(n) = snapshot.node_mut(id("home")) {
            n.locked = true;
        }
        assert_eq!(drop_target_at(&snapshot, pt, &exclude), None);
    }

    #[test]
    fn non_containers_are_never_drop_targets() {
        let snapshot = nested_scene();
        // The button is the topmost hit here, but only pages qualify.
        assert_eq!(
            drop_target_at(&snapshot, Point::new(60.0, 60.0), &HashSet::new()),
            Some(id("home"))
        );
    }

    #[test]
    fn drag_exclusions_cover_the_subtree() {
        let snapshot = nested_scene();
        let exclude = drag_exclusions(&snapshot, id("home"));
        assert!(exclude.contains(&id("home")));
        assert!(exclude.contains(&id("btn")));
        assert!(!exclude.contains(&id("aside")));
    }

    #[test]
    fn resize_handle_scales_with_zoom() {
        let node = {
            let mut n = Node::new(id("page"), NodeType::Page, 0.0, 0.0);
            n.width = 400.0;
            n.height = 300.0;
            n
        };
        let camera = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 };
        assert!(resize_handle_contains(&node, Point::new(400.0, 300.0), &camera));
        assert!(resize_handle_contains(&node, Point::new(395.0, 304.0), &camera));
        assert!(!resize_handle_contains(&node, Point::new(380.0, 300.0), &camera));

        // At 4x zoom the handle covers a quarter of the world distance.
        let zoomed = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.0 };
        assert!(!resize_handle_contains(&node, Point::new(395.0, 304.0), &zoomed));
        assert!(resize_handle_contains(&node, Point::new(399.0, 301.0), &zoomed));
    }

    #[test]
    fn connect_handle_only_on_connectable_nodes() {
        let snapshot = nested_scene();
        let camera = Camera::default();

        // Button anchor: right-center of (50, 50, 100, 40).
        assert_eq!(
            connect_handle_at(&snapshot, Point::new(150.0, 70.0), &camera),
            Some(id("btn"))
        );
        // Page right-center is not an anchor; pages carry no edges.
        assert_eq!(connect_handle_at(&snapshot, Point::new(400.0, 150.0), &camera), None);
    }
}
