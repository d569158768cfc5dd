//! The active pointer interaction.
//!
//! One tagged value owned by the engine, so holding a drag while a resize
//! is active is unrepresentable. Variants carry everything the engine
//! needs to keep applying the interaction and to resolve or abort it.

use fc_core::{ElementId, Point};

/// A node's frozen position at drag start. The whole subtree translates
/// rigidly from these, never from live positions, so overshooting and
/// coming back lands exactly where it started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBaseline {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Moving the selected node. `baselines[0]` is the dragged node
    /// itself, the rest its descendants.
    Dragging {
        node: ElementId,
        start_world: Point,
        baselines: Vec<DragBaseline>,
        /// Container currently highlighted as the pending drop target.
        drop_target: Option<ElementId>,
    },
    /// Resizing the selected container from its bottom-right handle.
    Resizing {
        node: ElementId,
        start_world: Point,
        start_width: f32,
        start_height: f32,
    },
    /// Drawing a connection from `source`'s right-center anchor toward
    /// the pointer.
    Connecting {
        source: ElementId,
        cursor_world: Point,
    },
    /// Dragging empty canvas to pan. `moved` suppresses the
    /// click-deselect that would otherwise fire on release.
    Panning {
        start_screen: Point,
        start_pan: Point,
        moved: bool,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}
