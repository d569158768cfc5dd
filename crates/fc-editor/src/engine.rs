//! The canvas engine: one value owning document history, camera,
//! selection, versions, diff state, and the active interaction.
//!
//! Pointer, wheel, and key events arrive in screen coordinates and the
//! engine resolves hits itself, so the whole interaction surface runs
//! headless — the UI layer only draws what the engine says and forwards
//! events back in.

use crate::history::HistoryStore;
use crate::interaction::{DragBaseline, Interaction};
use crate::io::{self, ImportData, ImportError};
use crate::mutations;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use chrono::Utc;
use fc_core::diff::{snapshot_diff, DiffMode, SnapshotDiff};
use fc_core::geometry::{Camera, Point, Viewport, ZOOM_STEP};
use fc_core::hierarchy::descendants;
use fc_core::hit::{
    connect_handle_at, drag_exclusions, drop_target_at, node_at_point, resize_handle_contains,
};
use fc_core::{
    Edge, EdgePatch, ElementId, Node, NodePatch, NodeType, Snapshot, Version,
    MIN_CONTAINER_HEIGHT, MIN_CONTAINER_WIDTH,
};

/// The selected element, when there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected {
    Node(ElementId),
    Edge(ElementId),
}

/// Which kind of element an id refers to at the mutation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Edge,
}

pub struct CanvasEngine {
    history: HistoryStore,
    camera: Camera,
    viewport: Viewport,
    interaction: Interaction,
    selection: Option<Selected>,
    versions: Vec<Version>,
    /// Version the present snapshot is known to equal, cleared by any
    /// recorded change.
    active_version: Option<ElementId>,
    diff_mode: DiffMode,
    diff_reference: Option<Snapshot>,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(Snapshot::default(), Viewport::default())
    }
}

impl CanvasEngine {
    pub fn new(snapshot: Snapshot, viewport: Viewport) -> Self {
        CanvasEngine {
            history: HistoryStore::new(snapshot),
            camera: Camera::default(),
            viewport,
            interaction: Interaction::Idle,
            selection: None,
            versions: Vec::new(),
            active_version: None,
            diff_mode: DiffMode::Off,
            diff_reference: None,
        }
    }

    // ─── Queries ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &Snapshot {
        self.history.present()
    }

    pub fn selection(&self) -> Option<Selected> {
        self.selection
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn active_version(&self) -> Option<ElementId> {
        self.active_version
    }

    pub fn diff_mode(&self) -> DiffMode {
        self.diff_mode
    }

    /// Current diff against the chosen reference, computed fresh. `None`
    /// while diffing is off or no reference is set.
    pub fn diff(&self) -> Option<SnapshotDiff> {
        if self.diff_mode == DiffMode::Off {
            return None;
        }
        self.diff_reference
            .as_ref()
            .map(|reference| snapshot_diff(reference, self.history.present()))
    }

    /// Container currently highlighted as the pending drop target.
    pub fn drop_target(&self) -> Option<ElementId> {
        match &self.interaction {
            Interaction::Dragging { drop_target, .. } => *drop_target,
            _ => None,
        }
    }

    /// Live connection preview: source anchor → cursor, both in world
    /// coordinates.
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        if let Interaction::Connecting { source, cursor_world } = &self.interaction
            && let Some(node) = self.snapshot().node(*source)
        {
            let (ax, ay) = node.bounds().right_center();
            return Some((Point::new(ax, ay), *cursor_world));
        }
        None
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Select a node. Declines ids absent from the present snapshot —
    /// ghosts live only in the diff reference and cannot be selected.
    pub fn select_node(&mut self, id: ElementId) -> bool {
        if !self.snapshot().contains_node(id) {
            return false;
        }
        self.selection = Some(Selected::Node(id));
        true
    }

    pub fn select_edge(&mut self, id: ElementId) -> bool {
        if !self.snapshot().contains_edge(id) {
            return false;
        }
        self.selection = Some(Selected::Edge(id));
        true
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    fn revalidate_selection(&mut self) {
        let valid = match self.selection {
            Some(Selected::Node(id)) => self.snapshot().contains_node(id),
            Some(Selected::Edge(id)) => self.snapshot().contains_edge(id),
            None => true,
        };
        if !valid {
            self.selection = None;
        }
    }

    // ─── Pointer events ─────────────────────────────────────────────────

    pub fn on_pointer_down(&mut self, sx: f32, sy: f32) {
        let screen_pt = Point::new(sx, sy);
        let world_pt = self.camera.screen_to_world(screen_pt);

        // A new interaction forcibly resolves the one in flight.
        if !self.interaction.is_idle() {
            self.finish_interaction(Some(world_pt));
        }

        // Resize handle of the selected container wins over body hits.
        if let Some(Selected::Node(id)) = self.selection
            && let Some(node) = self.snapshot().node(id)
            && node.node_type.is_container()
            && !node.locked
            && resize_handle_contains(node, world_pt, &self.camera)
        {
            log::trace!("resize armed on {id}");
            let (start_width, start_height) = (node.width, node.height);
            self.history.begin_gesture();
            self.interaction =
                Interaction::Resizing { node: id, start_world: world_pt, start_width, start_height };
            return;
        }

        // Connection anchor of any connectable node.
        if let Some(source) = connect_handle_at(self.snapshot(), world_pt, &self.camera) {
            log::trace!("connecting from {source}");
            self.interaction = Interaction::Connecting { source, cursor_world: world_pt };
            return;
        }

        // Node body: first pointer-down selects, a second one on the
        // already-selected node arms the drag.
        if let Some(hit) = node_at_point(self.snapshot(), world_pt) {
            if self.selection == Some(Selected::Node(hit)) {
                self.begin_drag(hit, world_pt);
            } else {
                self.selection = Some(Selected::Node(hit));
            }
            return;
        }

        // Empty canvas: pan. Release decides whether it was just a
        // deselect click.
        self.interaction = Interaction::Panning {
            start_screen: screen_pt,
            start_pan: Point::new(self.camera.pan_x, self.camera.pan_y),
            moved: false,
        };
    }

    fn begin_drag(&mut self, id: ElementId, world_pt: Point) {
        let Some(node) = self.snapshot().node(id) else {
            return;
        };
        if node.locked {
            log::trace!("drag declined, {id} is locked");
            return;
        }
        let mut baselines = vec![DragBaseline { id, x: node.x, y: node.y }];
        for descendant in descendants(self.snapshot(), id) {
            if let Some(n) = self.snapshot().node(descendant) {
                baselines.push(DragBaseline { id: descendant, x: n.x, y: n.y });
            }
        }
        self.history.begin_gesture();
        self.interaction =
            Interaction::Dragging { node: id, start_world: world_pt, baselines, drop_target: None };
    }

    pub fn on_pointer_move(&mut self, sx: f32, sy: f32) {
        let screen_pt = Point::new(sx, sy);
        let world_pt = self.camera.screen_to_world(screen_pt);

        match self.interaction.clone() {
            Interaction::Idle => {}
            Interaction::Dragging { node, start_world, baselines, .. } => {
                let dx = world_pt.x - start_world.x;
                let dy = world_pt.y - start_world.y;
                let present = self.history.present_mut();
                for baseline in &baselines {
                    if let Some(n) = present.node_mut(baseline.id) {
                        n.x = baseline.x + dx;
                        n.y = baseline.y + dy;
                    }
                }
                let exclude = drag_exclusions(self.snapshot(), node);
                let drop_target = drop_target_at(self.snapshot(), world_pt, &exclude);
                self.interaction =
                    Interaction::Dragging { node, start_world, baselines, drop_target };
            }
            Interaction::Resizing { node, start_world, start_width, start_height } => {
                let dw = world_pt.x - start_world.x;
                let dh = world_pt.y - start_world.y;
                if let Some(n) = self.history.present_mut().node_mut(node) {
                    n.width = (start_width + dw).max(MIN_CONTAINER_WIDTH);
                    n.height = (start_height + dh).max(MIN_CONTAINER_HEIGHT);
                }
            }
            Interaction::Connecting { source, .. } => {
                self.interaction = Interaction::Connecting { source, cursor_world: world_pt };
            }
            Interaction::Panning { start_screen, start_pan, moved } => {
                let dx = screen_pt.x - start_screen.x;
                let dy = screen_pt.y - start_screen.y;
                self.camera.pan_x = start_pan.x + dx;
                self.camera.pan_y = start_pan.y + dy;
                self.interaction = Interaction::Panning {
                    start_screen,
                    start_pan,
                    moved: moved || dx != 0.0 || dy != 0.0,
                };
            }
        }
    }

    /// Global pointer-up: resolves whatever interaction is active, even
    /// when the pointer has left the canvas.
    pub fn on_pointer_up(&mut self, sx: f32, sy: f32) {
        let world_pt = self.camera.screen_to_world(Point::new(sx, sy));
        self.finish_interaction(Some(world_pt));
    }

    /// Resolve the in-flight interaction, committing its pending effect.
    /// Without a pointer position (a keyboard command or API call taking
    /// over) the last applied state stands in for it.
    fn finish_interaction(&mut self, pointer_world: Option<Point>) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => {}
            Interaction::Dragging { node, start_world, baselines, .. } => {
                let world_pt = match pointer_world {
                    Some(p) => p,
                    // Reconstruct the pointer from the applied delta.
                    None => match (baselines.first(), self.snapshot().node(node)) {
                        (Some(b), Some(n)) => {
                            Point::new(start_world.x + (n.x - b.x), start_world.y + (n.y - b.y))
                        }
                        _ => start_world,
                    },
                };
                self.commit_drop(node, world_pt);
            }
            Interaction::Resizing { .. } => {
                if self.history.end_gesture() {
                    self.active_version = None;
                }
            }
            Interaction::Connecting { source, cursor_world } => {
                let world_pt = pointer_world.unwrap_or(cursor_world);
                if let Some(target) = node_at_point(self.snapshot(), world_pt)
                    && target != source
                {
                    self.create_edge(source, target);
                }
            }
            Interaction::Panning { moved, .. } => {
                // A motionless pan was a plain click on empty canvas.
                if !moved {
                    self.deselect();
                }
            }
        }
    }

    /// Close a drag: reparent into the resolved drop target, or detach if
    /// the pointer left the old parent, then fold the whole gesture into
    /// one history entry.
    fn commit_drop(&mut self, node_id: ElementId, world_pt: Point) {
        let exclude = drag_exclusions(self.snapshot(), node_id);
        let target = drop_target_at(self.snapshot(), world_pt, &exclude);
        let old_parent_bounds = self
            .snapshot()
            .node(node_id)
            .and_then(|n| n.parent_id)
            .and_then(|pid| self.snapshot().node(pid))
            .map(|p| p.bounds());

        if let Some(node) = self.history.present_mut().node_mut(node_id) {
            match target {
                // Containers keep their root-or-not status on drop; only
                // non-containers nest.
                Some(target) if !node.node_type.is_container() => {
                    node.parent_id = Some(target);
                }
                _ => {
                    if let Some(bounds) = old_parent_bounds
                        && !bounds.contains(world_pt.x, world_pt.y)
                    {
                        node.parent_id = None;
                    }
                }
            }
        }

        if self.history.end_gesture() {
            self.active_version = None;
        }
    }

    /// Abort the active interaction without recording history. Dragged or
    /// resized nodes snap back to the gesture baseline.
    pub fn cancel_interaction(&mut self) -> bool {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => false,
            Interaction::Dragging { .. } | Interaction::Resizing { .. } => {
                self.history.cancel_gesture();
                true
            }
            Interaction::Connecting { .. } | Interaction::Panning { .. } => true,
        }
    }

    // ─── Wheel and keyboard ─────────────────────────────────────────────

    /// Wheel zoom, anchored so the world point under the cursor stays
    /// fixed on screen.
    pub fn on_wheel(&mut self, sx: f32, sy: f32, delta_y: f32) {
        let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        self.camera.zoom_at(Point::new(sx, sy), factor);
    }

    pub fn on_key_down(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) {
        match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(ShortcutAction::Undo) => {
                self.undo();
            }
            Some(ShortcutAction::Redo) => {
                self.redo();
            }
            Some(ShortcutAction::Delete) => {
                self.delete_selected();
            }
            Some(ShortcutAction::Cancel) => {
                if !self.cancel_interaction() {
                    self.deselect();
                }
            }
            None => {}
        }
    }

    fn delete_selected(&mut self) {
        match self.selection {
            Some(Selected::Node(id)) => {
                self.delete_element(id, ElementKind::Node);
            }
            Some(Selected::Edge(id)) => {
                self.delete_element(id, ElementKind::Edge);
            }
            None => {}
        }
    }

    // ─── History ────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.finish_interaction(None);
        let undone = self.history.undo();
        if undone {
            self.revalidate_selection();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.finish_interaction(None);
        let redone = self.history.redo();
        if redone {
            self.revalidate_selection();
        }
        redone
    }

    // ─── Mutation API ───────────────────────────────────────────────────

    /// Record a mutation. On change, the version marker clears — the
    /// canvas no longer equals any saved version.
    fn commit(&mut self, updater: impl FnOnce(&mut Snapshot)) -> bool {
        let changed = self.history.commit(updater);
        if changed {
            self.active_version = None;
        }
        changed
    }

    /// Add a node of `node_type` centered in the viewport. Returns its id.
    pub fn add_node(&mut self, node_type: NodeType) -> ElementId {
        self.finish_interaction(None);
        let id = self.fresh_id("node");
        let center = self.camera.screen_to_world(self.viewport.center());
        let (width, height) = node_type.default_size();
        let node = Node::new(id, node_type, center.x - width / 2.0, center.y - height / 2.0);
        self.commit(|s| {
            mutations::add_node(s, node);
        });
        id
    }

    /// Create an edge between two connectable nodes, default type and
    /// empty label. Returns the new id, or `None` when declined.
    pub fn create_edge(&mut self, source: ElementId, target: ElementId) -> Option<ElementId> {
        self.finish_interaction(None);
        let id = self.fresh_id("edge");
        let edge = Edge::new(id, source, target);
        if self.commit(|s| {
            mutations::add_edge(s, edge);
        }) {
            Some(id)
        } else {
            None
        }
    }

    pub fn update_node(&mut self, id: ElementId, patch: &NodePatch) -> bool {
        self.finish_interaction(None);
        self.commit(|s| {
            mutations::update_node(s, id, patch);
        })
    }

    pub fn update_edge(&mut self, id: ElementId, patch: &EdgePatch) -> bool {
        self.finish_interaction(None);
        self.commit(|s| {
            mutations::update_edge(s, id, patch);
        })
    }

    /// Delete an element. Node deletes cascade through the subtree and
    /// every touching edge; anything selected that goes away deselects.
    pub fn delete_element(&mut self, id: ElementId, kind: ElementKind) -> bool {
        self.finish_interaction(None);
        let changed = self.commit(|s| {
            match kind {
                ElementKind::Node => {
                    mutations::delete_node_cascade(s, id);
                }
                ElementKind::Edge => {
                    mutations::delete_edge(s, id);
                }
            };
        });
        if changed {
            self.revalidate_selection();
        }
        changed
    }

    /// Ids never collide with anything already in the present snapshot —
    /// imported documents may contain counter-shaped ids.
    fn fresh_id(&self, prefix: &str) -> ElementId {
        loop {
            let id = ElementId::with_prefix(prefix);
            if !self.snapshot().contains_node(id) && !self.snapshot().contains_edge(id) {
                return id;
            }
        }
    }

    // ─── Versions ───────────────────────────────────────────────────────

    /// Save the present snapshot as a named version. The canvas now equals
    /// the saved copy, so the marker points at it.
    pub fn save_version(&mut self, name: &str) -> ElementId {
        self.finish_interaction(None);
        let id = self.fresh_version_id();
        let version = Version {
            id,
            name: name.to_string(),
            timestamp: Utc::now(),
            snapshot: self.snapshot().clone(),
        };
        self.versions.push(version);
        self.active_version = Some(id);
        log::debug!("saved version {name:?} as {id}");
        id
    }

    /// Restore a saved version. Replaces the present snapshot and drops
    /// both history stacks; loading is not itself undoable.
    pub fn load_version(&mut self, id: ElementId) -> bool {
        self.finish_interaction(None);
        let Some(version) = self.versions.iter().find(|v| v.id == id) else {
            log::debug!("load_version: {id} does not exist");
            return false;
        };
        let snapshot = version.snapshot.clone();
        self.history.reset(snapshot);
        self.active_version = Some(id);
        self.revalidate_selection();
        true
    }

    /// Delete a saved version. The canvas keeps its content even when the
    /// deleted version was active; only the marker clears.
    pub fn delete_version(&mut self, id: ElementId) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != id);
        if self.versions.len() == before {
            return false;
        }
        if self.active_version == Some(id) {
            self.active_version = None;
        }
        true
    }

    fn fresh_version_id(&self) -> ElementId {
        loop {
            let id = ElementId::with_prefix("v");
            if !self.versions.iter().any(|v| v.id == id) {
                return id;
            }
        }
    }

    // ─── Diff controls ──────────────────────────────────────────────────

    /// Choose the version to compare the canvas against. Enables simple
    /// granularity when diffing was off.
    pub fn set_diff_reference(&mut self, version_id: ElementId) -> bool {
        let Some(version) = self.versions.iter().find(|v| v.id == version_id) else {
            return false;
        };
        self.diff_reference = Some(version.snapshot.clone());
        if self.diff_mode == DiffMode::Off {
            self.diff_mode = DiffMode::Simple;
        }
        true
    }

    /// Switch diff granularity. `Off` also clears the reference snapshot.
    pub fn set_diff_mode(&mut self, mode: DiffMode) {
        self.diff_mode = mode;
        if mode == DiffMode::Off {
            self.diff_reference = None;
        }
    }

    // ─── Import / export ────────────────────────────────────────────────

    /// Serialize the full bundle: current snapshot plus every version.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        io::export_bundle(self.snapshot(), &self.versions)
    }

    /// Replace the engine's document from exported JSON. All or nothing:
    /// a malformed file returns the error and leaves every piece of state
    /// exactly as it was.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let data = io::parse_import(text)?;
        self.finish_interaction(None);
        match data {
            ImportData::Bundle { versions } => {
                let latest = versions
                    .iter()
                    .max_by_key(|v| v.timestamp)
                    .map(|v| (v.id, v.snapshot.clone()));
                self.versions = versions;
                match latest {
                    Some((id, snapshot)) => {
                        self.history.reset(snapshot);
                        self.active_version = Some(id);
                    }
                    None => {
                        self.history.reset(Snapshot::default());
                        self.active_version = None;
                    }
                }
            }
            ImportData::Bare { snapshot } => {
                self.versions.clear();
                self.history.reset(snapshot);
                self.active_version = None;
            }
        }
        self.selection = None;
        self.diff_mode = DiffMode::Off;
        self.diff_reference = None;
        log::debug!("import replaced the document");
        Ok(())
    }
}
