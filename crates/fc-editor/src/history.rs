//! Linear undo/redo over whole snapshots.
//!
//! `past` and `future` hold full snapshot values, not deltas. A commit
//! whose result equals the present is absorbed — repeated no-op writes
//! must not grow the past or wipe the future. Pointer gestures edit the
//! present live between `begin_gesture` and `end_gesture` so one drag is
//! at most one undo step.

use fc_core::Snapshot;

/// Undo depth before the oldest entries fall off.
pub const DEFAULT_MAX_DEPTH: usize = 100;

pub struct HistoryStore {
    past: Vec<Snapshot>,
    present: Snapshot,
    future: Vec<Snapshot>,
    max_depth: usize,
    /// Baseline captured at gesture start, pending end or cancel.
    gesture_baseline: Option<Snapshot>,
}

impl HistoryStore {
    pub fn new(present: Snapshot) -> Self {
        Self::with_max_depth(present, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(present: Snapshot, max_depth: usize) -> Self {
        HistoryStore {
            past: Vec::new(),
            present,
            future: Vec::new(),
            max_depth,
            gesture_baseline: None,
        }
    }

    pub fn present(&self) -> &Snapshot {
        &self.present
    }

    /// Direct mutable access for live gesture updates. Anything that
    /// should land in history goes through [`commit`](Self::commit) or a
    /// gesture instead.
    pub fn present_mut(&mut self) -> &mut Snapshot {
        &mut self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Apply `updater` to a copy of the present. If the result differs
    /// structurally the old present moves into the past and the future is
    /// cleared; otherwise nothing happens at all. Returns whether an undo
    /// entry was recorded.
    pub fn commit(&mut self, updater: impl FnOnce(&mut Snapshot)) -> bool {
        let mut next = self.present.clone();
        updater(&mut next);
        if next == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        self.push_past(previous);
        self.future.clear();
        true
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        if self.past.len() > self.max_depth {
            self.past.remove(0);
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.present, previous);
                self.future.push(current);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.future.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.present, next);
                self.past.push(current);
                true
            }
            None => false,
        }
    }

    /// Replace the present and drop both stacks. Loading a version or an
    /// import is not itself undoable.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.past.clear();
        self.future.clear();
        self.present = snapshot;
        self.gesture_baseline = None;
    }

    // ─── Gestures ───────────────────────────────────────────────────────

    /// Capture the baseline for a live-editing gesture. A second call
    /// before the gesture resolves keeps the first baseline.
    pub fn begin_gesture(&mut self) {
        if self.gesture_baseline.is_none() {
            self.gesture_baseline = Some(self.present.clone());
        }
    }

    /// Close the gesture: push the baseline as one undo entry if anything
    /// actually changed. Returns whether an entry was recorded.
    pub fn end_gesture(&mut self) -> bool {
        match self.gesture_baseline.take() {
            Some(baseline) if baseline != self.present => {
                self.push_past(baseline);
                self.future.clear();
                true
            }
            _ => false,
        }
    }

    /// Abort the gesture: restore the baseline verbatim, record nothing.
    pub fn cancel_gesture(&mut self) {
        if let Some(baseline) = self.gesture_baseline.take() {
            self.present = baseline;
        }
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture_baseline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{ElementId, Node, NodeType};
    use pretty_assertions::assert_eq;

    fn node(name: &str, x: f32) -> Node {
        Node::new(ElementId::intern(name), NodeType::Action, x, 0.0)
    }

    fn store() -> HistoryStore {
        HistoryStore::new(Snapshot::default())
    }

    #[test]
    fn commit_undo_redo_roundtrip() {
        let mut history = store();
        let empty = history.present().clone();

        assert!(history.commit(|s| s.nodes.push(node("a", 0.0))));
        assert!(history.commit(|s| s.nodes.push(node("b", 50.0))));
        let full = history.present().clone();

        assert!(history.undo());
        assert_eq!(history.present().nodes.len(), 1);
        assert!(history.undo());
        assert_eq!(history.present(), &empty);
        assert!(!history.undo());

        assert!(history.redo());
        assert!(history.redo());
        assert_eq!(history.present(), &full);
        assert!(!history.redo());
    }

    #[test]
    fn noop_commit_records_nothing() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));
        assert!(history.undo());
        assert!(history.can_redo());

        // Writing the identical state back must not grow the past or
        // clear the future.
        assert!(!history.commit(|_| {}));
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn new_commit_clears_redo() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));
        history.undo();
        assert!(history.can_redo());

        history.commit(|s| s.nodes.push(node("b", 10.0)));
        assert!(!history.can_redo());
    }

    #[test]
    fn max_depth_drops_oldest_entry() {
        let mut history = HistoryStore::with_max_depth(Snapshot::default(), 3);
        for i in 0..5 {
            history.commit(|s| s.nodes.push(node(&format!("n{i}"), i as f32)));
        }
        let mut undos = 0;
        while history.undo() {
            undos += 1;
        }
        assert_eq!(undos, 3);
        // The oldest reachable state already contains the first two nodes.
        assert_eq!(history.present().nodes.len(), 2);
    }

    #[test]
    fn gesture_is_one_undo_step() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));

        history.begin_gesture();
        for step in 1..=10 {
            if let Some(n) = history.present_mut().node_mut(ElementId::intern("a")) {
                n.x = step as f32 * 5.0;
            }
        }
        assert!(history.end_gesture());

        assert!(history.undo());
        assert_eq!(history.present().nodes[0].x, 0.0);
        assert!(history.redo());
        assert_eq!(history.present().nodes[0].x, 50.0);
    }

    #[test]
    fn cancelled_gesture_restores_baseline_and_records_nothing() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));

        history.begin_gesture();
        if let Some(n) = history.present_mut().node_mut(ElementId::intern("a")) {
            n.x = 400.0;
        }
        history.cancel_gesture();

        assert_eq!(history.present().nodes[0].x, 0.0);
        assert!(history.undo());
        assert!(history.present().nodes.is_empty(), "only the commit may undo");
    }

    #[test]
    fn unmoved_gesture_records_nothing() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));
        history.begin_gesture();
        assert!(!history.end_gesture());
        assert!(history.can_undo());
        history.undo();
        assert!(!history.can_undo());
    }

    #[test]
    fn reset_drops_both_stacks() {
        let mut history = store();
        history.commit(|s| s.nodes.push(node("a", 0.0)));
        history.undo();
        assert!(history.can_redo());

        let mut loaded = Snapshot::default();
        loaded.nodes.push(node("fresh", 5.0));
        history.reset(loaded.clone());

        assert_eq!(history.present(), &loaded);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
