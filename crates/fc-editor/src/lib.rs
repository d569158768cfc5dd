//! FlowCanvas editor: snapshot history, pointer interactions, keyboard
//! shortcuts, version management, and JSON import/export, all behind the
//! [`CanvasEngine`](engine::CanvasEngine) façade.

pub mod engine;
pub mod history;
pub mod interaction;
pub mod io;
pub mod mutations;
pub mod shortcuts;

pub use engine::{CanvasEngine, ElementKind, Selected};
pub use history::HistoryStore;
pub use interaction::{DragBaseline, Interaction};
pub use io::{ImportData, ImportError};
pub use shortcuts::{ShortcutAction, ShortcutMap};
