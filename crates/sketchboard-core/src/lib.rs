//! Sketchboard Core Library
//!
//! Interaction and state engine for a vector drawing surface: the element
//! store with snapshot history, selection gestures, drawing tools, grid and
//! magnetic snapping, and the coordinator that routes input between them.

pub mod actions;
pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod input;
pub mod interaction;
pub mod keymap;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod tools;
pub mod viewport;

pub use actions::{Action, ActionParseError, ActionQueue};
pub use canvas::{Alignment, Canvas, Mutation};
pub use clipboard::{ClipboardError, ClipboardPayload};
pub use config::{ConfigError, EditorConfig};
pub use history::HistoryManager;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Coordinator, Gesture};
pub use keymap::{Keymap, Shortcut};
pub use selection::{Handle, HandleKind, SelectionRect};
pub use shapes::{Element, ElementDraft, ElementId, ElementKind, ElementPatch, ElementType};
pub use snap::{
    snap_point, snap_to_grid, GridConfig, SnapContext, SnapOperation, GRID_SIZE,
    MIN_GRID_SIZE,
};
pub use tools::{TextKey, TextSession, ToolKind, ToolMachine, ToolOptions};
pub use viewport::Viewport;
