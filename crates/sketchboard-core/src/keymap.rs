//! Keyboard shortcut table.

use crate::actions::Action;
use crate::canvas::Alignment;
use crate::input::Modifiers;
use crate::tools::ToolKind;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Resolves key presses to actions.
///
/// Ctrl (or Cmd) bindings shadow bare-letter tool bindings on the same key.
#[derive(Debug, Clone)]
pub struct Keymap {
    shortcuts: Vec<Shortcut>,
}

impl Default for Keymap {
    fn default() -> Self {
        use Action::*;
        Self {
            shortcuts: vec![
                Shortcut::new("A", true, false, SelectAll, "Select all elements"),
                Shortcut::new("Z", true, false, Undo, "Undo"),
                Shortcut::new("Z", true, true, Redo, "Redo"),
                Shortcut::new("Y", true, false, Redo, "Redo"),
                Shortcut::new("C", true, false, Copy, "Copy elements"),
                Shortcut::new("X", true, false, Cut, "Cut elements"),
                Shortcut::new("V", true, false, Paste, "Paste elements"),
                Shortcut::new("C", true, true, CopyStyle, "Copy style"),
                Shortcut::new("V", true, true, PasteStyle, "Paste style"),
                Shortcut::new("D", true, false, Duplicate, "Duplicate selection"),
                Shortcut::new("G", true, false, Group, "Group selected elements"),
                Shortcut::new("G", true, true, Ungroup, "Ungroup selected elements"),
                Shortcut::new("L", true, true, ToggleLock, "Lock or unlock selection"),
                Shortcut::new("]", true, false, BringForward, "Bring forward"),
                Shortcut::new("[", true, false, SendBackward, "Send backward"),
                Shortcut::new("]", true, true, BringToFront, "Bring to front"),
                Shortcut::new("[", true, true, SendToBack, "Send to back"),
                Shortcut::new("0", true, false, ResetZoom, "Reset zoom"),
                Shortcut::new("1", false, true, ZoomToFit, "Zoom to fit"),
                Shortcut::new("=", true, false, ZoomIn, "Zoom in"),
                Shortcut::new("-", true, false, ZoomOut, "Zoom out"),
                Shortcut::new("'", true, false, ToggleGrid, "Toggle grid"),
                Shortcut::new("ArrowLeft", true, true, Align(Alignment::Left), "Align left"),
                Shortcut::new("ArrowRight", true, true, Align(Alignment::Right), "Align right"),
                Shortcut::new("ArrowUp", true, true, Align(Alignment::Top), "Align top"),
                Shortcut::new("ArrowDown", true, true, Align(Alignment::Bottom), "Align bottom"),
                Shortcut::new("V", false, false, SetTool(ToolKind::Select), "Select tool"),
                Shortcut::new("H", false, false, SetTool(ToolKind::Pan), "Pan tool"),
                Shortcut::new("R", false, false, SetTool(ToolKind::Rectangle), "Rectangle tool"),
                Shortcut::new("C", false, false, SetTool(ToolKind::Circle), "Circle tool"),
                Shortcut::new("L", false, false, SetTool(ToolKind::Line), "Line tool"),
                Shortcut::new("A", false, false, SetTool(ToolKind::Arrow), "Arrow tool"),
                Shortcut::new("P", false, false, SetTool(ToolKind::Pen), "Pen tool"),
                Shortcut::new("T", false, false, SetTool(ToolKind::Text), "Text tool"),
                Shortcut::new("M", false, false, ToggleMagnetic, "Toggle magnetic snapping"),
                Shortcut::new("G", false, false, ToggleSnapToGrid, "Toggle snap to grid"),
                Shortcut::new("Tab", false, false, SelectNext, "Select next element"),
                Shortcut::new("Tab", false, true, SelectPrevious, "Select previous element"),
                Shortcut::new("ArrowRight", false, false, SelectNext, "Select next element"),
                Shortcut::new("ArrowLeft", false, false, SelectPrevious, "Select previous element"),
                Shortcut::new("Delete", false, false, Delete, "Delete selected elements"),
                Shortcut::new("Backspace", false, false, Delete, "Delete selected elements"),
                Shortcut::new("Escape", false, false, Cancel, "Cancel current action"),
            ],
        }
    }
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Add or replace a binding.
    pub fn bind(&mut self, shortcut: Shortcut) {
        self.shortcuts.retain(|s| {
            !(s.key.eq_ignore_ascii_case(shortcut.key) && s.ctrl == shortcut.ctrl && s.shift == shortcut.shift)
        });
        self.shortcuts.push(shortcut);
    }

    /// Find the action bound to `key` with the given modifiers.
    pub fn resolve(&self, key: &str, modifiers: Modifiers) -> Option<Action> {
        let ctrl = modifiers.command();
        self.shortcuts
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(key) && s.ctrl == ctrl && s.shift == modifiers.shift)
            .map(|s| s.action)
    }

    /// Log every binding at debug level.
    pub fn log_all(&self) {
        for shortcut in &self.shortcuts {
            log::debug!("{:20} {}", shortcut.format(), shortcut.description);
        }
    }
}
