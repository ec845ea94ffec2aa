//! Named editor actions and the queue that delivers them.

use crate::canvas::Alignment;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for action names that are not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// A named command issued by shortcuts, menus or scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    SetTool(ToolKind),
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    CopyStyle,
    PasteStyle,
    SelectAll,
    Duplicate,
    Delete,
    ResetZoom,
    ZoomToFit,
    ZoomIn,
    ZoomOut,
    SelectNext,
    SelectPrevious,
    ToggleMagnetic,
    ToggleGrid,
    ToggleSnapToGrid,
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
    Group,
    Ungroup,
    ToggleLock,
    Align(Alignment),
    /// Escape: abort the current gesture or clear the selection.
    Cancel,
}

const SIMPLE_ACTIONS: &[(&str, Action)] = &[
    ("undo", Action::Undo),
    ("redo", Action::Redo),
    ("copy", Action::Copy),
    ("cut", Action::Cut),
    ("paste", Action::Paste),
    ("copyStyle", Action::CopyStyle),
    ("pasteStyle", Action::PasteStyle),
    ("selectAll", Action::SelectAll),
    ("duplicate", Action::Duplicate),
    ("delete", Action::Delete),
    ("resetZoom", Action::ResetZoom),
    ("zoomToFit", Action::ZoomToFit),
    ("zoomIn", Action::ZoomIn),
    ("zoomOut", Action::ZoomOut),
    ("selectNext", Action::SelectNext),
    ("selectPrevious", Action::SelectPrevious),
    ("toggleMagnetic", Action::ToggleMagnetic),
    ("toggleGrid", Action::ToggleGrid),
    ("toggleSnapToGrid", Action::ToggleSnapToGrid),
    ("bringForward", Action::BringForward),
    ("sendBackward", Action::SendBackward),
    ("bringToFront", Action::BringToFront),
    ("sendToBack", Action::SendToBack),
    ("group", Action::Group),
    ("ungroup", Action::Ungroup),
    ("toggleLock", Action::ToggleLock),
    ("alignLeft", Action::Align(Alignment::Left)),
    ("alignCenter", Action::Align(Alignment::CenterHorizontal)),
    ("alignRight", Action::Align(Alignment::Right)),
    ("alignTop", Action::Align(Alignment::Top)),
    ("alignMiddle", Action::Align(Alignment::CenterVertical)),
    ("alignBottom", Action::Align(Alignment::Bottom)),
    ("cancel", Action::Cancel),
];

impl Action {
    /// Whether the action is still honoured while text is being edited.
    pub fn allowed_while_editing(&self) -> bool {
        matches!(self, Action::Undo | Action::Redo)
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tool) = s.strip_prefix("setTool:") {
            return ToolKind::from_name(tool)
                .map(Action::SetTool)
                .ok_or_else(|| ActionParseError::UnknownTool(tool.to_string()));
        }
        SIMPLE_ACTIONS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, action)| *action)
            .ok_or_else(|| ActionParseError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Action::SetTool(tool) = self {
            return write!(f, "setTool:{}", tool.name());
        }
        let name = SIMPLE_ACTIONS
            .iter()
            .find(|(_, action)| action == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

impl TryFrom<String> for Action {
    type Error = ActionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

/// FIFO of decoded actions waiting for the coordinator.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: VecDeque<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    /// Parse and enqueue a named action; unknown names are logged and dropped.
    pub fn push_named(&mut self, name: &str) -> Result<(), ActionParseError> {
        match name.parse() {
            Ok(action) => {
                self.push(action);
                Ok(())
            }
            Err(err) => {
                log::warn!("Ignoring action: {}", err);
                Err(err)
            }
        }
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
