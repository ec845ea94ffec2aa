//! Text editing sessions.

use crate::canvas::Canvas;
use crate::input::Modifiers;
use crate::shapes::{ElementDraft, ElementId, ElementKind, ElementPatch, TextData};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Keys a text session reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKey {
    Char(char),
    Enter,
    Escape,
    Backspace,
}

/// Editing lifecycle of a single text element.
///
/// Every keystroke is a committing update. Enter finishes the session and
/// Escape discards it; an empty text never survives the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextSession {
    #[default]
    Idle,
    Editing {
        id: ElementId,
        /// Whether a keystroke has produced a history entry yet.
        committed: bool,
        /// Text before the session, for sessions on existing elements.
        original: Option<String>,
    },
}

impl TextSession {
    pub fn is_editing(&self) -> bool {
        matches!(self, TextSession::Editing { .. })
    }

    pub fn editing_id(&self) -> Option<ElementId> {
        match self {
            TextSession::Editing { id, .. } => Some(*id),
            TextSession::Idle => None,
        }
    }

    /// Create an empty text element at `point` and start editing it.
    pub fn begin(&mut self, canvas: &mut Canvas, point: Point) -> ElementId {
        self.finish(canvas);
        let data = TextData::new("", canvas.tool_options.font);
        let el = canvas.add_element_silent(ElementDraft::new(ElementKind::Text(data), point.x, point.y, 0.0, 0.0));
        canvas.select_elements(&[el.id()]);
        log::debug!("Text session on new element {}", el.id());
        *self = TextSession::Editing {
            id: el.id(),
            committed: false,
            original: None,
        };
        el.id()
    }

    /// Start editing an existing text element.
    pub fn edit_existing(&mut self, canvas: &mut Canvas, id: ElementId) -> bool {
        let Some(original) = canvas.get_element(id).and_then(|e| e.text()).map(|t| t.text.clone()) else {
            return false;
        };
        self.finish(canvas);
        canvas.select_elements(&[id]);
        log::debug!("Text session on existing element {}", id);
        *self = TextSession::Editing {
            id,
            committed: false,
            original: Some(original),
        };
        true
    }

    /// Drop a session whose element no longer exists as text, as after an
    /// undo past its creation. Returns whether the session was released.
    pub fn release_if_missing(&mut self, canvas: &Canvas) -> bool {
        let Some(id) = self.editing_id() else {
            return false;
        };
        if canvas.get_element(id).is_some_and(|e| e.text().is_some()) {
            return false;
        }
        log::debug!("Text element {} is gone, ending session", id);
        *self = TextSession::Idle;
        true
    }

    fn current_text(&self, canvas: &Canvas) -> Option<String> {
        let id = self.editing_id()?;
        canvas.get_element(id)?.text().map(|t| t.text.clone())
    }

    /// Replace the whole text content.
    pub fn set_text(&mut self, canvas: &mut Canvas, text: &str) -> bool {
        let Some(id) = self.editing_id() else {
            return false;
        };
        if canvas.update_element(id, &ElementPatch::new().text(text)).is_none() {
            *self = TextSession::Idle;
            return false;
        }
        if let TextSession::Editing { committed, .. } = self {
            *committed = true;
        }
        true
    }

    pub fn insert(&mut self, canvas: &mut Canvas, input: &str) -> bool {
        match self.current_text(canvas) {
            Some(mut text) => {
                text.push_str(input);
                self.set_text(canvas, &text)
            }
            None => {
                self.release_if_missing(canvas);
                false
            }
        }
    }

    pub fn backspace(&mut self, canvas: &mut Canvas) -> bool {
        match self.current_text(canvas) {
            Some(mut text) if !text.is_empty() => {
                text.pop();
                self.set_text(canvas, &text)
            }
            Some(_) => false,
            None => {
                self.release_if_missing(canvas);
                false
            }
        }
    }

    /// Route a key into the session. Returns whether the key was consumed.
    pub fn handle_key(&mut self, canvas: &mut Canvas, key: &TextKey, modifiers: Modifiers) -> bool {
        if !self.is_editing() || self.release_if_missing(canvas) {
            return false;
        }
        match key {
            TextKey::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert(canvas, c.encode_utf8(&mut buf));
            }
            TextKey::Enter if modifiers.shift => {
                self.insert(canvas, "\n");
            }
            TextKey::Enter => self.finish(canvas),
            TextKey::Escape => self.cancel(canvas),
            TextKey::Backspace => {
                self.backspace(canvas);
            }
        }
        true
    }

    /// Leave the session, keeping the text; blank text removes the element.
    pub fn finish(&mut self, canvas: &mut Canvas) {
        let TextSession::Editing { id, committed, .. } = std::mem::take(self) else {
            return;
        };
        let blank = canvas
            .get_element(id)
            .and_then(|e| e.text())
            .is_none_or(TextData::is_blank);
        if blank {
            log::debug!("Removing empty text element {}", id);
            if committed {
                canvas.delete_element(id);
            } else {
                canvas.delete_element_silent(id);
            }
        }
    }

    /// Leave the session, discarding the edits.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        let TextSession::Editing { id, committed, original } = std::mem::take(self) else {
            return;
        };
        match original {
            Some(text) => {
                if committed {
                    canvas.update_element(id, &ElementPatch::new().text(text));
                }
            }
            None if committed => {
                canvas.delete_element(id);
            }
            None => {
                canvas.delete_element_silent(id);
            }
        }
    }
}
