//! JSON input scripts replayed against a headless canvas.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use sketchboard_core::{
    ActionParseError, Canvas, ConfigError, Coordinator, EditorConfig, Element, Modifiers,
    PointerEvent,
};
use std::path::Path;
use thiserror::Error;

/// Spacing given to pointer-downs without a timestamp, well past the
/// double-click window.
const CLICK_SPACING_MS: u64 = 1000;

/// Errors that can occur while loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Event {index}: {source}")]
    Action {
        index: usize,
        #[source]
        source: ActionParseError,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Usage: {0}")]
    Usage(String),
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptEvent {
    Pointer(PointerEvent),
    Modifiers(Modifiers),
    Action {
        name: String,
    },
    Key {
        key: String,
        /// Held only for this key press.
        #[serde(default)]
        modifiers: Option<Modifiers>,
    },
    #[serde(rename = "keyup")]
    KeyUp {
        key: String,
    },
    Text {
        text: String,
    },
    Resize {
        width: f64,
        height: f64,
    },
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptEvent>, ScriptError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let events = parse_script(&json)?;
    log::info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Drives a canvas and coordinator from script events.
pub struct ScriptRunner {
    canvas: Canvas,
    coordinator: Coordinator,
    clock: u64,
}

impl ScriptRunner {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            canvas: Canvas::with_config(config),
            coordinator: Coordinator::new(),
            clock: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn run(&mut self, events: &[ScriptEvent]) -> Result<(), ScriptError> {
        for (index, event) in events.iter().enumerate() {
            self.apply(index, event)?;
        }
        log::info!(
            "Script finished: {} elements, {} selected",
            self.canvas.len(),
            self.canvas.selected_ids().len()
        );
        Ok(())
    }

    fn apply(&mut self, index: usize, event: &ScriptEvent) -> Result<(), ScriptError> {
        log::trace!("Event {}: {:?}", index, event);
        match event {
            ScriptEvent::Pointer(pointer) => {
                let pointer = self.stamp(*pointer);
                self.coordinator.handle_pointer(&mut self.canvas, pointer);
            }
            ScriptEvent::Modifiers(modifiers) => self.coordinator.set_modifiers(*modifiers),
            ScriptEvent::Action { name } => {
                self.coordinator
                    .queue_mut()
                    .push_named(name)
                    .map_err(|source| ScriptError::Action { index, source })?;
                self.coordinator.process_queue(&mut self.canvas);
            }
            ScriptEvent::Key { key, modifiers } => {
                let held = self.coordinator.input().modifiers;
                if let Some(modifiers) = modifiers {
                    self.coordinator.set_modifiers(*modifiers);
                }
                self.coordinator.key_down(&mut self.canvas, key);
                self.coordinator.set_modifiers(held);
            }
            ScriptEvent::KeyUp { key } => self.coordinator.key_up(key),
            ScriptEvent::Text { text } => {
                if !self.coordinator.type_text(&mut self.canvas, text) {
                    log::warn!("Event {}: no text session to type into", index);
                }
            }
            ScriptEvent::Resize { width, height } => {
                self.coordinator.resize(&mut self.canvas, *width, *height);
            }
        }
        Ok(())
    }

    /// Give untimed pointer-downs increasing timestamps.
    fn stamp(&mut self, event: PointerEvent) -> PointerEvent {
        match event {
            PointerEvent::Down { position, button, time_ms } => {
                self.clock = if time_ms == 0 {
                    self.clock + CLICK_SPACING_MS
                } else {
                    time_ms
                };
                PointerEvent::Down {
                    position,
                    button,
                    time_ms: self.clock,
                }
            }
            other => other,
        }
    }

    pub fn elements(&self) -> &[Element] {
        self.canvas.elements()
    }

    pub fn elements_json(&self) -> Result<String, ScriptError> {
        Ok(serde_json::to_string_pretty(self.canvas.elements())?)
    }

    /// Visible world rectangle, for logging.
    pub fn visible_world(&self) -> Rect {
        self.canvas.viewport.visible_world_rect()
    }
}
