//! Drawing tools and the pointer-driven shape creation state machine.

mod text;

pub use text::{TextKey, TextSession};

use crate::canvas::Canvas;
use crate::input::Modifiers;
use crate::shapes::{
    Element, ElementDraft, ElementId, ElementKind, ElementPatch, ElementStyle, FontOptions,
};
use crate::snap::{constrain_square, snap_line_endpoint, SnapOperation};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Pen,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Pen,
        ToolKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Pen => "pen",
            ToolKind::Text => "text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Tools that create an element by dragging.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Line | ToolKind::Arrow | ToolKind::Pen
        )
    }
}

/// Style and font applied to newly created elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    pub style: ElementStyle,
    pub font: FontOptions,
}

/// State of a drawing interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// Dragging out a rectangle, circle, line or arrow.
    Drawing {
        id: ElementId,
        tool: ToolKind,
        anchor: Point,
    },
    /// Collecting freehand points.
    Freehand { id: ElementId },
}

/// Turns pointer events into live elements on the canvas.
///
/// The live element is added and updated silently; pointer-up either commits
/// it (one history entry for the whole drag) or removes it when it is too
/// small to keep.
#[derive(Debug, Clone, Default)]
pub struct ToolMachine {
    state: ToolState,
}

impl ToolMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != ToolState::Idle
    }

    /// Id of the live element, if any.
    pub fn live_element(&self) -> Option<ElementId> {
        match self.state {
            ToolState::Idle => None,
            ToolState::Drawing { id, .. } | ToolState::Freehand { id } => Some(id),
        }
    }

    /// Start a drawing gesture at `point` (world coordinates).
    pub fn pointer_down(&mut self, canvas: &mut Canvas, tool: ToolKind, point: Point) -> bool {
        if self.is_active() {
            self.cancel(canvas);
        }

        let state = match tool {
            ToolKind::Rectangle | ToolKind::Circle => {
                let anchor = canvas.snap(point, SnapOperation::Drawing, &[]);
                let kind = if tool == ToolKind::Rectangle {
                    ElementKind::Rectangle
                } else {
                    ElementKind::Circle
                };
                let el = canvas.add_element_silent(ElementDraft::new(kind, anchor.x, anchor.y, 1.0, 1.0));
                ToolState::Drawing { id: el.id(), tool, anchor }
            }
            ToolKind::Line | ToolKind::Arrow => {
                let anchor = canvas.snap(point, SnapOperation::Drawing, &[]);
                let kind = if tool == ToolKind::Line {
                    ElementKind::Line { points: vec![anchor, anchor] }
                } else {
                    ElementKind::arrow(anchor, anchor)
                };
                let el = canvas.add_element_silent(ElementDraft::new(kind, anchor.x, anchor.y, 0.0, 0.0));
                ToolState::Drawing { id: el.id(), tool, anchor }
            }
            ToolKind::Pen => {
                let kind = ElementKind::Pen { points: vec![point] };
                let el = canvas.add_element_silent(ElementDraft::new(kind, point.x, point.y, 0.0, 0.0));
                ToolState::Freehand { id: el.id() }
            }
            ToolKind::Select | ToolKind::Pan | ToolKind::Text => return false,
        };

        log::debug!("Begin drawing with {:?}", tool);
        self.state = state;
        true
    }

    /// Update the live element to follow the pointer.
    pub fn pointer_move(&mut self, canvas: &mut Canvas, point: Point, modifiers: Modifiers) {
        match self.state {
            ToolState::Idle => {}
            ToolState::Drawing { id, tool, anchor } => {
                let current = canvas.snap(point, SnapOperation::Drawing, &[id]);
                let patch = match tool {
                    ToolKind::Line | ToolKind::Arrow => {
                        let end = if modifiers.shift {
                            snap_line_endpoint(anchor, current)
                        } else {
                            current
                        };
                        ElementPatch::new().points(vec![anchor, end])
                    }
                    _ => {
                        let end = if modifiers.shift {
                            constrain_square(anchor, current)
                        } else {
                            current
                        };
                        ElementPatch::new()
                            .position(anchor.x, anchor.y)
                            .size(end.x - anchor.x, end.y - anchor.y)
                    }
                };
                canvas.update_element_silent(id, &patch);
            }
            ToolState::Freehand { id } => {
                canvas.modify_silent(id, |element| {
                    if let Some(points) = element.kind.points_mut() {
                        points.push(point);
                    }
                    element.refresh_derived_bounds();
                });
            }
        }
    }

    /// Finish the gesture. Returns the committed element, or `None` when the
    /// live element was discarded.
    pub fn pointer_up(
        &mut self,
        canvas: &mut Canvas,
        point: Point,
        modifiers: Modifiers,
    ) -> Option<ElementId> {
        if let ToolState::Drawing { .. } = self.state {
            self.pointer_move(canvas, point, modifiers);
        }
        let state = std::mem::take(&mut self.state);

        let id = match state {
            ToolState::Idle => return None,
            ToolState::Drawing { id, .. } | ToolState::Freehand { id } => id,
        };

        let keep = canvas
            .get_element(id)
            .is_some_and(|element| Self::meets_minimum(canvas, element));
        if !keep {
            log::debug!("Discarding undersized element {}", id);
            canvas.delete_element_silent(id);
            return None;
        }

        canvas.modify_silent(id, |element| element.normalize());
        canvas.commit();
        canvas.select_elements(&[id]);
        Some(id)
    }

    fn meets_minimum(canvas: &Canvas, element: &Element) -> bool {
        let config = canvas.config();
        match &element.kind {
            ElementKind::Rectangle | ElementKind::Circle => {
                element.width.abs() >= config.min_shape_size
                    && element.height.abs() >= config.min_shape_size
            }
            ElementKind::Line { .. } | ElementKind::Arrow { .. } => element
                .span_length()
                .is_some_and(|length| length >= config.min_line_length),
            ElementKind::Pen { .. } => element.width > 0.0 || element.height > 0.0,
            ElementKind::Text(_) => true,
        }
    }

    /// Abort the gesture, removing the live element without a history entry.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        if let Some(id) = self.live_element() {
            log::debug!("Cancel drawing {}", id);
            canvas.delete_element_silent(id);
        }
        self.state = ToolState::Idle;
    }
}
