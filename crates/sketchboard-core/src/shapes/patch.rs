//! Partial element records: drafts for creation, patches for updates.

use super::style::generate_seed;
use super::{ArrowHead, Element, ElementKind, ElementStyle, FontOptions, GroupId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// The caller-supplied part of a new element.
///
/// The store assigns the identifier and fills the style from the tool
/// options when `style` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDraft {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub style: Option<ElementStyle>,
}

impl ElementDraft {
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
            angle: 0.0,
            style: None,
        }
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Build the element, taking `default_style` with a fresh seed when the
    /// draft has none.
    pub(crate) fn into_element(self, default_style: &ElementStyle) -> Element {
        let style = self.style.unwrap_or_else(|| ElementStyle {
            seed: generate_seed(),
            ..default_style.clone()
        });
        let mut element = Element::new(self.kind, self.x, self.y, self.width, self.height, style);
        element.angle = self.angle;
        element
    }
}

/// A shallow-merge update. Every `Some` field replaces the element's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub angle: Option<f64>,
    pub style: Option<ElementStyle>,
    pub points: Option<Vec<Point>>,
    pub text: Option<String>,
    pub font: Option<FontOptions>,
    pub start_head: Option<ArrowHead>,
    pub end_head: Option<ArrowHead>,
    pub locked: Option<bool>,
    pub group_id: Option<Option<GroupId>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Merge into `element`. Fields that do not apply to its kind are ignored.
    pub fn apply(&self, element: &mut Element) {
        if element.kind.points().is_some() && self.points.is_none() {
            self.apply_to_points(element);
        } else {
            if let Some(x) = self.x {
                element.x = x;
            }
            if let Some(y) = self.y {
                element.y = y;
            }
            if let Some(width) = self.width {
                element.width = width;
            }
            if let Some(height) = self.height {
                element.height = height;
            }
        }
        if let Some(angle) = self.angle {
            element.angle = angle;
        }
        if let Some(style) = &self.style {
            element.style = style.clone();
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        if let Some(group_id) = self.group_id {
            element.group_id = group_id;
        }

        let mut content_changed = false;
        if let (Some(new_points), Some(points)) = (&self.points, element.kind.points_mut()) {
            *points = new_points.clone();
            content_changed = true;
        }
        if let ElementKind::Arrow { start_head, end_head, .. } = &mut element.kind {
            if let Some(head) = self.start_head {
                *start_head = head;
            }
            if let Some(head) = self.end_head {
                *end_head = head;
            }
        }
        if let Some(data) = element.text_mut() {
            if let Some(text) = &self.text {
                data.text = text.clone();
                content_changed = true;
            }
            if let Some(font) = self.font {
                data.font = font;
                content_changed = true;
            }
        }
        if content_changed {
            element.refresh_derived_bounds();
        }
    }

    /// Position and size of a point-based element live in its points, so
    /// move or scale them instead of overwriting the derived box.
    fn apply_to_points(&self, element: &mut Element) {
        let x = self.x.unwrap_or(element.x);
        let y = self.y.unwrap_or(element.y);
        if self.width.is_some() || self.height.is_some() {
            let width = self.width.unwrap_or(element.width);
            let height = self.height.unwrap_or(element.height);
            element.fit_to_rect(Rect::new(x, y, x + width, y + height));
        } else if self.x.is_some() || self.y.is_some() {
            element.translate(Vec2::new(x - element.x, y - element.y));
        }
    }
}
