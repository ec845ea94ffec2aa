//! Element definitions for the drawing surface.

mod patch;
mod style;
mod text;

pub use patch::{ElementDraft, ElementPatch};
pub use style::{
    CornerStyle, ElementStyle, FillStyle, SerializableColor, Sloppiness, StrokeStyle,
};
pub use text::{FontFamily, FontOptions, FontStyle, FontWeight, TextAlign, TextData};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Identifier shared by the members of a group.
pub type GroupId = Uuid;

/// Discriminant of an element, without its type-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Rectangle,
    Circle,
    Line,
    Arrow,
    Pen,
    Text,
}

/// Arrowhead decoration at either end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowHead {
    #[default]
    None,
    Triangle,
    Bar,
    Dot,
}

/// Type-specific element data.
///
/// Line, arrow and pen points are absolute world coordinates kept in draw
/// order, so an arrow still points from anchor to release after its bounding
/// box has been normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Line {
        points: Vec<Point>,
    },
    Arrow {
        points: Vec<Point>,
        start_head: ArrowHead,
        end_head: ArrowHead,
    },
    Pen {
        points: Vec<Point>,
    },
    Text(TextData),
}

impl ElementKind {
    /// An arrow between two points with the default heads.
    pub fn arrow(start: Point, end: Point) -> Self {
        ElementKind::Arrow {
            points: vec![start, end],
            start_head: ArrowHead::None,
            end_head: ArrowHead::Triangle,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Rectangle => ElementType::Rectangle,
            ElementKind::Circle => ElementType::Circle,
            ElementKind::Line { .. } => ElementType::Line,
            ElementKind::Arrow { .. } => ElementType::Arrow,
            ElementKind::Pen { .. } => ElementType::Pen,
            ElementKind::Text(_) => ElementType::Text,
        }
    }

    /// Get the point list for point-based kinds.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            ElementKind::Line { points }
            | ElementKind::Arrow { points, .. }
            | ElementKind::Pen { points } => Some(points),
            _ => None,
        }
    }

    /// Get the mutable point list for point-based kinds.
    pub fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match self {
            ElementKind::Line { points }
            | ElementKind::Arrow { points, .. }
            | ElementKind::Pen { points } => Some(points),
            _ => None,
        }
    }
}

/// A drawn element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the bounding-box center.
    #[serde(default)]
    pub angle: f64,
    pub style: ElementStyle,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Element {
    /// Create an element with a fresh identifier.
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64, style: ElementStyle) -> Self {
        let mut element = Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            angle: 0.0,
            style,
            locked: false,
            group_id: None,
        };
        element.refresh_derived_bounds();
        element
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Give the element a new identifier (used by duplicate and paste).
    pub(crate) fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Axis-aligned bounds ignoring rotation, normalized even mid-drag.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Corners after rotation, in order top-left, top-right, bottom-right, bottom-left.
    pub fn rotated_corners(&self) -> [Point; 4] {
        let b = self.bounds();
        let c = b.center();
        [
            Point::new(b.x0, b.y0),
            Point::new(b.x1, b.y0),
            Point::new(b.x1, b.y1),
            Point::new(b.x0, b.y1),
        ]
        .map(|p| rotate_point(p, c, self.angle))
    }

    /// Axis-aligned bounds of the rotated element.
    pub fn rotated_bounds(&self) -> Rect {
        if self.angle == 0.0 {
            return self.bounds();
        }
        let corners = self.rotated_corners();
        corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |r, p| r.union_pt(*p))
    }

    /// Check if a world point falls within the rotated bounding geometry.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = rotate_point(point, self.center(), -self.angle);
        contains_inclusive(self.bounds().inflate(tolerance, tolerance), local)
    }

    /// Check if the rotated bounds overlap `rect` (touching edges count).
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        rects_overlap(self.rotated_bounds(), rect)
    }

    /// Move the element by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let Some(points) = self.kind.points_mut() {
            for p in points.iter_mut() {
                *p += delta;
            }
        }
    }

    /// Flip negative width/height into positive extents.
    pub fn normalize(&mut self) {
        if self.width < 0.0 {
            self.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.y += self.height;
            self.height = -self.height;
        }
    }

    /// Place the element into `target`, scaling point data proportionally.
    pub fn fit_to_rect(&mut self, target: Rect) {
        let target = target.abs();
        let old = self.bounds();
        if let Some(points) = self.kind.points_mut() {
            let sx = if old.width() > f64::EPSILON { target.width() / old.width() } else { 1.0 };
            let sy = if old.height() > f64::EPSILON { target.height() / old.height() } else { 1.0 };
            for p in points.iter_mut() {
                *p = Point::new(
                    target.x0 + (p.x - old.x0) * sx,
                    target.y0 + (p.y - old.y0) * sy,
                );
            }
        }
        self.x = target.x0;
        self.y = target.y0;
        self.width = target.width();
        self.height = target.height();
    }

    /// Recompute x/y/width/height for kinds whose box derives from content.
    pub fn refresh_derived_bounds(&mut self) {
        match &self.kind {
            ElementKind::Line { points }
            | ElementKind::Arrow { points, .. }
            | ElementKind::Pen { points } => {
                if let Some(rect) = points_bounds(points) {
                    self.x = rect.x0;
                    self.y = rect.y0;
                    self.width = rect.width();
                    self.height = rect.height();
                }
            }
            ElementKind::Text(data) => {
                self.width = data.approximate_width();
                self.height = data.approximate_height();
            }
            ElementKind::Rectangle | ElementKind::Circle => {}
        }
    }

    /// Length between first and last point for lines and arrows.
    pub fn span_length(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Line { points } | ElementKind::Arrow { points, .. } => {
                let (first, last) = (points.first()?, points.last()?);
                Some(first.distance(*last))
            }
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.kind {
            ElementKind::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.kind {
            ElementKind::Text(data) => Some(data),
            _ => None,
        }
    }
}

/// Rotate `point` around `center` by `angle` radians.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Bounding box of a point list.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points[1..]
            .iter()
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
    )
}

/// Rect containment including the right and bottom edges.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Overlap test where touching edges count, so zero-height boxes can intersect.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Union of the rotated bounds of several elements.
pub fn union_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .map(Element::rotated_bounds)
        .reduce(|acc, r| acc.union(r))
}
