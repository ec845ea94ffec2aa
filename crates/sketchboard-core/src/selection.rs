//! Selection handles and the move/resize/rotate/marquee gestures.
//!
//! Every gesture keeps the original elements so it can be previewed with
//! silent mutations, committed once at the end, or rolled back.

use crate::canvas::Canvas;
use crate::shapes::{rotate_point, union_bounds, Element, ElementId};
use crate::snap::{snap_angle, SnapOperation, ANGLE_SNAP_INCREMENT};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// Distance from the top edge to the rotation handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Smallest side a resize may produce for boxed shapes. Point-based
/// elements may stay flat.
const MIN_RESIZE_SIDE: f64 = 1.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }

    /// The corner's position on `rect`.
    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
        }
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// `tolerance` is in world units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }
}

/// Rotated corner handles plus a rotation handle above the top edge.
pub fn element_handles(element: &Element, rotate_offset: f64) -> Vec<Handle> {
    let corners = element.rotated_corners();
    let bounds = element.bounds();
    let top_center = Point::new(bounds.center().x, bounds.y0 - rotate_offset);

    vec![
        Handle::new(corners[0], HandleKind::Corner(Corner::TopLeft)),
        Handle::new(corners[1], HandleKind::Corner(Corner::TopRight)),
        Handle::new(corners[2], HandleKind::Corner(Corner::BottomRight)),
        Handle::new(corners[3], HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(
            rotate_point(top_center, bounds.center(), element.angle),
            HandleKind::Rotate,
        ),
    ]
}

/// Corner handles of a multi-element selection box.
pub fn selection_box_handles(bounds: Rect) -> Vec<Handle> {
    [Corner::TopLeft, Corner::TopRight, Corner::BottomRight, Corner::BottomLeft]
        .into_iter()
        .map(|corner| Handle::new(corner.of(bounds), HandleKind::Corner(corner)))
        .collect()
}

/// Handles for the current selection, sized for the current zoom.
pub fn selection_handles(canvas: &Canvas) -> Vec<Handle> {
    let selected = canvas.selected_elements();
    match selected.as_slice() {
        [] => Vec::new(),
        [single] => element_handles(single, ROTATE_HANDLE_OFFSET / canvas.viewport.zoom),
        many => union_bounds(many.iter().copied())
            .map(selection_box_handles)
            .unwrap_or_default(),
    }
}

/// The first handle under `point`.
pub fn hit_test_handles(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// Snapshot of the elements a gesture manipulates.
fn capture(canvas: &Canvas, ids: &[ElementId]) -> Vec<Element> {
    canvas
        .elements()
        .iter()
        .filter(|e| ids.contains(&e.id()))
        .cloned()
        .collect()
}

/// Moving one or more elements together.
///
/// Snapping runs once against the anchor element's top-left corner and the
/// resulting delta is applied to every member.
#[derive(Debug, Clone)]
pub struct MoveState {
    start: Point,
    anchor_origin: Point,
    originals: Vec<Element>,
    delta: Vec2,
}

impl MoveState {
    /// Start moving `ids`; `anchor` is the element under the pointer.
    pub fn new(canvas: &Canvas, ids: &[ElementId], anchor: ElementId, start: Point) -> Option<Self> {
        let originals = capture(canvas, ids);
        let anchor_bounds = originals
            .iter()
            .find(|e| e.id() == anchor)
            .or_else(|| originals.first())?
            .bounds();
        Some(Self {
            start,
            anchor_origin: Point::new(anchor_bounds.x0, anchor_bounds.y0),
            originals,
            delta: Vec2::ZERO,
        })
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.originals.iter().map(Element::id).collect()
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn update(&mut self, canvas: &mut Canvas, point: Point) {
        let ids = self.ids();
        let target = self.anchor_origin + (point - self.start);
        let snapped = canvas.snap(target, SnapOperation::Moving, &ids);
        self.delta = snapped - self.anchor_origin;

        for original in &self.originals {
            let mut moved = original.clone();
            moved.translate(self.delta);
            canvas.modify_silent(original.id(), |element| *element = moved);
        }
    }

    /// Commit the move; returns false when nothing moved.
    pub fn finish(self, canvas: &mut Canvas) -> bool {
        if self.delta == Vec2::ZERO {
            return false;
        }
        log::debug!("Moved {} elements by {:?}", self.originals.len(), self.delta);
        canvas.commit();
        true
    }

    pub fn cancel(self, canvas: &mut Canvas) {
        canvas.restore_silent(&self.originals);
    }
}

/// Resizing from a corner handle.
///
/// A single element resizes in its own rotated frame with the opposite corner
/// pinned; several elements scale proportionally around the opposite corner of
/// their common bounds.
#[derive(Debug, Clone)]
pub struct ResizeState {
    corner: Corner,
    bounds: Rect,
    originals: Vec<Element>,
    changed: bool,
}

impl ResizeState {
    pub fn new(canvas: &Canvas, ids: &[ElementId], corner: Corner) -> Option<Self> {
        let originals = capture(canvas, ids);
        let bounds = match originals.as_slice() {
            [] => return None,
            [single] => single.bounds(),
            many => union_bounds(many)?,
        };
        Some(Self {
            corner,
            bounds,
            originals,
            changed: false,
        })
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.originals.iter().map(Element::id).collect()
    }

    pub fn update(&mut self, canvas: &mut Canvas, point: Point, keep_aspect_ratio: bool) {
        let ids = self.ids();
        let point = canvas.snap(point, SnapOperation::Resizing, &ids);

        if let [original] = self.originals.as_slice() {
            let target = resized_rect(original, self.corner, point, keep_aspect_ratio);
            let mut resized = original.clone();
            resized.fit_to_rect(target);
            canvas.modify_silent(original.id(), |element| *element = resized);
        } else {
            let pivot = self.corner.opposite().of(self.bounds);
            let dragged = self.corner.of(self.bounds);
            let (mut sx, mut sy) = (
                axis_scale(point.x - pivot.x, dragged.x - pivot.x),
                axis_scale(point.y - pivot.y, dragged.y - pivot.y),
            );
            if keep_aspect_ratio {
                let s = sx.abs().max(sy.abs());
                sx = s.copysign(sx);
                sy = s.copysign(sy);
            }
            let map = |p: Point| Point::new(pivot.x + (p.x - pivot.x) * sx, pivot.y + (p.y - pivot.y) * sy);

            for original in &self.originals {
                let b = original.bounds();
                let target = Rect::from_points(map(Point::new(b.x0, b.y0)), map(Point::new(b.x1, b.y1)));
                let mut resized = original.clone();
                resized.fit_to_rect(target);
                canvas.modify_silent(original.id(), |element| *element = resized);
            }
        }
        self.changed = true;
    }

    pub fn finish(self, canvas: &mut Canvas) -> bool {
        if !self.changed {
            return false;
        }
        canvas.commit();
        true
    }

    pub fn cancel(self, canvas: &mut Canvas) {
        canvas.restore_silent(&self.originals);
    }
}

fn axis_scale(current: f64, original: f64) -> f64 {
    if original.abs() < f64::EPSILON {
        1.0
    } else {
        current / original
    }
}

/// New unrotated bounds for `element` when `corner` is dragged to `point`.
fn resized_rect(element: &Element, corner: Corner, point: Point, keep_aspect_ratio: bool) -> Rect {
    let bounds = element.bounds();
    let center = bounds.center();
    let local = rotate_point(point, center, -element.angle);
    let pivot = corner.opposite().of(bounds);

    let mut dx = local.x - pivot.x;
    let mut dy = local.y - pivot.y;
    if keep_aspect_ratio && bounds.width() > f64::EPSILON && bounds.height() > f64::EPSILON {
        let aspect = bounds.width() / bounds.height();
        if dx.abs() / aspect > dy.abs() {
            dy = (dx.abs() / aspect).copysign(dy);
        } else {
            dx = (dy.abs() * aspect).copysign(dx);
        }
    }
    let local_rect = Rect::from_points(pivot, pivot + Vec2::new(dx, dy));
    let min_side = if element.kind.points().is_some() { 0.0 } else { MIN_RESIZE_SIDE };
    let size = Size::new(
        local_rect.width().max(min_side),
        local_rect.height().max(min_side),
    );

    // Keep the pinned corner fixed in world space under rotation
    let new_center = rotate_point(local_rect.center(), center, element.angle);
    Rect::from_center_size(new_center, size)
}

/// Rotating a single element around its center.
#[derive(Debug, Clone)]
pub struct RotateState {
    original: Element,
    changed: bool,
}

impl RotateState {
    pub fn new(canvas: &Canvas, id: ElementId) -> Option<Self> {
        Some(Self {
            original: canvas.get_element(id)?.clone(),
            changed: false,
        })
    }

    /// Point the element's top toward `point`; `snap` rounds to 15°.
    pub fn update(&mut self, canvas: &mut Canvas, point: Point, snap: bool) {
        let center = self.original.center();
        let mut angle = (point.y - center.y).atan2(point.x - center.x) + std::f64::consts::FRAC_PI_2;
        if snap {
            angle = snap_angle(angle, ANGLE_SNAP_INCREMENT);
        }
        canvas.modify_silent(self.original.id(), |element| element.angle = angle);
        self.changed = true;
    }

    pub fn finish(self, canvas: &mut Canvas) -> bool {
        if !self.changed {
            return false;
        }
        canvas.commit();
        true
    }

    pub fn cancel(self, canvas: &mut Canvas) {
        canvas.restore_silent(std::slice::from_ref(&self.original));
    }
}

/// Marquee rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
    /// Union with the selection held when the marquee started.
    pub additive: bool,
}

impl SelectionRect {
    pub fn new(start: Point, additive: bool) -> Self {
        Self {
            start,
            current: start,
            additive,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Select what the marquee touches, expanding groups.
    pub fn finish(&self, canvas: &mut Canvas) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = if self.additive {
            canvas.selected_ids().to_vec()
        } else {
            Vec::new()
        };
        for hit in canvas.elements_in_rect(self.to_rect()) {
            for id in canvas.group_members(hit) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        canvas.select_elements(&ids);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementDraft, ElementKind};

    fn add_rect(canvas: &mut Canvas, x: f64, y: f64, w: f64, h: f64) -> ElementId {
        canvas
            .add_element(ElementDraft::new(ElementKind::Rectangle, x, y, w, h))
            .id()
    }

    #[test]
    fn test_element_handles_positions() {
        let mut canvas = Canvas::new();
        let id = add_rect(&mut canvas, 0.0, 0.0, 100.0, 50.0);
        let handles = element_handles(canvas.get_element(id).unwrap(), 25.0);
        assert_eq!(handles.len(), 5);
        assert_eq!(handles[2].position, Point::new(100.0, 50.0));
        assert_eq!(handles[4].position, Point::new(50.0, -25.0));
        assert_eq!(
            hit_test_handles(&handles, Point::new(98.0, 52.0), 5.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(hit_test_handles(&handles, Point::new(50.0, 25.0), 5.0), None);
    }

    #[test]
    fn test_group_move_applies_one_delta() {
        let mut canvas = Canvas::new();
        canvas.toggle_snap_to_grid();
        let a = add_rect(&mut canvas, 0.0, 0.0, 40.0, 40.0);
        let b = add_rect(&mut canvas, 103.0, 57.0, 40.0, 40.0);
        let history = canvas.history().len();

        let mut state = MoveState::new(&canvas, &[a, b], a, Point::new(10.0, 10.0)).unwrap();
        state.update(&mut canvas, Point::new(37.0, 22.0));
        // Anchor top-left (27, 12) snaps to (20, 20); b moves by the same delta
        let moved_b = canvas.get_element(b).unwrap();
        assert!((moved_b.x - 123.0).abs() < f64::EPSILON);
        assert!((moved_b.y - 77.0).abs() < f64::EPSILON);
        assert_eq!(canvas.history().len(), history);

        assert!(state.finish(&mut canvas));
        assert_eq!(canvas.history().len(), history + 1);
    }

    #[test]
    fn test_move_cancel_restores() {
        let mut canvas = Canvas::new();
        let a = add_rect(&mut canvas, 0.0, 0.0, 40.0, 40.0);
        let mut state = MoveState::new(&canvas, &[a], a, Point::ZERO).unwrap();
        state.update(&mut canvas, Point::new(50.0, 50.0));
        state.cancel(&mut canvas);
        assert!(canvas.get_element(a).unwrap().x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_resize_pins_opposite_corner() {
        let mut canvas = Canvas::new();
        let id = add_rect(&mut canvas, 10.0, 10.0, 100.0, 50.0);
        let mut state = ResizeState::new(&canvas, &[id], Corner::BottomRight).unwrap();
        state.update(&mut canvas, Point::new(210.0, 110.0), false);
        let el = canvas.get_element(id).unwrap();
        assert!((el.x - 10.0).abs() < 1e-9);
        assert!((el.width - 200.0).abs() < 1e-9);
        assert!((el.height - 100.0).abs() < 1e-9);

        state.update(&mut canvas, Point::new(210.0, 30.0), true);
        let el = canvas.get_element(id).unwrap();
        assert!((el.width - 200.0).abs() < 1e-9);
        assert!((el.height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_past_pivot_flips() {
        let mut canvas = Canvas::new();
        let id = add_rect(&mut canvas, 100.0, 100.0, 50.0, 50.0);
        let mut state = ResizeState::new(&canvas, &[id], Corner::BottomRight).unwrap();
        state.update(&mut canvas, Point::new(60.0, 80.0), false);
        let el = canvas.get_element(id).unwrap();
        assert!((el.x - 60.0).abs() < 1e-9);
        assert!((el.y - 80.0).abs() < 1e-9);
        assert!((el.width - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_flat_line_on_its_axis() {
        let mut canvas = Canvas::new();
        let id = canvas
            .add_element(ElementDraft::new(
                ElementKind::Line {
                    points: vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
                },
                0.0,
                0.0,
                0.0,
                0.0,
            ))
            .id();
        let mut state = ResizeState::new(&canvas, &[id], Corner::BottomRight).unwrap();
        state.update(&mut canvas, Point::new(200.0, 50.0), false);
        let el = canvas.get_element(id).unwrap();
        assert_eq!(
            el.kind.points(),
            Some(&[Point::new(0.0, 50.0), Point::new(200.0, 50.0)][..])
        );
        assert!(el.height.abs() < f64::EPSILON);
    }

    #[test]
    fn test_multi_resize_scales_members() {
        let mut canvas = Canvas::new();
        let a = add_rect(&mut canvas, 0.0, 0.0, 50.0, 50.0);
        let b = add_rect(&mut canvas, 50.0, 50.0, 50.0, 50.0);
        let mut state = ResizeState::new(&canvas, &[a, b], Corner::BottomRight).unwrap();
        state.update(&mut canvas, Point::new(200.0, 200.0), false);
        let b_el = canvas.get_element(b).unwrap();
        assert!((b_el.x - 100.0).abs() < 1e-9);
        assert!((b_el.width - 100.0).abs() < 1e-9);
        assert!(state.finish(&mut canvas));
    }

    #[test]
    fn test_rotation_snaps_to_15_degrees() {
        let mut canvas = Canvas::new();
        let id = add_rect(&mut canvas, 0.0, 0.0, 100.0, 100.0);
        let mut state = RotateState::new(&canvas, id).unwrap();
        // Pointer to the right of center is a quarter turn
        state.update(&mut canvas, Point::new(200.0, 52.0), true);
        let angle = canvas.get_element(id).unwrap().angle;
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        state.cancel(&mut canvas);
        assert!(canvas.get_element(id).unwrap().angle.abs() < f64::EPSILON);
    }

    #[test]
    fn test_marquee_selection() {
        let mut canvas = Canvas::new();
        let a = add_rect(&mut canvas, 0.0, 0.0, 20.0, 20.0);
        let b = add_rect(&mut canvas, 100.0, 100.0, 20.0, 20.0);
        let c = add_rect(&mut canvas, 300.0, 300.0, 20.0, 20.0);

        let mut marquee = SelectionRect::new(Point::new(-10.0, -10.0), false);
        marquee.current = Point::new(110.0, 110.0);
        assert_eq!(marquee.finish(&mut canvas), vec![a, b]);

        let mut marquee = SelectionRect::new(Point::new(290.0, 290.0), true);
        marquee.current = Point::new(330.0, 330.0);
        assert_eq!(marquee.finish(&mut canvas), vec![a, b, c]);
    }
}
