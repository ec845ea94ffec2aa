//! Viewport: pan/zoom transform and the visible pixel rectangle.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default zoom limits.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Viewport manages the view transform for the canvas.
///
/// Screen coordinates are `world * zoom + pan`. `bounds` is the visible pixel
/// rectangle, updated by the host on window resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// World-to-screen translation.
    pub pan: Vec2,
    /// Visible pixel rectangle.
    pub bounds: Rect,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom zoom limits.
    pub fn with_zoom_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            ..Self::default()
        }
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// The visible area in world coordinates.
    pub fn visible_world_rect(&self) -> Rect {
        let a = self.screen_to_world(Point::new(self.bounds.x0, self.bounds.y0));
        let b = self.screen_to_world(Point::new(self.bounds.x1, self.bounds.y1));
        Rect::from_points(a, b)
    }

    /// Set the zoom level, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        let new_screen = self.world_to_screen(world_point);
        self.pan += screen_point - new_screen;
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Update the visible pixel rectangle (window resize).
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds.abs();
    }

    /// Fit `content` (world coordinates) into the visible bounds.
    pub fn fit_to_bounds(&mut self, content: Rect, padding: f64) {
        if content.width() <= f64::EPSILON && content.height() <= f64::EPSILON {
            self.reset();
            return;
        }

        let available = Size::new(
            (self.bounds.width() - padding * 2.0).max(1.0),
            (self.bounds.height() - padding * 2.0).max(1.0),
        );

        let scale_x = available.width / content.width().max(f64::EPSILON);
        let scale_y = available.height / content.height().max(f64::EPSILON);
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let content_center = content.center();
        let view_center = self.bounds.center();
        self.pan = Vec2::new(
            view_center.x - content_center.x * self.zoom,
            view_center.y - content_center.y * self.zoom,
        );
    }
}
