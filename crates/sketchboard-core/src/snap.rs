//! Grid and magnetic snapping.
//!
//! Everything here is a pure function of its inputs. Magnetic snapping pulls a
//! point toward grid intersections and element anchor points with a linear
//! field; grid snapping rounds coordinates to the grid pitch.

use crate::shapes::{Element, ElementId};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Default grid pitch in world units.
pub const GRID_SIZE: f64 = 20.0;

/// Smallest accepted grid spacing in world units.
pub const MIN_GRID_SIZE: f64 = 1.0;

/// Margin around the visible area, in world units, still producing magnetic points.
pub const MAGNETIC_MARGIN: f64 = 100.0;

/// Search radius as a multiple of the magnetic strength.
pub const SEARCH_RADIUS_FACTOR: f64 = 1.2;

/// Minimum weighted field, as a fraction of strength, for a snap to commit.
pub const COMMIT_THRESHOLD: f64 = 0.3;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Grid and magnetism settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid visibility.
    pub enabled: bool,
    /// Grid pitch.
    pub size: f64,
    pub snap_to_grid: bool,
    pub magnetic_enabled: bool,
    pub magnetic_strength: f64,
    pub magnetic_radius: f64,
    /// Grid intersections attract.
    pub magnetic_to_grid: bool,
    /// Element corners, centers and edge midpoints attract.
    pub magnetic_to_elements: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: GRID_SIZE,
            snap_to_grid: false,
            magnetic_enabled: false,
            magnetic_strength: 25.0,
            magnetic_radius: 30.0,
            magnetic_to_grid: true,
            magnetic_to_elements: true,
        }
    }
}

/// What produced a magnetic point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagneticPointKind {
    Grid,
    Corner,
    Center,
    EdgeMidpoint,
}

impl MagneticPointKind {
    /// Attraction weight of this category.
    pub fn weight(self) -> f64 {
        match self {
            MagneticPointKind::Grid => 1.0,
            MagneticPointKind::Corner => 0.9,
            MagneticPointKind::Center => 0.8,
            MagneticPointKind::EdgeMidpoint => 0.7,
        }
    }
}

/// A candidate snap target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticPoint {
    pub point: Point,
    pub weight: f64,
    pub kind: MagneticPointKind,
}

impl MagneticPoint {
    pub fn new(point: Point, kind: MagneticPointKind) -> Self {
        Self {
            point,
            weight: kind.weight(),
            kind,
        }
    }
}

/// Round a single coordinate to the nearest multiple of `grid_size`.
/// Halves round away from zero.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Linear field: `strength` under 1 unit, falling to zero at `strength` units.
pub fn calculate_magnetic_field(point: Point, magnetic_point: Point, strength: f64) -> f64 {
    let distance = point.distance(magnetic_point);
    if distance >= strength {
        return 0.0;
    }
    if distance < 1.0 {
        return strength;
    }
    strength * (1.0 - distance / strength)
}

/// Nearest candidate within `radius`. Ties keep the first candidate.
pub fn find_nearest_magnetic_point(
    point: Point,
    candidates: &[MagneticPoint],
    radius: f64,
) -> Option<MagneticPoint> {
    let mut nearest: Option<(MagneticPoint, f64)> = None;
    for candidate in candidates {
        let distance = point.distance(candidate.point);
        if distance > radius {
            continue;
        }
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((*candidate, distance)),
        }
    }
    nearest.map(|(candidate, _)| candidate)
}

fn expanded_area(viewport: &Viewport) -> Rect {
    viewport
        .visible_world_rect()
        .inflate(MAGNETIC_MARGIN, MAGNETIC_MARGIN)
}

fn grid_points_in(area: Rect, grid_size: f64) -> Vec<MagneticPoint> {
    if !(grid_size >= MIN_GRID_SIZE) || !grid_size.is_finite() {
        return Vec::new();
    }

    let start_x = (area.x0 / grid_size).floor() as i64;
    let end_x = (area.x1 / grid_size).ceil() as i64;
    let start_y = (area.y0 / grid_size).floor() as i64;
    let end_y = (area.y1 / grid_size).ceil() as i64;

    let mut points = Vec::new();
    for ix in start_x..=end_x {
        for iy in start_y..=end_y {
            points.push(MagneticPoint::new(
                Point::new(ix as f64 * grid_size, iy as f64 * grid_size),
                MagneticPointKind::Grid,
            ));
        }
    }
    points
}

/// Grid intersections covering the visible area plus the margin.
pub fn generate_grid_magnetic_points(viewport: &Viewport, grid_size: f64) -> Vec<MagneticPoint> {
    grid_points_in(expanded_area(viewport), grid_size)
}

/// Center, corners and edge midpoints of every element near the visible area.
pub fn generate_element_magnetic_points<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
    viewport: &Viewport,
) -> Vec<MagneticPoint> {
    let area = expanded_area(viewport);
    let mut points = Vec::new();

    for element in elements {
        if !element.intersects_rect(area) {
            continue;
        }

        points.push(MagneticPoint::new(element.center(), MagneticPointKind::Center));

        let corners = element.rotated_corners();
        points.extend(
            corners
                .iter()
                .map(|c| MagneticPoint::new(*c, MagneticPointKind::Corner)),
        );

        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            points.push(MagneticPoint::new(a.midpoint(b), MagneticPointKind::EdgeMidpoint));
        }
    }

    points
}

/// Sources a magnetic snap may draw from.
#[derive(Debug, Clone, Copy)]
pub struct MagneticSources<'a> {
    pub config: &'a GridConfig,
    pub viewport: Option<&'a Viewport>,
    pub elements: &'a [Element],
    /// Elements that never attract (the ones being manipulated).
    pub exclude: &'a [ElementId],
}

/// Find the magnetic target for `point`, if the pull is strong enough.
pub fn get_magnetic_snap_point(
    point: Point,
    strength: f64,
    sources: MagneticSources<'_>,
) -> Option<Point> {
    let config = sources.config;
    if !config.magnetic_enabled || strength <= 0.0 {
        return None;
    }

    let radius = (strength * SEARCH_RADIUS_FACTOR).min(config.magnetic_radius);

    let mut candidates = Vec::new();
    if config.magnetic_to_grid {
        // Only intersections inside the search radius can win
        let area = Rect::from_points(point, point).inflate(radius, radius);
        candidates.extend(grid_points_in(area, config.size));
    }
    if config.magnetic_to_elements {
        let attracting = sources
            .elements
            .iter()
            .filter(|e| !sources.exclude.contains(&e.id()));
        match sources.viewport {
            Some(viewport) => {
                candidates.extend(generate_element_magnetic_points(attracting, viewport))
            }
            None => {
                let viewport = Viewport {
                    bounds: Rect::from_points(point, point).inflate(radius, radius),
                    ..Viewport::default()
                };
                candidates.extend(generate_element_magnetic_points(attracting, &viewport))
            }
        }
    }

    let nearest = find_nearest_magnetic_point(point, &candidates, radius)?;
    let total = calculate_magnetic_field(point, nearest.point, strength) * nearest.weight;
    (total >= strength * COMMIT_THRESHOLD).then_some(nearest.point)
}

/// The manipulation a snap is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOperation {
    Drawing,
    Moving,
    Resizing,
}

impl SnapOperation {
    /// Strength multiplier for this operation.
    pub fn factor(self) -> f64 {
        match self {
            SnapOperation::Drawing => 1.0,
            SnapOperation::Moving => 0.8,
            SnapOperation::Resizing => 0.6,
        }
    }
}

/// Everything an operation-aware snap needs.
#[derive(Debug, Clone, Copy)]
pub struct SnapContext<'a> {
    pub operation: SnapOperation,
    pub config: &'a GridConfig,
    pub viewport: &'a Viewport,
    pub elements: &'a [Element],
    pub exclude: &'a [ElementId],
}

impl<'a> SnapContext<'a> {
    fn sources(&self) -> MagneticSources<'a> {
        MagneticSources {
            config: self.config,
            viewport: Some(self.viewport),
            elements: self.elements,
            exclude: self.exclude,
        }
    }

    fn strength(&self) -> f64 {
        self.config.magnetic_strength * self.operation.factor()
    }
}

/// Magnetic snap scaled for the operation; returns `point` unchanged when nothing pulls.
pub fn apply_magnetic_snapping(point: Point, context: &SnapContext<'_>) -> Point {
    get_magnetic_snap_point(point, context.strength(), context.sources()).unwrap_or(point)
}

/// Magnetic snap first, grid rounding as the fallback, else the raw point.
pub fn snap_point(point: Point, context: &SnapContext<'_>) -> Point {
    if let Some(snapped) = get_magnetic_snap_point(point, context.strength(), context.sources()) {
        return snapped;
    }
    if context.config.snap_to_grid {
        return snap_to_grid(point, context.config.size);
    }
    point
}

/// Snap an angle in radians to the nearest multiple of `increment_degrees`.
pub fn snap_angle(angle: f64, increment_degrees: f64) -> f64 {
    let increment = increment_degrees.to_radians();
    if increment <= 0.0 {
        return angle;
    }
    (angle / increment).round() * increment
}

/// Snap `end` so the segment from `start` sits on a 15° increment, keeping its length.
pub fn snap_line_endpoint(start: Point, end: Point) -> Point {
    let delta = end - start;
    let length = delta.hypot();
    if length < 0.001 {
        return end;
    }
    let angle = snap_angle(delta.y.atan2(delta.x), ANGLE_SNAP_INCREMENT);
    Point::new(start.x + length * angle.cos(), start.y + length * angle.sin())
}

/// Constrain the drag from `anchor` to `current` to a square, keeping the drag direction.
pub fn constrain_square(anchor: Point, current: Point) -> Point {
    let dx = current.x - anchor.x;
    let dy = current.y - anchor.y;
    let side = dx.abs().max(dy.abs());
    Point::new(anchor.x + side.copysign(dx), anchor.y + side.copysign(dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementKind, ElementStyle};

    fn magnetic_config() -> GridConfig {
        GridConfig {
            magnetic_enabled: true,
            ..GridConfig::default()
        }
    }

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Point::new(103.0, 97.0), 20.0);
        assert!((snapped.x - 100.0).abs() < f64::EPSILON);
        assert!((snapped.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_value_halves_round_away_from_zero() {
        assert!((snap_value(110.0, 20.0) - 120.0).abs() < f64::EPSILON);
        assert!((snap_value(-110.0, 20.0) + 120.0).abs() < f64::EPSILON);
        assert!((snap_value(13.0, 0.0) - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_field_saturates_and_falls_off() {
        let origin = Point::new(0.0, 0.0);
        assert!((calculate_magnetic_field(origin, origin, 25.0) - 25.0).abs() < f64::EPSILON);
        assert!((calculate_magnetic_field(Point::new(0.5, 0.0), origin, 25.0) - 25.0).abs() < f64::EPSILON);
        assert!((calculate_magnetic_field(Point::new(10.0, 0.0), origin, 25.0) - 15.0).abs() < 1e-9);
        assert!(calculate_magnetic_field(Point::new(25.0, 0.0), origin, 25.0).abs() < f64::EPSILON);
        assert!(calculate_magnetic_field(Point::new(40.0, 0.0), origin, 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let candidates = [
            MagneticPoint::new(Point::new(10.0, 0.0), MagneticPointKind::Grid),
            MagneticPoint::new(Point::new(-10.0, 0.0), MagneticPointKind::Corner),
        ];
        let nearest = find_nearest_magnetic_point(Point::ZERO, &candidates, 20.0);
        assert_eq!(nearest.map(|m| m.kind), Some(MagneticPointKind::Grid));
        assert!(find_nearest_magnetic_point(Point::ZERO, &candidates, 5.0).is_none());
    }

    #[test]
    fn test_grid_points_cover_margin() {
        let viewport = Viewport {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            ..Viewport::default()
        };
        let points = generate_grid_magnetic_points(&viewport, 20.0);
        assert!(points.iter().any(|p| p.point == Point::new(-100.0, -100.0)));
        assert!(points.iter().any(|p| p.point == Point::new(200.0, 200.0)));
        assert!(points.iter().all(|p| p.kind == MagneticPointKind::Grid));
        assert!(generate_grid_magnetic_points(&viewport, 0.0).is_empty());
    }

    #[test]
    fn test_element_points_skip_offscreen() {
        let viewport = Viewport::default();
        let near = Element::new(ElementKind::Rectangle, 10.0, 10.0, 40.0, 20.0, ElementStyle::default());
        let far = Element::new(ElementKind::Rectangle, 5000.0, 5000.0, 10.0, 10.0, ElementStyle::default());
        let points = generate_element_magnetic_points([&near, &far], &viewport);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0].kind, MagneticPointKind::Center);
        assert_eq!(points[0].point, Point::new(30.0, 20.0));
        assert_eq!(points[1].point, Point::new(10.0, 10.0));
        assert_eq!(points[5].point, Point::new(30.0, 10.0));
    }

    #[test]
    fn test_snap_at_intersection_and_disabled() {
        let config = magnetic_config();
        let sources = MagneticSources {
            config: &config,
            viewport: None,
            elements: &[],
            exclude: &[],
        };
        assert_eq!(
            get_magnetic_snap_point(Point::new(100.0, 100.0), 25.0, sources),
            Some(Point::new(100.0, 100.0))
        );

        let off = GridConfig::default();
        let sources = MagneticSources { config: &off, ..sources };
        assert_eq!(get_magnetic_snap_point(Point::new(101.0, 99.0), 25.0, sources), None);
    }

    #[test]
    fn test_grid_candidates_stay_local_on_huge_viewport() {
        let config = GridConfig {
            size: MIN_GRID_SIZE,
            magnetic_to_elements: false,
            ..magnetic_config()
        };
        let viewport = Viewport {
            bounds: Rect::new(0.0, 0.0, 1_000_000.0, 1_000_000.0),
            zoom: 0.1,
            ..Viewport::default()
        };
        let sources = MagneticSources {
            config: &config,
            viewport: Some(&viewport),
            elements: &[],
            exclude: &[],
        };
        assert_eq!(
            get_magnetic_snap_point(Point::new(40.2, 39.9), 25.0, sources),
            Some(Point::new(40.0, 40.0))
        );
        assert!(grid_points_in(Rect::new(0.0, 0.0, 10.0, 10.0), 0.01).is_empty());
    }

    #[test]
    fn test_point_on_grid_line_snaps_to_intersection() {
        let config = magnetic_config();
        let viewport = Viewport::default();
        let context = SnapContext {
            operation: SnapOperation::Drawing,
            config: &config,
            viewport: &viewport,
            elements: &[],
            exclude: &[],
        };
        let snapped = apply_magnetic_snapping(Point::new(100.0, 108.0), &context);
        assert_eq!(snapped, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_weak_pull_does_not_snap() {
        let config = GridConfig {
            magnetic_to_grid: false,
            ..magnetic_config()
        };
        let target = Element::new(ElementKind::Rectangle, 0.0, 0.0, 200.0, 200.0, ElementStyle::default());
        let elements = vec![target];
        let sources = MagneticSources {
            config: &config,
            viewport: None,
            elements: &elements,
            exclude: &[],
        };
        // Edge midpoint (100, 0) at distance 20: 25 * 0.2 * 0.7 = 3.5 < 7.5
        assert_eq!(get_magnetic_snap_point(Point::new(100.0, 20.0), 25.0, sources), None);
        // Corner (0, 0) at distance 5: 25 * 0.8 * 0.9 = 18 >= 7.5
        assert_eq!(
            get_magnetic_snap_point(Point::new(3.0, 4.0), 25.0, sources),
            Some(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_excluded_element_does_not_attract_itself() {
        let config = GridConfig {
            magnetic_to_grid: false,
            ..magnetic_config()
        };
        let viewport = Viewport::default();
        let moving = Element::new(ElementKind::Rectangle, 0.0, 0.0, 50.0, 50.0, ElementStyle::default());
        let id = moving.id();
        let elements = vec![moving];
        let exclude = [id];
        let context = SnapContext {
            operation: SnapOperation::Moving,
            config: &config,
            viewport: &viewport,
            elements: &elements,
            exclude: &exclude,
        };
        let raw = Point::new(2.0, 2.0);
        assert_eq!(apply_magnetic_snapping(raw, &context), raw);
    }

    #[test]
    fn test_operation_factor_weakens_snap() {
        let config = GridConfig {
            magnetic_to_elements: false,
            ..magnetic_config()
        };
        let viewport = Viewport::default();
        let mut context = SnapContext {
            operation: SnapOperation::Drawing,
            config: &config,
            viewport: &viewport,
            elements: &[],
            exclude: &[],
        };
        // 14.1 units from (100, 100): drawing strength 25 pulls with 10.9 >= 7.5,
        // resizing strength 15 pulls with 0.9 < 4.5
        let raw = Point::new(110.0, 110.0);
        assert_eq!(apply_magnetic_snapping(raw, &context), Point::new(100.0, 100.0));
        context.operation = SnapOperation::Resizing;
        assert_eq!(apply_magnetic_snapping(raw, &context), raw);
    }

    #[test]
    fn test_snap_point_falls_back_to_grid() {
        let config = GridConfig {
            snap_to_grid: true,
            ..GridConfig::default()
        };
        let viewport = Viewport::default();
        let context = SnapContext {
            operation: SnapOperation::Drawing,
            config: &config,
            viewport: &viewport,
            elements: &[],
            exclude: &[],
        };
        assert_eq!(snap_point(Point::new(103.0, 97.0), &context), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_snap_line_endpoint_keeps_length() {
        let end = snap_line_endpoint(Point::ZERO, Point::new(100.0, 5.0));
        assert!((end.y).abs() < 1e-9);
        assert!((end.x - (100.0f64 * 100.0 + 25.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_constrain_square() {
        let p = constrain_square(Point::new(10.0, 10.0), Point::new(-20.0, 15.0));
        assert_eq!(p, Point::new(-20.0, 40.0));
    }
}
