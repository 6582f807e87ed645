// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for wall reconstruction and meshing

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in floor plan coordinates (meters)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coordinate-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Point2D, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    /// Lift the point to 3D at height `z`
    pub fn lift(&self, z: f64) -> Point3D {
        Point3D::new(self.x, self.y, z)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// A 3D mesh vertex position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Straight line segment between two floor plan points
///
/// Equality is coordinate equality of the ordered endpoints; use
/// [`LineSegment::same_endpoints`] for a direction-independent comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LineSegment {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl LineSegment {
    pub fn new(p1: Point2D, p2: Point2D) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }

    /// Unnormalized direction `p2 - p1`
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.p2.x - self.p1.x, self.p2.y - self.p1.y)
    }

    /// Slope `dy / dx`; infinite for vertical segments
    pub fn slope(&self) -> f64 {
        let dx = self.p2.x - self.p1.x;
        if dx == 0.0 {
            return f64::INFINITY;
        }
        (self.p2.y - self.p1.y) / dx
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.p2, self.p1)
    }

    /// True when both segments share the same endpoints in either direction
    pub fn same_endpoints(&self, other: &LineSegment, epsilon: f64) -> bool {
        (self.p1.approx_eq(&other.p1, epsilon) && self.p2.approx_eq(&other.p2, epsilon))
            || (self.p1.approx_eq(&other.p2, epsilon) && self.p2.approx_eq(&other.p1, epsilon))
    }

    /// Signed distance of the projection of `point` along `p1 -> p2`, measured from `p1`
    ///
    /// Returns 0 for a zero-length segment.
    pub fn parameter_of(&self, point: &Point2D) -> f64 {
        let dir = self.direction();
        let len = dir.norm();
        if len < f64::EPSILON {
            return 0.0;
        }
        let offset = Vector2::new(point.x - self.p1.x, point.y - self.p1.y);
        offset.dot(&dir) / len
    }
}

/// Semantic classification of a wall segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    /// Solid wall, full storey height
    Plain,
    /// Wall segment hosting a door opening
    Door,
    /// Wall segment hosting a window opening
    Window,
}

impl WallKind {
    /// Numeric code used by the upstream element classifier (0 plain, 1 door, 2 window)
    pub fn code(self) -> u8 {
        match self {
            WallKind::Plain => 0,
            WallKind::Door => 1,
            WallKind::Window => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WallKind::Plain),
            1 => Some(WallKind::Door),
            2 => Some(WallKind::Window),
            _ => None,
        }
    }

    /// Parse a kind token: a name (`door`, `window`, `plain`) or a numeric code
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "plain" | "wall" => Some(WallKind::Plain),
            "door" => Some(WallKind::Door),
            "window" => Some(WallKind::Window),
            other => other.parse::<u8>().ok().and_then(Self::from_code),
        }
    }

    pub fn is_opening(self) -> bool {
        !matches!(self, WallKind::Plain)
    }
}

impl fmt::Display for WallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WallKind::Plain => write!(f, "plain"),
            WallKind::Door => write!(f, "door"),
            WallKind::Window => write!(f, "window"),
        }
    }
}

/// Vertical extent of an opening above the floor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ZRange {
    pub min: f64,
    pub max: f64,
}

impl ZRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn height(&self) -> f64 {
        self.max - self.min
    }
}

/// A typed wall segment of the floor plan
///
/// `z_range` is `Some` for door and window segments and `None` for plain
/// (full height) walls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Wall {
    pub p1: Point2D,
    pub p2: Point2D,
    pub kind: WallKind,
    pub z_range: Option<ZRange>,
}

impl Wall {
    pub fn plain(p1: Point2D, p2: Point2D) -> Self {
        Self {
            p1,
            p2,
            kind: WallKind::Plain,
            z_range: None,
        }
    }

    pub fn with_opening(p1: Point2D, p2: Point2D, kind: WallKind, z_range: ZRange) -> Self {
        Self {
            p1,
            p2,
            kind,
            z_range: Some(z_range),
        }
    }

    pub fn from_segment(segment: &LineSegment) -> Self {
        Self::plain(segment.p1, segment.p2)
    }

    pub fn segment(&self) -> LineSegment {
        LineSegment::new(self.p1, self.p2)
    }

    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }
}

/// Door or window footprint reported by the element classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Opening {
    pub p1: Point2D,
    pub p2: Point2D,
    pub kind: WallKind,
    pub z_range: ZRange,
}

impl Opening {
    pub fn new(p1: Point2D, p2: Point2D, kind: WallKind, z_range: ZRange) -> Self {
        Self {
            p1,
            p2,
            kind,
            z_range,
        }
    }

    /// Build from the classifier's element tuple `(x1, y1, z_min, x2, y2, z_max)`
    pub fn from_element(kind: WallKind, element: [f64; 6]) -> Self {
        let [x1, y1, z_min, x2, y2, z_max] = element;
        Self::new(
            Point2D::new(x1, y1),
            Point2D::new(x2, y2),
            kind,
            ZRange::new(z_min, z_max),
        )
    }

    pub fn footprint(&self) -> LineSegment {
        LineSegment::new(self.p1, self.p2)
    }

    /// Same opening with a replaced footprint (used after projection onto a wall)
    pub fn with_footprint(&self, footprint: &LineSegment) -> Self {
        Self {
            p1: footprint.p1,
            p2: footprint.p2,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_vertical_is_infinite() {
        let seg = LineSegment::new(Point2D::new(1.0, 0.0), Point2D::new(1.0, 5.0));
        assert!(seg.slope().is_infinite());

        let seg = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(2.0, 1.0));
        assert!((seg.slope() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_parameter_of_is_orientation_agnostic() {
        let seg = LineSegment::new(Point2D::new(10.0, 0.0), Point2D::new(0.0, 0.0));
        assert!((seg.parameter_of(&Point2D::new(10.0, 0.0)) - 0.0).abs() < 1e-12);
        assert!((seg.parameter_of(&Point2D::new(6.0, 0.0)) - 4.0).abs() < 1e-12);
        assert!((seg.parameter_of(&Point2D::new(0.0, 3.0)) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_endpoints_either_direction() {
        let a = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
        assert!(a.same_endpoints(&a.reversed(), 0.0));
        let b = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.1));
        assert!(!a.same_endpoints(&b, 1e-6));
    }

    #[test]
    fn test_wall_kind_tokens() {
        assert_eq!(WallKind::parse_token("Door"), Some(WallKind::Door));
        assert_eq!(WallKind::parse_token("2"), Some(WallKind::Window));
        assert_eq!(WallKind::parse_token("skylight"), None);
        assert_eq!(WallKind::from_code(WallKind::Window.code()), Some(WallKind::Window));
    }

    #[test]
    fn test_opening_from_element() {
        let opening = Opening::from_element(WallKind::Door, [4.0, 0.0, 0.0, 6.0, 0.0, 2.0]);
        assert_eq!(opening.p1, Point2D::new(4.0, 0.0));
        assert_eq!(opening.p2, Point2D::new(6.0, 0.0));
        assert!((opening.z_range.height() - 2.0).abs() < 1e-12);
    }
}
