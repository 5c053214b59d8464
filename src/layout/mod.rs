//! Polar placement of hops on the radar.
//!
//! Angles are measured in degrees from the positive y axis towards the
//! positive x axis, so `x = cx + r·sin(θ)` and `y = cy + r·cos(θ)`.

use serde::Deserialize;

mod path;
mod radial;

pub use path::{PathAngle, PathParams, PathPoint, path_layout};
pub use radial::{AngleMode, PlacedNode, RadialParams, radial_layout, sibling_offset};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutPoint {
    pub radius: f64,
    /// Radians.
    pub angle: f64,
    pub position: Point,
}

impl LayoutPoint {
    pub fn from_polar(center: Point, radius: f64, angle_deg: f64) -> Self {
        let angle = angle_deg.to_radians();
        Self {
            radius,
            angle,
            position: Point::new(
                center.x + radius * angle.sin(),
                center.y + radius * angle.cos(),
            ),
        }
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }
}

/// Radial distance between two consecutive rings.
pub fn ring_step(max_radius: f64, ring_count: usize) -> f64 {
    if ring_count == 0 {
        return 0.0;
    }
    max_radius.max(0.0) / ring_count as f64
}
