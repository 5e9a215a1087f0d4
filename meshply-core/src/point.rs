//! Point types and related functionality

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// An 8-bit per channel RGB color
pub type Rgb = [u8; 3];

/// A point with color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3d {
    pub position: Point3d,
    pub color: Rgb,
}

impl ColoredPoint3d {
    /// Create a colored point
    pub fn new(position: Point3d, color: Rgb) -> Self {
        Self { position, color }
    }
}

impl Default for ColoredPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            color: [255, 255, 255],
        }
    }
}

impl From<ColoredPoint3d> for Point3d {
    fn from(point: ColoredPoint3d) -> Self {
        point.position
    }
}
