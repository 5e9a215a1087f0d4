//! Point cloud data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with 3D points
pub type PointCloud3d = PointCloud<Point3d>;

/// A point cloud with colored points
pub type ColoredPointCloud3d = PointCloud<ColoredPoint3d>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get a point by index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.points.get(index)
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.points.iter_mut()
    }

    /// Clear all points from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Reserve capacity for additional points
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> Extend<T> for PointCloud<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl PointCloud<ColoredPoint3d> {
    /// Build a colored cloud from parallel position and color sequences.
    ///
    /// Returns `None` when the two sequences differ in length.
    pub fn from_parts(positions: Vec<Point3d>, colors: Vec<Rgb>) -> Option<Self> {
        if positions.len() != colors.len() {
            return None;
        }
        Some(
            positions
                .into_iter()
                .zip(colors)
                .map(|(position, color)| ColoredPoint3d::new(position, color))
                .collect(),
        )
    }

    /// Positions without color
    pub fn positions(&self) -> PointCloud<Point3d> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Color of the point at `index`
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.points.get(index).map(|p| p.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_get_set() {
        let mut cloud = PointCloud::from_points(vec![Point3d::origin(); 2]);
        cloud[1] = Point3d::new(1.0, 2.0, 3.0);
        assert_eq!(cloud[1], Point3d::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.get(2), None);
    }

    #[test]
    fn test_from_parts_keeps_correspondence() {
        let cloud = PointCloud::from_parts(
            vec![Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 0.0, 0.0)],
            vec![[255, 0, 0], [0, 255, 0]],
        )
        .unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.color(1), Some([0, 255, 0]));
        assert_eq!(cloud.positions()[1], Point3d::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        assert!(PointCloud::from_parts(vec![Point3d::origin()], vec![]).is_none());
    }
}
