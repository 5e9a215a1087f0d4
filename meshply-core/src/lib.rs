//! Core data structures for meshply
//!
//! This crate provides the in-memory geometry the PLY reader produces:
//! points, point clouds (optionally colored), indexed triangle meshes,
//! and the shared error type.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

// Type aliases for easier imports
pub type Point = Point3d;
pub type Mesh = TriangleMesh;
