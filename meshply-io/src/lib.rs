//! I/O operations for point clouds and meshes
//!
//! This crate reads PLY files (ASCII and both binary byte orders) into the
//! containers of `meshply-core`, and writes them back out. The [`ply`] module
//! holds the full reader and writer; the traits and free functions here are
//! the format-agnostic entry points that dispatch on the file extension.

pub mod ply;

pub use ply::{Ply, PlyFormat, PlyReader, PlyVertices, PlyWriteOptions, PlyWriter};

use meshply_core::{Error, Point3d, PointCloud, Result, TriangleMesh};
use std::path::Path;

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>>;
}

/// Trait for writing point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3d>, path: P) -> Result<()>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

fn unsupported(kind: &str, path: &Path) -> Error {
    Error::UnsupportedFormat(format!(
        "Unsupported {} format: {:?}",
        kind,
        path.extension()
    ))
}

/// Auto-detect format and read point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("ply") => Ply::read_point_cloud(path),
        _ => Err(unsupported("point cloud", path)),
    }
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("ply") => Ply::read_mesh(path),
        _ => Err(unsupported("mesh", path)),
    }
}

/// Auto-detect format and write point cloud
pub fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3d>, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("ply") => Ply::write_point_cloud(cloud, path),
        _ => Err(unsupported("point cloud", path)),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("ply") => Ply::write_mesh(mesh, path),
        _ => Err(unsupported("mesh", path)),
    }
}

#[cfg(test)]
mod tests;
