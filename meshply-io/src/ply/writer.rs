//! PLY writer
//!
//! Produces files the reader in this crate accepts: a `vertex` element with
//! `x`, `y`, `z` and optionally `red`, `green`, `blue`, and a `face` element
//! holding triangles as `list uchar int vertex_indices`. Binary output is
//! always big-endian.

use byteorder::{BigEndian, WriteBytesExt};
use meshply_core::{ColoredPoint3d, Error, Point3d, PointCloud, Result, Rgb, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// PLY write options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlyWriteOptions {
    /// Write a `binary_big_endian` body instead of ASCII
    pub binary: bool,
    /// Store coordinates as `float` instead of `double`
    pub vertices_as_floats: bool,
}

impl PlyWriteOptions {
    /// ASCII body, `double` coordinates
    pub fn ascii() -> Self {
        Self::default()
    }

    /// Big-endian binary body, `double` coordinates
    pub fn binary() -> Self {
        Self {
            binary: true,
            ..Self::default()
        }
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_vertices_as_floats(mut self, vertices_as_floats: bool) -> Self {
        self.vertices_as_floats = vertices_as_floats;
        self
    }

    fn format_keyword(&self) -> &'static str {
        if self.binary {
            "binary_big_endian"
        } else {
            "ascii"
        }
    }

    fn coordinate_keyword(&self) -> &'static str {
        if self.vertices_as_floats {
            "float"
        } else {
            "double"
        }
    }
}

/// Writes point clouds and meshes in PLY format.
///
/// `comment` arguments may span several lines; each line becomes its own
/// `comment` header line.
#[derive(Debug, Clone, Default)]
pub struct PlyWriter {
    options: PlyWriteOptions,
}

/// The face element of the header
enum Faces {
    /// An empty `face` element with no properties
    Empty,
    Triangles(usize),
}

impl PlyWriter {
    pub fn new(options: PlyWriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlyWriteOptions {
        &self.options
    }

    /// Write a point cloud to a file
    pub fn write_points<P: AsRef<Path>>(
        &self,
        cloud: &PointCloud<Point3d>,
        comment: Option<&str>,
        path: P,
    ) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_points_to_writer(cloud, comment, &mut writer)
    }

    /// Write a point cloud to a writer
    pub fn write_points_to_writer<W: Write>(
        &self,
        cloud: &PointCloud<Point3d>,
        comment: Option<&str>,
        writer: &mut W,
    ) -> Result<()> {
        self.write_header(writer, comment, cloud.len(), false, Faces::Empty)?;
        for point in cloud.iter() {
            self.write_vertex(writer, point, None)?;
        }
        writer.flush()?;
        debug!(points = cloud.len(), binary = self.options.binary, "Wrote PLY points");
        Ok(())
    }

    /// Write a colored point cloud to a file
    pub fn write_colored_points<P: AsRef<Path>>(
        &self,
        cloud: &PointCloud<ColoredPoint3d>,
        comment: Option<&str>,
        path: P,
    ) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_colored_points_to_writer(cloud, comment, &mut writer)
    }

    /// Write a colored point cloud to a writer
    pub fn write_colored_points_to_writer<W: Write>(
        &self,
        cloud: &PointCloud<ColoredPoint3d>,
        comment: Option<&str>,
        writer: &mut W,
    ) -> Result<()> {
        self.write_header(writer, comment, cloud.len(), true, Faces::Empty)?;
        for point in cloud.iter() {
            self.write_vertex(writer, &point.position, Some(point.color))?;
        }
        writer.flush()?;
        debug!(
            points = cloud.len(),
            binary = self.options.binary,
            "Wrote colored PLY points"
        );
        Ok(())
    }

    /// Write a triangle mesh to a file
    pub fn write_mesh<P: AsRef<Path>>(
        &self,
        mesh: &TriangleMesh,
        comment: Option<&str>,
        path: P,
    ) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_mesh_to_writer(mesh, comment, &mut writer)
    }

    /// Write a triangle mesh to a writer.
    ///
    /// The mesh is validated before anything is written.
    pub fn write_mesh_to_writer<W: Write>(
        &self,
        mesh: &TriangleMesh,
        comment: Option<&str>,
        writer: &mut W,
    ) -> Result<()> {
        mesh.validate()?;
        if mesh.vertex_count() > i32::MAX as usize {
            return Err(Error::InvalidData(format!(
                "Too many vertices for int face indices: {}",
                mesh.vertex_count()
            )));
        }

        self.write_header(
            writer,
            comment,
            mesh.vertex_count(),
            false,
            Faces::Triangles(mesh.face_count()),
        )?;
        for vertex in &mesh.vertices {
            self.write_vertex(writer, vertex, None)?;
        }
        for face in &mesh.faces {
            self.write_triangle(writer, face)?;
        }
        writer.flush()?;
        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            binary = self.options.binary,
            "Wrote PLY mesh"
        );
        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        writer: &mut W,
        comment: Option<&str>,
        vertex_count: usize,
        colored: bool,
        faces: Faces,
    ) -> Result<()> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format {} 1.0", self.options.format_keyword())?;
        if let Some(comment) = comment {
            for line in comment.lines() {
                writeln!(writer, "comment {}", line)?;
            }
        }
        writeln!(writer, "element vertex {}", vertex_count)?;
        for axis in ["x", "y", "z"] {
            writeln!(writer, "property {} {}", self.options.coordinate_keyword(), axis)?;
        }
        if colored {
            for channel in ["red", "green", "blue"] {
                writeln!(writer, "property uchar {}", channel)?;
            }
        }
        match faces {
            Faces::Empty => writeln!(writer, "element face 0")?,
            Faces::Triangles(count) => {
                writeln!(writer, "element face {}", count)?;
                writeln!(writer, "property list uchar int vertex_indices")?;
            }
        }
        writeln!(writer, "end_header")?;
        Ok(())
    }

    fn write_vertex<W: Write>(
        &self,
        writer: &mut W,
        position: &Point3d,
        color: Option<Rgb>,
    ) -> Result<()> {
        let coords = [position.x, position.y, position.z];
        if self.options.binary {
            for value in coords {
                if self.options.vertices_as_floats {
                    writer.write_f32::<BigEndian>(value as f32)?;
                } else {
                    writer.write_f64::<BigEndian>(value)?;
                }
            }
            if let Some(color) = color {
                writer.write_all(&color)?;
            }
        } else {
            if self.options.vertices_as_floats {
                write!(
                    writer,
                    "{} {} {}",
                    coords[0] as f32, coords[1] as f32, coords[2] as f32
                )?;
            } else {
                write!(writer, "{} {} {}", coords[0], coords[1], coords[2])?;
            }
            if let Some([r, g, b]) = color {
                write!(writer, " {} {} {}", r, g, b)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Indices were range checked against a vertex count that fits in `i32`
    fn write_triangle<W: Write>(&self, writer: &mut W, face: &[usize; 3]) -> Result<()> {
        if self.options.binary {
            writer.write_u8(3)?;
            for &index in face {
                writer.write_i32::<BigEndian>(index as i32)?;
            }
        } else {
            writeln!(writer, "3 {} {} {}", face[0], face[1], face[2])?;
        }
        Ok(())
    }
}
