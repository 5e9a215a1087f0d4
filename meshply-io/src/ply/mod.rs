//! PLY format support
//!
//! [`PlyReader`] parses and classifies the header once when it is created.
//! Every read call then reopens the source and decodes the whole body, so a
//! reader can be queried and read any number of times.
//!
//! ```no_run
//! use meshply_io::ply::{PlyReader, PlyVertices};
//!
//! let reader = PlyReader::open("scan.ply")?;
//! if reader.has_faces() {
//!     let mesh = reader.read_mesh()?;
//!     println!("{} triangles", mesh.face_count());
//! } else if let PlyVertices::Colored(cloud) = reader.read_vertices()? {
//!     println!("{} colored points", cloud.len());
//! }
//! # Ok::<(), meshply_core::Error>(())
//! ```

mod assembly;
mod header;
mod input;
mod layout;
mod types;
mod writer;

pub use header::{Element, Header, PlyFormat, Property};
pub use types::{Number, ScalarType};
pub use writer::{PlyWriteOptions, PlyWriter};

use crate::{MeshReader, MeshWriter, PointCloudReader, PointCloudWriter};
use assembly::{Assembly, Collect, Geometry};
use byteorder::{BigEndian, LittleEndian};
use input::{AsciiInput, BinaryInput, Input};
use layout::Layout;
use meshply_core::{ColoredPoint3d, Error, Point3d, PointCloud, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where the PLY bytes come from
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// Vertices of a PLY file, with colors when the file has them
#[derive(Debug, Clone, PartialEq)]
pub enum PlyVertices {
    Points(PointCloud<Point3d>),
    Colored(PointCloud<ColoredPoint3d>),
}

impl PlyVertices {
    pub fn len(&self) -> usize {
        match self {
            PlyVertices::Points(cloud) => cloud.len(),
            PlyVertices::Colored(cloud) => cloud.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the colors, if any
    pub fn into_points(self) -> PointCloud<Point3d> {
        match self {
            PlyVertices::Points(cloud) => cloud,
            PlyVertices::Colored(cloud) => cloud.into_iter().map(Point3d::from).collect(),
        }
    }
}

/// A PLY file whose header has been parsed and classified
#[derive(Debug, Clone)]
pub struct PlyReader {
    source: Source,
    header: Header,
    layout: Layout,
}

impl PlyReader {
    /// Open a PLY file and read its header
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let header = Header::parse(&mut BufReader::new(File::open(&path)?))?;
        Self::classify(Source::File(path), header)
    }

    /// Read the header of a PLY image held in memory
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let header = Header::parse(&mut Cursor::new(&bytes[..]))?;
        Self::classify(Source::Memory(bytes), header)
    }

    fn classify(source: Source, header: Header) -> Result<Self> {
        let layout = Layout::classify(&header.elements)?;
        debug!(
            format = header.format.keyword(),
            elements = header.elements.len(),
            vertices = layout.has_vertices(),
            colors = layout.has_vertex_colors(),
            faces = layout.has_faces(),
            "Classified PLY header"
        );
        Ok(Self {
            source,
            header,
            layout,
        })
    }

    /// Whether the file declares a usable `vertex` element
    pub fn has_vertices(&self) -> bool {
        self.layout.has_vertices()
    }

    /// Whether vertices carry `red`, `green` and `blue`
    pub fn has_vertex_colors(&self) -> bool {
        self.layout.has_vertex_colors()
    }

    /// Whether the file declares at least one face
    pub fn has_faces(&self) -> bool {
        self.layout.has_faces()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn format(&self) -> PlyFormat {
        self.header.format
    }

    pub fn elements(&self) -> &[Element] {
        &self.header.elements
    }

    /// Text of the `comment` lines in header order
    pub fn comments(&self) -> &[String] {
        &self.header.comments
    }

    /// Read all vertices, with colors if the file has them.
    ///
    /// Fails with [`Error::IllegalState`] unless [`PlyReader::has_vertices`].
    pub fn read_vertices(&self) -> Result<PlyVertices> {
        if self.has_vertex_colors() {
            return self.read_colored_vertices().map(PlyVertices::Colored);
        }
        if !self.has_vertices() {
            return Err(Error::IllegalState("No vertices".to_string()));
        }
        let geometry = self.read_body(Collect::Points)?;
        Ok(PlyVertices::Points(PointCloud::from_points(geometry.points)))
    }

    /// Read all vertices with their colors.
    ///
    /// Fails with [`Error::IllegalState`] unless [`PlyReader::has_vertex_colors`].
    pub fn read_colored_vertices(&self) -> Result<PointCloud<ColoredPoint3d>> {
        if !self.has_vertex_colors() {
            return Err(Error::IllegalState("No vertex colors".to_string()));
        }
        Ok(self.read_body(Collect::ColoredPoints)?.into_colored_points())
    }

    /// Read the indexed triangle mesh, splitting quads into two triangles.
    ///
    /// Fails with [`Error::IllegalState`] unless [`PlyReader::has_faces`].
    pub fn read_mesh(&self) -> Result<TriangleMesh> {
        if !self.has_faces() {
            return Err(Error::IllegalState("No faces".to_string()));
        }
        let geometry = self.read_body(Collect::Mesh)?;
        Ok(TriangleMesh::from_vertices_and_faces(
            geometry.points,
            geometry.faces,
        ))
    }

    fn read_body(&self, collect: Collect) -> Result<Geometry> {
        let mut input = self.open_input()?;
        let geometry = Assembly::new(&self.header, &self.layout, collect).run(input.as_mut())?;
        debug!(
            points = geometry.points.len(),
            triangles = geometry.faces.len(),
            "Read PLY body"
        );
        Ok(geometry)
    }

    /// A fresh decoder positioned after the header
    fn open_input(&self) -> Result<Box<dyn Input>> {
        match &self.source {
            Source::File(path) => self.decoder(File::open(path)?),
            Source::Memory(bytes) => self.decoder(Cursor::new(Arc::clone(bytes))),
        }
    }

    fn decoder<R: Read + 'static>(&self, channel: R) -> Result<Box<dyn Input>> {
        Ok(match self.header.format {
            PlyFormat::Ascii => Box::new(AsciiInput::new(BufReader::new(channel))?),
            PlyFormat::BinaryBigEndian => Box::new(BinaryInput::<_, BigEndian>::new(channel)?),
            PlyFormat::BinaryLittleEndian => {
                Box::new(BinaryInput::<_, LittleEndian>::new(channel)?)
            }
        })
    }
}

/// PLY handler for the format-agnostic reader and writer traits
pub struct Ply;

impl PointCloudReader for Ply {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3d>> {
        Ok(PlyReader::open(path)?.read_vertices()?.into_points())
    }
}

impl MeshReader for Ply {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let reader = PlyReader::open(path)?;
        if !reader.has_faces() {
            return Err(Error::format("No faces found"));
        }
        reader.read_mesh()
    }
}

impl PointCloudWriter for Ply {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<Point3d>, path: P) -> Result<()> {
        PlyWriter::default().write_points(cloud, None, path)
    }
}

impl MeshWriter for Ply {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        PlyWriter::default().write_mesh(mesh, None, path)
    }
}
