//! Body traversal
//!
//! Walks every element of the body in header order, collecting the values the
//! caller asked for and skipping the rest, then checks that nothing follows
//! the last element.

use super::header::{Element, Header, Property};
use super::input::Input;
use super::layout::{FaceLayout, Layout, Slot, VertexLayout};
use meshply_core::{ColoredPoint3d, Error, Point3d, PointCloud, Result, Rgb};
use tracing::trace;

/// Upper bound for preallocation; header counts are untrusted
const MAX_PREALLOCATION: usize = 1 << 20;

/// Which parts of the body to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collect {
    Points,
    ColoredPoints,
    Mesh,
}

/// Raw geometry gathered from a body
#[derive(Debug, Default)]
pub(crate) struct Geometry {
    pub points: Vec<Point3d>,
    /// Parallel to `points` when colors were collected, empty otherwise
    pub colors: Vec<Rgb>,
    pub faces: Vec<[usize; 3]>,
}

impl Geometry {
    /// Pair every point with its color.
    ///
    /// Only meaningful after a [`Collect::ColoredPoints`] run, which pushes
    /// exactly one color per point.
    pub fn into_colored_points(self) -> PointCloud<ColoredPoint3d> {
        debug_assert_eq!(self.points.len(), self.colors.len());
        self.points
            .into_iter()
            .zip(self.colors)
            .map(|(position, color)| ColoredPoint3d::new(position, color))
            .collect()
    }
}

pub(crate) struct Assembly<'a> {
    header: &'a Header,
    layout: &'a Layout,
    collect: Collect,
}

impl<'a> Assembly<'a> {
    pub fn new(header: &'a Header, layout: &'a Layout, collect: Collect) -> Self {
        Self {
            header,
            layout,
            collect,
        }
    }

    /// Consume the whole body from `input`
    pub fn run(&self, input: &mut dyn Input) -> Result<Geometry> {
        let mut geometry = Geometry::default();

        for (index, element) in self.header.elements.iter().enumerate() {
            match (&self.layout.vertex, &self.layout.face) {
                (Some(vertex), _) if vertex.element == index => {
                    self.read_vertices(input, element, vertex, &mut geometry)?;
                }
                (Some(vertex), Some(face))
                    if face.element == index && self.collect == Collect::Mesh =>
                {
                    read_faces(input, element, face, vertex.count, &mut geometry.faces)?;
                }
                _ => skip_element(input, element)?,
            }
        }

        input.expect_end()?;
        Ok(geometry)
    }

    fn read_vertices(
        &self,
        input: &mut dyn Input,
        element: &Element,
        vertex: &VertexLayout,
        geometry: &mut Geometry,
    ) -> Result<()> {
        let color_slots = match self.collect {
            Collect::ColoredPoints => vertex.color,
            _ => None,
        };
        let capacity = vertex.count.min(MAX_PREALLOCATION);
        geometry.points.reserve(capacity);
        if color_slots.is_some() {
            geometry.colors.reserve(capacity);
        }

        for _ in 0..vertex.count {
            let mut position = [0.0f64; 3];
            let mut color: Rgb = [0; 3];
            for (index, property) in element.properties.iter().enumerate() {
                if let Some((axis, slot)) = find_slot(&vertex.position, index) {
                    position[axis] = input.read(slot.ty)?.as_f64();
                } else if let Some((channel, slot)) =
                    color_slots.as_ref().and_then(|slots| find_slot(slots, index))
                {
                    color[channel] = color_component(input.read(slot.ty)?.as_i64())?;
                } else {
                    skip_property(input, property)?;
                }
            }
            geometry
                .points
                .push(Point3d::new(position[0], position[1], position[2]));
            if color_slots.is_some() {
                geometry.colors.push(color);
            }
        }
        Ok(())
    }
}

fn find_slot(slots: &[Slot; 3], index: usize) -> Option<(usize, Slot)> {
    slots
        .iter()
        .position(|slot| slot.index == index)
        .map(|which| (which, slots[which]))
}

fn color_component(value: i64) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::format(format!("Invalid color component: {}", value)))
}

fn read_faces(
    input: &mut dyn Input,
    element: &Element,
    face: &FaceLayout,
    vertex_count: usize,
    faces: &mut Vec<[usize; 3]>,
) -> Result<()> {
    faces.reserve(face.count.min(MAX_PREALLOCATION));
    for _ in 0..face.count {
        for (index, property) in element.properties.iter().enumerate() {
            if index == face.indices {
                read_face(input, face, vertex_count, faces)?;
            } else {
                skip_property(input, property)?;
            }
        }
    }
    Ok(())
}

/// Read one index list, splitting quads along the 0-2 diagonal
fn read_face(
    input: &mut dyn Input,
    face: &FaceLayout,
    vertex_count: usize,
    faces: &mut Vec<[usize; 3]>,
) -> Result<()> {
    let count = input.read(face.count_ty)?.as_i64();
    if count < 3 {
        return Err(Error::format(format!("Face with {} vertices", count)));
    }
    if count > 4 {
        return Err(Error::format("Cannot handle faces with more than 4 vertices"));
    }

    let mut corners = [0usize; 4];
    for corner in corners.iter_mut().take(count as usize) {
        let index = input.read(face.elem_ty)?.as_i64();
        *corner = usize::try_from(index)
            .ok()
            .filter(|&i| i < vertex_count)
            .ok_or_else(|| Error::format(format!("Invalid vertex index: {}", index)))?;
    }

    faces.push([corners[0], corners[1], corners[2]]);
    if count == 4 {
        faces.push([corners[0], corners[2], corners[3]]);
    }
    Ok(())
}

fn skip_element(input: &mut dyn Input, element: &Element) -> Result<()> {
    trace!(
        element = %element.name,
        count = element.count,
        "Skipping element"
    );
    for _ in 0..element.count {
        for property in &element.properties {
            skip_property(input, property)?;
        }
    }
    Ok(())
}

/// Consume one property value without interpreting it
pub(crate) fn skip_property(input: &mut dyn Input, property: &Property) -> Result<()> {
    match *property {
        Property::Scalar { ty, .. } => {
            input.read(ty)?;
        }
        Property::List {
            count_ty, elem_ty, ..
        } => {
            let count = input.read(count_ty)?.as_i64();
            if count < 0 {
                return Err(Error::format("List with negative number of elements"));
            }
            for _ in 0..count {
                input.read(elem_ty)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply::input::AsciiInput;
    use std::io::Cursor;

    fn run(text: &str, collect: Collect) -> Result<Geometry> {
        let header = Header::parse(&mut Cursor::new(text.as_bytes()))?;
        let layout = Layout::classify(&header.elements)?;
        let mut input = AsciiInput::new(Cursor::new(text.as_bytes()))?;
        Assembly::new(&header, &layout, collect).run(&mut input)
    }

    fn message(result: Result<Geometry>) -> String {
        match result {
            Err(Error::InvalidFormat(message)) => message,
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    const SQUARE: &str = "ply\n\
        format ascii 1.0\n\
        element vertex 4\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property uchar red\n\
        property uchar green\n\
        property uchar blue\n\
        element face 1\n\
        property list uchar int vertex_indices\n\
        end_header\n\
        0 0 0 255 0 0\n\
        1 0 0 0 255 0\n\
        1 1 0 0 0 255\n\
        0 1 0 9 9 9\n\
        4 0 1 2 3\n";

    #[test]
    fn test_points_skip_colors_and_faces() {
        let geometry = run(SQUARE, Collect::Points).unwrap();
        assert_eq!(geometry.points.len(), 4);
        assert_eq!(geometry.points[2], Point3d::new(1.0, 1.0, 0.0));
        assert!(geometry.colors.is_empty());
        assert!(geometry.faces.is_empty());
    }

    #[test]
    fn test_colored_points() {
        let geometry = run(SQUARE, Collect::ColoredPoints).unwrap();
        assert_eq!(geometry.colors.len(), geometry.points.len());
        assert_eq!(
            geometry.colors,
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [9, 9, 9]]
        );

        let cloud = geometry.into_colored_points();
        assert_eq!(cloud.len(), 4);
        assert_eq!(
            cloud[3],
            ColoredPoint3d::new(Point3d::new(0.0, 1.0, 0.0), [9, 9, 9])
        );
    }

    #[test]
    fn test_quad_is_fanned() {
        let geometry = run(SQUARE, Collect::Mesh).unwrap();
        assert_eq!(geometry.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_unknown_list_is_skipped() {
        let text = "ply\n\
            format ascii 1.0\n\
            element vertex 2\n\
            property list uchar float normals\n\
            property double x\n\
            property double y\n\
            property double z\n\
            element edge 1\n\
            property int a\n\
            property int b\n\
            end_header\n\
            3 0.1 0.2 0.3 1 2 3\n\
            0 4 5 6\n\
            0 1\n";
        let geometry = run(text, Collect::Points).unwrap();
        assert_eq!(
            geometry.points,
            vec![Point3d::new(1.0, 2.0, 3.0), Point3d::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn test_face_errors() {
        let mesh = |face: &str| {
            format!(
                "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n\
                 property float y\nproperty float z\nelement face 1\n\
                 property list char int vertex_indices\nend_header\n\
                 0 0 0\n1 0 0\n0 1 0\n{}\n",
                face
            )
        };
        assert_eq!(message(run(&mesh("2 0 1"), Collect::Mesh)), "Face with 2 vertices");
        assert_eq!(message(run(&mesh("-1"), Collect::Mesh)), "Face with -1 vertices");
        assert_eq!(
            message(run(&mesh("5 0 1 2 0 1"), Collect::Mesh)),
            "Cannot handle faces with more than 4 vertices"
        );
        assert_eq!(message(run(&mesh("3 0 1 3"), Collect::Mesh)), "Invalid vertex index: 3");
        assert_eq!(message(run(&mesh("3 0 -1 2"), Collect::Mesh)), "Invalid vertex index: -1");

        // Bad faces do not matter when only vertices are read
        assert_eq!(run(&mesh("3 0 1 3"), Collect::Points).unwrap().points.len(), 3);
    }

    #[test]
    fn test_negative_list_count() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                    property float y\nproperty float z\nproperty list char int extra\n\
                    end_header\n0 0 0 -2\n";
        assert_eq!(
            message(run(text, Collect::Points)),
            "List with negative number of elements"
        );
    }

    #[test]
    fn test_color_component_range() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                    property float y\nproperty float z\nproperty short red\n\
                    property short green\nproperty short blue\nend_header\n0 0 0 1 300 2\n";
        assert_eq!(
            message(run(text, Collect::ColoredPoints)),
            "Invalid color component: 300"
        );
        assert!(run(text, Collect::Points).is_ok());
    }

    #[test]
    fn test_trailing_data() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                    property float y\nproperty float z\nend_header\n1 2 3 4\n";
        assert_eq!(
            message(run(text, Collect::Points)),
            "Invalid file format: expected end of file, found 4"
        );
    }

    #[test]
    fn test_truncated_body() {
        let text = "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\n\
                    property float y\nproperty float z\nend_header\n1 2 3 4\n";
        assert_eq!(message(run(text, Collect::Points)), "Unexpected end of file");
    }
}
