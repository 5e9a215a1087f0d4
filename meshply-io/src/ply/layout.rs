//! Element classification
//!
//! Locates the `vertex` and `face` elements in a parsed header and the
//! property slots the readers care about. Everything else in the file is
//! skipped during traversal.

use super::header::{Element, Property};
use super::types::ScalarType;
use meshply_core::{Error, Result};

/// Position and type of a scalar property within its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub index: usize,
    pub ty: ScalarType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VertexLayout {
    /// Index of the vertex element in the header
    pub element: usize,
    pub count: usize,
    /// `x`, `y`, `z`
    pub position: [Slot; 3],
    /// `red`, `green`, `blue`, present only as a complete triple
    pub color: Option<[Slot; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FaceLayout {
    /// Index of the face element in the header
    pub element: usize,
    pub count: usize,
    /// Index of the `vertex_indices` property
    pub indices: usize,
    pub count_ty: ScalarType,
    pub elem_ty: ScalarType,
}

/// What a header offers to the readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    pub vertex: Option<VertexLayout>,
    /// Only present when the face element has at least one instance
    pub face: Option<FaceLayout>,
}

const VERTEX_FIELDS: [&str; 6] = ["x", "y", "z", "red", "green", "blue"];

impl Layout {
    pub fn classify(elements: &[Element]) -> Result<Self> {
        let mut vertex = None;
        let mut face = None;

        for (index, element) in elements.iter().enumerate() {
            match element.name.as_str() {
                "vertex" => {
                    if vertex.is_some() {
                        return Err(Error::format("Multiple vertex elements"));
                    }
                    vertex = Some(classify_vertex(index, element)?);
                }
                "face" => {
                    if face.is_some() {
                        return Err(Error::format("Multiple face elements"));
                    }
                    face = Some((index, element, find_face_indices(element)?));
                }
                _ => {}
            }
        }

        let face = match face {
            Some((index, element, indices)) if element.count > 0 => {
                if vertex.is_none() {
                    return Err(Error::format("Faces without vertices"));
                }
                let (indices, count_ty, elem_ty) = indices
                    .ok_or_else(|| Error::format("No face.vertex_indices property found"))?;
                Some(FaceLayout {
                    element: index,
                    count: element.count,
                    indices,
                    count_ty,
                    elem_ty,
                })
            }
            _ => None,
        };

        Ok(Self { vertex, face })
    }

    pub fn has_vertices(&self) -> bool {
        self.vertex.is_some()
    }

    pub fn has_vertex_colors(&self) -> bool {
        self.vertex.as_ref().map_or(false, |v| v.color.is_some())
    }

    pub fn has_faces(&self) -> bool {
        self.face.is_some()
    }
}

fn classify_vertex(element_index: usize, element: &Element) -> Result<VertexLayout> {
    let mut slots: [Option<Slot>; 6] = [None; 6];

    for (index, property) in element.properties.iter().enumerate() {
        let Some(field) = VERTEX_FIELDS.iter().position(|&f| f == property.name()) else {
            continue;
        };
        let ty = match property {
            Property::Scalar { ty, .. } => *ty,
            Property::List { .. } => {
                return Err(Error::format(format!(
                    "Invalid vertex.{} property",
                    VERTEX_FIELDS[field]
                )))
            }
        };
        if slots[field].is_some() {
            return Err(Error::format(format!(
                "Multiple vertex.{} properties",
                VERTEX_FIELDS[field]
            )));
        }
        slots[field] = Some(Slot { index, ty });
    }

    let mut position = [Slot {
        index: 0,
        ty: ScalarType::Float,
    }; 3];
    for (axis, slot) in position.iter_mut().enumerate() {
        *slot = slots[axis].ok_or_else(|| {
            Error::format(format!("No vertex.{} property found", VERTEX_FIELDS[axis]))
        })?;
    }

    let color = match (slots[3], slots[4], slots[5]) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        (None, None, None) => None,
        _ => return Err(Error::format("Incomplete vertex color")),
    };

    Ok(VertexLayout {
        element: element_index,
        count: element.count,
        position,
        color,
    })
}

/// Validate the `vertex_indices` properties of a face element
fn find_face_indices(element: &Element) -> Result<Option<(usize, ScalarType, ScalarType)>> {
    let mut found = None;
    for (index, property) in element.properties.iter().enumerate() {
        if property.name() != "vertex_indices" {
            continue;
        }
        let (count_ty, elem_ty) = match property {
            Property::List {
                count_ty, elem_ty, ..
            } => (*count_ty, *elem_ty),
            Property::Scalar { .. } => {
                return Err(Error::format("Face.vertex_indices property is not a list"))
            }
        };
        if !elem_ty.is_integral() {
            return Err(Error::format("Face vertex indices must be integral"));
        }
        if found.is_some() {
            return Err(Error::format("Multiple face.vertex_indices properties"));
        }
        found = Some((index, count_ty, elem_ty));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(name: &str, ty: ScalarType) -> Property {
        Property::Scalar {
            name: name.to_string(),
            ty,
        }
    }

    fn list(name: &str, count_ty: ScalarType, elem_ty: ScalarType) -> Property {
        Property::List {
            name: name.to_string(),
            count_ty,
            elem_ty,
        }
    }

    fn element(name: &str, count: usize, properties: Vec<Property>) -> Element {
        Element {
            properties,
            ..Element::new(name, count)
        }
    }

    fn xyz() -> Vec<Property> {
        vec![
            scalar("x", ScalarType::Float),
            scalar("y", ScalarType::Float),
            scalar("z", ScalarType::Float),
        ]
    }

    fn faces(count: usize) -> Element {
        element(
            "face",
            count,
            vec![list("vertex_indices", ScalarType::UChar, ScalarType::Int)],
        )
    }

    fn message(elements: &[Element]) -> String {
        match Layout::classify(elements) {
            Err(Error::InvalidFormat(message)) => message,
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_vertices() {
        let layout = Layout::classify(&[element("vertex", 8, xyz())]).unwrap();
        assert!(layout.has_vertices());
        assert!(!layout.has_vertex_colors());
        assert!(!layout.has_faces());
        let vertex = layout.vertex.unwrap();
        assert_eq!(vertex.count, 8);
        assert_eq!(vertex.position[2].index, 2);
    }

    #[test]
    fn test_slots_follow_declaration_order() {
        let mut properties = vec![
            scalar("blue", ScalarType::UChar),
            scalar("nx", ScalarType::Float),
        ];
        properties.extend(xyz().into_iter().rev());
        properties.push(scalar("green", ScalarType::UChar));
        properties.push(scalar("red", ScalarType::UChar));
        let layout = Layout::classify(&[
            element("material", 1, vec![]),
            element("vertex", 3, properties),
        ])
        .unwrap();

        let vertex = layout.vertex.unwrap();
        assert_eq!(vertex.element, 1);
        let position: Vec<usize> = vertex.position.iter().map(|s| s.index).collect();
        assert_eq!(position, vec![4, 3, 2]);
        let color: Vec<usize> = vertex.color.unwrap().iter().map(|s| s.index).collect();
        assert_eq!(color, vec![6, 5, 0]);
    }

    #[test]
    fn test_faces_need_instances() {
        let layout = Layout::classify(&[element("vertex", 3, xyz()), faces(0)]).unwrap();
        assert!(!layout.has_faces());

        let layout = Layout::classify(&[faces(1), element("vertex", 3, xyz())]).unwrap();
        let face = layout.face.unwrap();
        assert_eq!(face.element, 0);
        assert_eq!(face.count_ty, ScalarType::UChar);
        assert_eq!(face.elem_ty, ScalarType::Int);
    }

    #[test]
    fn test_empty_face_element_needs_no_indices() {
        let layout = Layout::classify(&[
            element("vertex", 3, xyz()),
            element("face", 0, vec![scalar("flags", ScalarType::Int)]),
        ])
        .unwrap();
        assert!(!layout.has_faces());
    }

    #[test]
    fn test_vertex_errors() {
        let vertex = element("vertex", 1, xyz());
        assert_eq!(message(&[vertex.clone(), vertex]), "Multiple vertex elements");

        let mut properties = xyz();
        properties.push(list("x", ScalarType::UChar, ScalarType::Float));
        assert_eq!(
            message(&[element("vertex", 1, properties)]),
            "Invalid vertex.x property"
        );

        let mut properties = xyz();
        properties.push(scalar("y", ScalarType::Double));
        assert_eq!(
            message(&[element("vertex", 1, properties)]),
            "Multiple vertex.y properties"
        );

        assert_eq!(
            message(&[element("vertex", 1, xyz()[..2].to_vec())]),
            "No vertex.z property found"
        );

        let mut properties = xyz();
        properties.push(scalar("red", ScalarType::UChar));
        properties.push(scalar("green", ScalarType::UChar));
        assert_eq!(
            message(&[element("vertex", 1, properties)]),
            "Incomplete vertex color"
        );
    }

    #[test]
    fn test_face_errors() {
        let vertex = element("vertex", 3, xyz());
        assert_eq!(
            message(&[vertex.clone(), faces(1), faces(1)]),
            "Multiple face elements"
        );
        assert_eq!(
            message(&[
                vertex.clone(),
                element("face", 1, vec![scalar("vertex_indices", ScalarType::Int)])
            ]),
            "Face.vertex_indices property is not a list"
        );
        assert_eq!(
            message(&[
                vertex.clone(),
                element(
                    "face",
                    1,
                    vec![list("vertex_indices", ScalarType::UChar, ScalarType::Float)]
                )
            ]),
            "Face vertex indices must be integral"
        );
        assert_eq!(
            message(&[
                vertex.clone(),
                element(
                    "face",
                    1,
                    vec![
                        list("vertex_indices", ScalarType::UChar, ScalarType::Int),
                        list("vertex_indices", ScalarType::UChar, ScalarType::UInt),
                    ]
                )
            ]),
            "Multiple face.vertex_indices properties"
        );
        assert_eq!(message(&[faces(2)]), "Faces without vertices");
        assert_eq!(
            message(&[
                vertex,
                element("face", 2, vec![scalar("flags", ScalarType::Int)])
            ]),
            "No face.vertex_indices property found"
        );
    }
}
