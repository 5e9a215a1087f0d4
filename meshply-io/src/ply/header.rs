//! PLY header model and parser

use super::types::ScalarType;
use meshply_core::{Error, Result};
use std::io::BufRead;
use std::str::SplitWhitespace;
use tracing::debug;

/// Body encoding declared by the `format` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl PlyFormat {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ascii" => Some(PlyFormat::Ascii),
            "binary_big_endian" => Some(PlyFormat::BinaryBigEndian),
            "binary_little_endian" => Some(PlyFormat::BinaryLittleEndian),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
        }
    }

    pub fn is_binary(self) -> bool {
        self != PlyFormat::Ascii
    }
}

/// A named field of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// A single value per record
    Scalar { name: String, ty: ScalarType },
    /// A count of type `count_ty` followed by that many `elem_ty` values
    List {
        name: String,
        count_ty: ScalarType,
        elem_ty: ScalarType,
    },
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::Scalar { name, .. } | Property::List { name, .. } => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Property::List { .. })
    }
}

/// A record type declared by an `element` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    pub fn new<S: Into<String>>(name: S, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            properties: Vec::new(),
        }
    }
}

/// Parsed PLY header
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub format: PlyFormat,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
    pub elements: Vec<Element>,
}

/// The literal line that ends the header
pub(crate) const END_HEADER: &str = "end_header";

impl Header {
    /// Parse a header, leaving `reader` positioned at the first byte of the body
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut line = String::new();

        if !read_header_line(reader, &mut line)? || line != "ply" {
            return Err(Error::format("File is not in PLY format"));
        }

        let mut format: Option<(String, String)> = None;
        let mut comments = Vec::new();
        let mut obj_info = Vec::new();
        let mut elements: Vec<Element> = Vec::new();

        loop {
            if !read_header_line(reader, &mut line)? {
                return Err(Error::format("Unexpected end of file"));
            }
            let mut words = line.split_whitespace();
            let keyword = words
                .next()
                .ok_or_else(|| Error::format("Empty line in header"))?;

            match keyword {
                "comment" => comments.push(rest_of_line(&line, keyword).to_string()),
                "obj_info" => obj_info.push(rest_of_line(&line, keyword).to_string()),
                "format" => {
                    if format.is_some() {
                        return Err(Error::format("Multiple format lines in header"));
                    }
                    let [name, version] = exact_words::<2>(&mut words, keyword)?;
                    format = Some((name.to_string(), version.to_string()));
                }
                "element" => {
                    let [name, count] = exact_words::<2>(&mut words, keyword)?;
                    elements.push(Element::new(name, parse_element_count(name, count)?));
                }
                "property" => {
                    let element = elements
                        .last_mut()
                        .ok_or_else(|| Error::format("Property without element"))?;
                    let words: Vec<&str> = words.collect();
                    element.properties.push(parse_property(&words)?);
                }
                END_HEADER => {
                    // The body decoders look for this exact line
                    if line != END_HEADER {
                        return Err(invalid_line(keyword));
                    }
                    break;
                }
                other => {
                    return Err(Error::format(format!(
                        "Unrecognized keyword in header: {}",
                        other
                    )));
                }
            }
        }

        let (name, version) =
            format.ok_or_else(|| Error::format("No format specification found in header"))?;
        if version != "1.0" {
            return Err(Error::format(format!("Unknown format version: {}", version)));
        }
        let format = PlyFormat::from_keyword(&name)
            .ok_or_else(|| Error::format(format!("Invalid format: {}", name)))?;

        debug!(
            format = format.keyword(),
            elements = elements.len(),
            "parsed PLY header"
        );

        Ok(Self {
            format,
            comments,
            obj_info,
            elements,
        })
    }

    /// Find an element by name
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Read one header line into `line` without its terminator.
///
/// Returns `false` at end of input.
pub(crate) fn read_header_line<R: BufRead>(reader: &mut R, line: &mut String) -> Result<bool> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(false);
    }
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    line.clear();
    line.push_str(
        std::str::from_utf8(&bytes)
            .map_err(|_| Error::format("Header contains non-text data"))?,
    );
    Ok(true)
}

fn rest_of_line<'a>(line: &'a str, keyword: &str) -> &'a str {
    line.trim_start()[keyword.len()..].trim()
}

fn invalid_line(keyword: &str) -> Error {
    Error::format(format!("Invalid {} line in header", keyword))
}

/// Take exactly `N` more words, failing on missing or trailing ones
fn exact_words<'a, const N: usize>(
    words: &mut SplitWhitespace<'a>,
    keyword: &str,
) -> Result<[&'a str; N]> {
    let mut out = [""; N];
    for slot in out.iter_mut() {
        *slot = words.next().ok_or_else(|| invalid_line(keyword))?;
    }
    if words.next().is_some() {
        return Err(invalid_line(keyword));
    }
    Ok(out)
}

fn parse_element_count(name: &str, count: &str) -> Result<usize> {
    let count: i64 = count
        .parse()
        .map_err(|_| Error::format(format!("Invalid instance count for element {}: {}", name, count)))?;
    if count < 0 {
        return Err(Error::format(format!("Element {} has negative instances", name)));
    }
    usize::try_from(count)
        .map_err(|_| Error::format(format!("Element {} has too many instances", name)))
}

fn parse_type(keyword: &str) -> Result<ScalarType> {
    ScalarType::from_keyword(keyword)
        .ok_or_else(|| Error::format(format!("Unrecognized type: {}", keyword)))
}

fn parse_property(words: &[&str]) -> Result<Property> {
    match *words {
        ["list", count_ty, elem_ty, name] => {
            let count_ty = parse_type(count_ty)?;
            if !count_ty.is_integral() {
                return Err(Error::format("List element count type must be integral"));
            }
            Ok(Property::List {
                name: name.to_string(),
                count_ty,
                elem_ty: parse_type(elem_ty)?,
            })
        }
        ["list", ..] => Err(invalid_line("property")),
        [ty, name] => Ok(Property::Scalar {
            name: name.to_string(),
            ty: parse_type(ty)?,
        }),
        _ => Err(invalid_line("property")),
    }
}
