//! XML reading and writing for configuration documents.
//!
//! Parsing keeps qualified names and attribute order exactly as written.
//! Text directly inside an element is concatenated as written, then the
//! joined payload is trimmed at its edges only. Comments, processing
//! instructions and DOCTYPE declarations are dropped.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::element::{Document, Element};
use crate::error::{DocumentError, DocumentResult};

/// Indentation width used when writing documents
const INDENT: usize = 4;

/// Parse a document from an XML string.
pub fn parse_str(input: &str) -> DocumentResult<Document> {
    let mut reader = Reader::from_str(input);

    // Open elements, innermost last
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e.to_string()))?;

        match event {
            Event::Start(start) => {
                stack.push(open_element(&reader, &start)?);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                close_element(element, &mut stack, &mut root, &reader)?;
            }
            Event::End(end) => {
                let name = utf8(&reader, end.name().as_ref())?;
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(&reader, format!("unexpected </{}>", name)))?;
                if element.name != name {
                    return Err(xml_error(
                        &reader,
                        format!("expected </{}>, found </{}>", element.name, name),
                    ));
                }
                close_element(element, &mut stack, &mut root, &reader)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| xml_error(&reader, e.to_string()))?;
                push_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let text = utf8(&reader, &raw)?;
                push_text(&mut stack, &text);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DocumentError::UnexpectedEof(open.name));
    }

    let mut root = root.ok_or(DocumentError::NoRoot)?;
    trim_tree(&mut root);
    Ok(Document::from_root(root))
}

/// Serialize a document to an XML string with a declaration and
/// four-space indentation.
pub fn to_string(doc: &Document) -> DocumentResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    write_element(&mut writer, &doc.root)?;

    let mut out = String::from_utf8(writer.into_inner())
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Read and parse a document from disk.
pub fn read_file(path: &Path) -> DocumentResult<Document> {
    let contents = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
    parse_str(&contents)
}

/// Serialize a document and write it to disk, creating parent directories.
pub fn write_file(path: &Path, doc: &Document) -> DocumentResult<()> {
    let contents = to_string(doc)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DocumentError::io(parent, e))?;
        }
    }
    fs::write(path, contents).map_err(|e| DocumentError::io(path, e))
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> DocumentResult<Element> {
    let mut element = Element::new(utf8(reader, start.name().as_ref())?);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(reader, e.to_string()))?;
        let key = utf8(reader, attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(reader, e.to_string()))?;
        element.attributes.set(key, value.into_owned());
    }

    Ok(element)
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    reader: &Reader<&[u8]>,
) -> DocumentResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(xml_error(
                reader,
                format!("second root element <{}>", element.name),
            ))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) {
    // Text outside the root element is ignored
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

fn trim_tree(element: &mut Element) {
    let trimmed = element.text.trim();
    if trimmed.len() != element.text.len() {
        element.text = trimmed.to_string();
    }
    for child in &mut element.children {
        trim_tree(child);
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> DocumentResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in element.attributes.iter() {
        start.push_attribute((key, value));
    }

    if element.text.is_empty() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| DocumentError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    if !element.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(|e| DocumentError::Write(e.to_string()))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| DocumentError::Write(e.to_string()))
}

fn utf8(reader: &Reader<&[u8]>, bytes: &[u8]) -> DocumentResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| xml_error(reader, e.to_string()))
}

fn xml_error(reader: &Reader<&[u8]>, message: String) -> DocumentError {
    DocumentError::Xml {
        position: reader.buffer_position() as u64,
        message,
    }
}
