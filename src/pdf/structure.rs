//! Tab-indented dumps of the PDF object graph
//!
//! Each container (dictionary, array, stream) is written as its type name,
//! followed by its entries one tab further to the right:
//!
//! ```text
//! Dictionary
//! 	/Type: /Page <Name>
//! 	/Annots: Array
//! 		[0]: 12 0 R <Reference>
//! ```

use std::io::Write;
use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::Result;
use crate::pdf::document::{page_ids, root_fields};
use crate::pdf::text::{decode_text_string, name_to_string};

/// How much of the object graph to write
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureOptions {
    /// Append each leaf's type in angle brackets
    pub write_types: bool,
    /// Replace references with the objects they point to
    pub resolve_references: bool,
    /// Deepest container level to expand, 0 or less for no limit
    pub depth_limit: i32,
}

impl StructureOptions {
    /// Options used by the command line: references are only followed when
    /// a depth limit keeps the dump finite
    pub fn with_depth_limit(depth_limit: i32) -> Self {
        Self {
            write_types: true,
            resolve_references: depth_limit > 0,
            depth_limit,
        }
    }
}

/// Write the structure of `object` in `out`
pub fn write_object_structure<W: Write>(
    doc: &Document,
    object: &Object,
    out: &mut W,
    options: &StructureOptions,
) -> Result<()> {
    let mut path = Vec::new();
    let object = follow(doc, object, options, &mut path);

    if is_container(object) {
        writeln!(out, "{}", kind_name(object))?;
        write_entries(doc, object, out, options, 1, &mut path)?;
    } else {
        writeln!(out, "{}", leaf_text(object, options))?;
    }

    Ok(())
}

/// Write the structure of every page of `doc`
pub fn write_page_structures<W: Write>(
    doc: &Document,
    source: &Path,
    out: &mut W,
    options: &StructureOptions,
) -> Result<()> {
    writeln!(out, "Objects in the pages of {}", source.display())?;

    for (i, page_id) in page_ids(doc).into_iter().enumerate() {
        write!(out, "\n\nPAGE {}\n", i)?;
        write_object_structure(doc, &Object::Reference(page_id), out, options)?;
    }

    Ok(())
}

/// Write the structure of every top-level field of `doc`
pub fn write_field_structures<W: Write>(
    doc: &Document,
    source: &Path,
    out: &mut W,
    options: &StructureOptions,
) -> Result<()> {
    writeln!(out, "Objects in the fields of {}", source.display())?;

    for field in root_fields(doc)? {
        let name = doc
            .dereference(&field)
            .ok()
            .and_then(|(_, node)| node.as_dict().ok())
            .and_then(|node| node.get(b"T").and_then(Object::as_str).ok())
            .map(decode_text_string)
            .unwrap_or_else(|| "(unnamed)".to_string());

        write!(out, "\n{}\n", name)?;
        write_object_structure(doc, &field, out, options)?;
    }

    Ok(())
}

fn write_entries<W: Write>(
    doc: &Document,
    container: &Object,
    out: &mut W,
    options: &StructureOptions,
    depth: i32,
    path: &mut Vec<ObjectId>,
) -> Result<()> {
    let tabs = "\t".repeat(depth as usize);
    let next_depth = depth + 1;

    let entries: Vec<(String, &Object)> = match container {
        Object::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (format!("[{}]", i), item))
            .collect(),
        Object::Dictionary(dict) => dict
            .iter()
            .map(|(key, value)| (format!("/{}", name_to_string(key)), value))
            .collect(),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .map(|(key, value)| (format!("/{}", name_to_string(key)), value))
            .collect(),
        _ => Vec::new(),
    };

    for (label, item) in entries {
        if let Some(id) = cycle(item, options, path) {
            writeln!(out, "{}{}: <cycle to {} {} R>", tabs, label, id.0, id.1)?;
            continue;
        }

        let depth_before = path.len();
        let item = follow(doc, item, options, path);

        if is_container(item) {
            writeln!(out, "{}{}: {}", tabs, label, kind_name(item))?;

            if options.depth_limit <= 0 || next_depth <= options.depth_limit {
                write_entries(doc, item, out, options, next_depth, path)?;
            }
        } else {
            writeln!(out, "{}{}: {}", tabs, label, leaf_text(item, options))?;
        }

        path.truncate(depth_before);
    }

    if let Object::Stream(stream) = container {
        writeln!(out, "{}<{} content bytes>", tabs, stream.content.len())?;
    }

    Ok(())
}

/// Resolve a reference when asked to, remembering it on the current path
fn follow<'a>(doc: &'a Document, object: &'a Object, options: &StructureOptions, path: &mut Vec<ObjectId>) -> &'a Object {
    if !options.resolve_references {
        return object;
    }

    match object {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(target) => {
                path.push(*id);
                target
            }
            Err(_) => object,
        },
        _ => object,
    }
}

/// Reference that points back to an object being written
fn cycle(object: &Object, options: &StructureOptions, path: &[ObjectId]) -> Option<ObjectId> {
    match object {
        Object::Reference(id) if options.resolve_references && path.contains(id) => Some(*id),
        _ => None,
    }
}

fn is_container(object: &Object) -> bool {
    matches!(object, Object::Array(_) | Object::Dictionary(_) | Object::Stream(_))
}

fn kind_name(object: &Object) -> &'static str {
    match object {
        Object::Null => "Null",
        Object::Boolean(_) => "Boolean",
        Object::Integer(_) => "Integer",
        Object::Real(_) => "Real",
        Object::Name(_) => "Name",
        Object::String(..) => "String",
        Object::Array(_) => "Array",
        Object::Dictionary(_) => "Dictionary",
        Object::Stream(_) => "Stream",
        Object::Reference(_) => "Reference",
    }
}

fn leaf_text(object: &Object, options: &StructureOptions) -> String {
    let text = match object {
        Object::Null => "null".to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Integer(n) => n.to_string(),
        Object::Real(x) => x.to_string(),
        Object::Name(name) => format!("/{}", name_to_string(name)),
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Reference((number, generation)) => format!("{} {} R", number, generation),
        other => kind_name(other).to_string(),
    };

    if options.write_types {
        format!("{} <{}>", text, kind_name(object))
    } else {
        text
    }
}
