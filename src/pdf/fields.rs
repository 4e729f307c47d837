//! Listing a document's form fields
//!
//! These are debugging aids for template authors: they show which field
//! names a template declares and what the fields currently contain.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::form::{update_page_fields, FieldValue, FieldValues};
use crate::pdf::document::{load_document, page_ids, resolve, root_fields, save_document, set_need_appearances};
use crate::pdf::text::{decode_text_string, name_to_string};

/// Simplified view of one form field
#[derive(Debug, Clone, PartialEq)]
pub struct PdfField {
    /// Fully qualified name, parent names joined with `.`
    pub name: String,
    /// Field type tag such as `/Tx` or `/Btn`, inherited from ancestors
    pub field_type: Option<String>,
    /// Current value, as text
    pub value: Option<String>,
}

impl PdfField {
    /// Last component of the qualified name, the field's own `/T`
    pub fn partial_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for PdfField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.name,
            self.field_type.as_deref().unwrap_or("None"),
            self.value.as_deref().unwrap_or("None"),
        )
    }
}

/// List the fields of the document's interactive form
///
/// Fields are listed depth-first, parents before their kids. Unnamed widgets
/// are not listed, they are part of their parent field.
pub fn list_fields(doc: &Document) -> Result<Vec<PdfField>> {
    let mut fields = Vec::new();
    let mut visited = HashSet::new();

    for field in root_fields(doc)? {
        collect_fields(doc, &field, None, None, &mut visited, &mut fields);
    }

    Ok(fields)
}

fn collect_fields(
    doc: &Document,
    object: &Object,
    parent_name: Option<&str>,
    inherited_type: Option<&str>,
    visited: &mut HashSet<ObjectId>,
    fields: &mut Vec<PdfField>,
) {
    if let Object::Reference(id) = object {
        if !visited.insert(*id) {
            return;
        }
    }

    let node = match resolve(doc, object).as_dict() {
        Ok(node) => node,
        Err(_) => return,
    };

    let field_type = node
        .get(b"FT")
        .and_then(Object::as_name)
        .ok()
        .map(|name| format!("/{}", name_to_string(name)))
        .or_else(|| inherited_type.map(str::to_string));

    let partial_name = node.get(b"T").and_then(Object::as_str).ok().map(decode_text_string);
    let name = match (&partial_name, parent_name) {
        (Some(partial), Some(parent)) => Some(format!("{}.{}", parent, partial)),
        (Some(partial), None) => Some(partial.clone()),
        (None, parent) => parent.map(str::to_string),
    };

    if let (Some(_), Some(name)) = (&partial_name, &name) {
        fields.push(PdfField {
            name: name.clone(),
            field_type: field_type.clone(),
            value: node.get(b"V").ok().map(|value| object_to_text(resolve(doc, value))),
        });
    }

    if let Ok(kids) = node.get(b"Kids").map(|kids| resolve(doc, kids)).and_then(Object::as_array) {
        for kid in kids {
            collect_fields(doc, kid, name.as_deref(), field_type.as_deref(), visited, fields);
        }
    }
}

/// Human readable value of a field
fn object_to_text(object: &Object) -> String {
    match object {
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Name(name) => format!("/{}", name_to_string(name)),
        Object::Integer(n) => n.to_string(),
        Object::Real(x) => x.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Array(items) => {
            let items: Vec<String> = items.iter().map(object_to_text).collect();
            format!("[{}]", items.join(", "))
        }
        Object::Null => "None".to_string(),
        other => format!("{:?}", other),
    }
}

/// Names of the document's text fields
pub fn text_field_names(doc: &Document) -> Result<Vec<String>> {
    Ok(list_fields(doc)?
        .into_iter()
        .filter(|field| field.field_type.as_deref() == Some("/Tx"))
        .map(|field| field.name)
        .collect())
}

/// Write a description of every field of `input` in the text file `output`
///
/// Returns the number of fields written.
pub fn write_field_values(input: &Path, output: &Path) -> Result<usize> {
    let doc = load_document(input)?;
    let fields = list_fields(&doc)?;

    if fields.is_empty() {
        return Err(Error::NoFields(input.to_path_buf()));
    }

    let lines: Vec<String> = fields.iter().map(ToString::to_string).collect();
    let text = format!("Fields in file {}\n\n{}", input.display(), lines.join("\n"));
    std::fs::write(output, text)?;

    Ok(fields.len())
}

/// Copy `input` to `output`, writing each text field's name in the field
///
/// Filling a template with its own field names shows where each name lands
/// on the page. Returns the number of text fields written.
pub fn write_field_names(input: &Path, output: &Path) -> Result<usize> {
    let mut doc = load_document(input)?;
    let fields = list_fields(&doc)?;

    if fields.is_empty() {
        return Err(Error::NoFields(input.to_path_buf()));
    }

    // Annotations are matched on their own name, not on the qualified one
    let updates: FieldValues = fields
        .iter()
        .filter(|field| field.field_type.as_deref() == Some("/Tx"))
        .map(|field| (field.partial_name().to_string(), FieldValue::Text(field.name.clone())))
        .collect();

    for page_id in page_ids(&doc) {
        update_page_fields(&mut doc, page_id, &updates, &[])?;
    }

    set_need_appearances(&mut doc, true)?;
    save_document(&mut doc, output)?;

    Ok(updates.len())
}
