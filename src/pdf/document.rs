//! Loading, flagging and saving form documents with lopdf

use std::path::Path;
use lopdf::{dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Read-only bit of a field's `/Ff` flags
const READ_ONLY_FLAG: i64 = 1;

/// Load a PDF document
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    log::info!("Loading {}", path.display());
    Ok(Document::load(path)?)
}

/// Save a document, creating or replacing `path`
pub fn save_document(doc: &mut Document, path: &Path) -> Result<()> {
    doc.save(path)?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// Page object ids in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Object id of the document catalog
fn catalog_id(doc: &Document) -> Result<ObjectId> {
    let root = doc.trailer.get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;

    match root {
        Object::Reference(id) => Ok(*id),
        _ => Err(Error::General("Root is not a reference".to_string())),
    }
}

/// Object id of the interactive form dictionary, if the catalog refers to one
fn acro_form_id(doc: &Document) -> Result<Option<ObjectId>> {
    let catalog = doc.get_dictionary(catalog_id(doc)?)?;

    match catalog.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Ok(Some(*id)),
        _ => Ok(None),
    }
}

/// Set `/NeedAppearances` in the interactive form dictionary
///
/// Viewers then rebuild field appearances from the field values instead of
/// showing the appearance streams cached in the template. The interactive
/// form dictionary is created if the catalog has none.
pub fn set_need_appearances(doc: &mut Document, value: bool) -> Result<()> {
    let catalog_id = catalog_id(doc)?;

    // A direct dictionary in the catalog is updated in place
    {
        let catalog = doc.get_dictionary_mut(catalog_id)?;
        if let Ok(Object::Dictionary(acro_form)) = catalog.get_mut(b"AcroForm") {
            acro_form.set("NeedAppearances", value);
            return Ok(());
        }
    }

    let acro_form_id = match acro_form_id(doc)? {
        Some(id) => id,
        None => {
            let id = doc.add_object(dictionary! { "Fields" => Vec::<Object>::new() });
            doc.get_dictionary_mut(catalog_id)?.set("AcroForm", id);
            id
        }
    };

    doc.get_dictionary_mut(acro_form_id)?.set("NeedAppearances", value);
    Ok(())
}

/// Follow one level of indirection
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Top-level field references of the interactive form
pub(crate) fn root_fields(doc: &Document) -> Result<Vec<Object>> {
    let catalog = doc.get_dictionary(catalog_id(doc)?)?;
    let acro_form = match catalog.get(b"AcroForm") {
        Ok(acro_form) => resolve(doc, acro_form),
        Err(_) => return Ok(Vec::new()),
    };

    let fields = acro_form
        .as_dict()
        .and_then(|form| form.get(b"Fields"))
        .map(|fields| resolve(doc, fields))
        .and_then(Object::as_array);

    Ok(fields.cloned().unwrap_or_default())
}

/// Flag every field of the interactive form as read-only
///
/// Returns the number of fields flagged.
pub fn set_fields_read_only(doc: &mut Document) -> Result<usize> {
    let mut pending: Vec<ObjectId> = root_fields(doc)?
        .iter()
        .filter_map(|field| field.as_reference().ok())
        .collect();
    let mut visited = std::collections::HashSet::new();
    let mut flagged = 0;

    while let Some(field_id) = pending.pop() {
        if !visited.insert(field_id) {
            continue;
        }

        let field = match doc.get_dictionary_mut(field_id) {
            Ok(field) => field,
            Err(_) => continue,
        };

        // Widgets without a name belong to their parent field
        if field.has(b"T") {
            let flags = field.get(b"Ff").and_then(Object::as_i64).unwrap_or(0);
            field.set("Ff", flags | READ_ONLY_FLAG);
            flagged += 1;
        }

        if let Ok(Object::Array(kids)) = field.get(b"Kids") {
            pending.extend(kids.iter().filter_map(|kid| kid.as_reference().ok()));
        }
    }

    log::debug!("Flagged {} fields as read-only", flagged);
    Ok(flagged)
}
