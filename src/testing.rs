//! Small AcroForm documents for unit tests

use lopdf::{dictionary, Document, Object, ObjectId};

use crate::pdf::text::{decode_text_string, name_bytes};

/// One-page form with a text field, a checkbox and a two-option radio group
pub struct ExpenseForm {
    pub doc: Document,
    pub page_id: ObjectId,
    pub name_id: ObjectId,
    pub checkbox_id: ObjectId,
    pub group_id: ObjectId,
    pub group_kids: Vec<ObjectId>,
}

impl ExpenseForm {
    /// Append an annotation reference to the page
    pub fn add_annotation(&mut self, annot_id: ObjectId) {
        let page = self.doc.get_dictionary_mut(self.page_id).unwrap();
        if let Ok(Object::Array(annots)) = page.get_mut(b"Annots") {
            annots.push(Object::Reference(annot_id));
        }
    }
}

/// Build the test form
///
/// Page annotations are, in order: `Name`, `Boite1`, then the two kids of
/// `Group4` (`Dépôt`, `Chèque`).
pub fn expense_form() -> ExpenseForm {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();
    let group_id = doc.new_object_id();

    let name_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("Name"),
        "P" => page_id,
    });

    let checkbox_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal("Boite1"),
        "V" => "Off",
        "AS" => "Off",
        "AP" => dictionary! {
            "N" => dictionary! {
                "Oui" => Object::Null,
                "Off" => Object::Null,
            },
        },
        "P" => page_id,
    });

    let mut group_kids = Vec::new();
    for option in ["Dépôt", "Chèque"] {
        let on_state = name_bytes(option);
        let kid_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => group_id,
            "AS" => "Off",
            "AP" => dictionary! {
                "N" => Object::Dictionary(dictionary! {
                    on_state => Object::Null,
                    "Off" => Object::Null,
                }),
            },
            "P" => page_id,
        });
        group_kids.push(kid_id);
    }

    doc.objects.insert(
        group_id,
        Object::Dictionary(dictionary! {
            "FT" => "Btn",
            "Ff" => Object::Integer(49152),
            "T" => Object::string_literal("Group4"),
            "V" => "Off",
            "Kids" => group_kids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
        }),
    );

    let annots: Vec<Object> = [name_id, checkbox_id]
        .iter()
        .chain(group_kids.iter())
        .map(|&id| Object::Reference(id))
        .collect();

    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            "Annots" => annots,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let acro_form_id = doc.add_object(dictionary! {
        "Fields" => vec![
            Object::Reference(name_id),
            Object::Reference(checkbox_id),
            Object::Reference(group_id),
        ],
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acro_form_id,
    });
    doc.trailer.set("Root", catalog_id);

    ExpenseForm {
        doc,
        page_id,
        name_id,
        checkbox_id,
        group_id,
        group_kids,
    }
}

/// Appearance state bytes of a widget
pub fn state_of(doc: &Document, id: ObjectId) -> Option<Vec<u8>> {
    let node = doc.get_dictionary(id).ok()?;
    node.get(b"AS").and_then(Object::as_name).ok().map(<[u8]>::to_vec)
}

/// Decoded `/V` text of a field
pub fn field_value(doc: &Document, id: ObjectId) -> Option<String> {
    let node = doc.get_dictionary(id).ok()?;
    node.get(b"V").and_then(Object::as_str).ok().map(decode_text_string)
}

/// Comparable rendering of every object in the document
pub fn snapshot(doc: &Document) -> std::collections::BTreeMap<ObjectId, String> {
    doc.objects
        .iter()
        .map(|(id, object)| (*id, format!("{:?}", object)))
        .collect()
}
