//! Writing field values into a page's annotations
//!
//! The page's `/Annots` array is the only entry point: it lists text fields
//! and checkboxes directly, but lists a radio button group as N anonymous kid
//! widgets that point back to the named parent field. The updater walks the
//! array once and resolves each radio button group through its parent the
//! first time one of its kids shows up, ignoring the remaining kids.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::form::field::{FieldKind, FieldValue, FieldValues};
use crate::form::registry::RadioGroupRegistry;
use crate::pdf::document::resolve;
use crate::pdf::text::{decode_text_string, encode_text_string, name_bytes};

/// Applies field values to pages, resolving radio button groups through
/// their registries
#[derive(Debug)]
pub struct FieldUpdater<'r> {
    registries: HashMap<&'r str, &'r RadioGroupRegistry>,
}

impl<'r> FieldUpdater<'r> {
    /// Create an updater that knows the given radio button groups
    pub fn new(registries: &'r [RadioGroupRegistry]) -> Self {
        let registries = registries
            .iter()
            .map(|registry| (registry.name(), registry))
            .collect();
        Self { registries }
    }

    /// Write `updates` into the fields of the page `page_id`
    ///
    /// Names that match no annotation are ignored. A radio button group is
    /// resolved at most once per call. An invalid radio button index aborts
    /// the call, leaving the fields already written in place.
    ///
    /// Returns the names of the fields written, in the order they were written.
    pub fn apply(&self, doc: &mut Document, page_id: ObjectId, updates: &FieldValues) -> Result<Vec<String>> {
        let mut resolved_groups: HashSet<String> = HashSet::new();
        let mut written = Vec::new();

        for annot_id in annotation_ids(doc, page_id)? {
            let node = match doc.get_dictionary(annot_id) {
                Ok(node) => node,
                Err(_) => continue,
            };

            match field_name(node) {
                Some(name) => {
                    if let Some(value) = updates.get(&name) {
                        let kind = FieldKind::classify(node);
                        if apply_direct(doc, annot_id, kind, &name, value) {
                            written.push(name);
                        }
                    }
                }
                None => {
                    let parent_id = match parent_id(node) {
                        Some(id) => id,
                        None => continue,
                    };
                    if let Some(group) = self.apply_to_group(doc, parent_id, updates, &mut resolved_groups)? {
                        written.push(group);
                    }
                }
            }
        }

        Ok(written)
    }

    /// Resolve the radio button group `parent_id` on behalf of one of its kids
    ///
    /// Returns the group name when its kids and value were written.
    fn apply_to_group(
        &self,
        doc: &mut Document,
        parent_id: ObjectId,
        updates: &FieldValues,
        resolved_groups: &mut HashSet<String>,
    ) -> Result<Option<String>> {
        let parent = match doc.get_dictionary(parent_id) {
            Ok(parent) => parent,
            Err(_) => return Ok(None),
        };
        let group = match field_name(parent) {
            Some(name) => name,
            None => return Ok(None),
        };
        let value = match updates.get(&group) {
            Some(value) => value,
            None => return Ok(None),
        };
        if resolved_groups.contains(&group) || FieldKind::classify(parent) != Some(FieldKind::RadioGroup) {
            return Ok(None);
        }

        let registry = match self.registries.get(group.as_str()) {
            Some(registry) => *registry,
            None => {
                if self.registries.is_empty() {
                    log::warn!("No radio button groups given, value for {} ignored", group);
                } else {
                    log::warn!("Radio button group {} is not registered, value ignored", group);
                }
                resolved_groups.insert(group);
                return Ok(None);
            }
        };

        let index = value.as_index().ok_or_else(|| Error::NotAnIndex {
            group: group.clone(),
            value: value.to_string(),
        })?;
        let position = registry.position(index)?;
        let identity = registry.get(index)?;

        let kid_id = match kid_id(doc, parent, position) {
            Some(id) => id,
            None => {
                log::warn!("Radio button group {} has no kid at position {}, value ignored", group, position);
                resolved_groups.insert(group);
                return Ok(None);
            }
        };

        let state = Object::Name(name_bytes(identity));

        // The selected kid shows the option, the parent value tells viewers
        // which kid is on.
        if let Ok(kid) = doc.get_dictionary_mut(kid_id) {
            kid.set("AS", state.clone());
        }
        if let Ok(parent) = doc.get_dictionary_mut(parent_id) {
            parent.set("V", state);
        }
        log::debug!("Set radio button group {} to {} (kid {})", group, identity, position);

        resolved_groups.insert(group.clone());
        Ok(Some(group))
    }
}

/// Write `updates` into the fields of the page `page_id`
///
/// Convenience wrapper around [`FieldUpdater`].
pub fn update_page_fields(
    doc: &mut Document,
    page_id: ObjectId,
    updates: &FieldValues,
    registries: &[RadioGroupRegistry],
) -> Result<Vec<String>> {
    FieldUpdater::new(registries).apply(doc, page_id, updates)
}

/// Write a text or checkbox value into a named annotation
///
/// Returns whether the annotation was written.
fn apply_direct(doc: &mut Document, annot_id: ObjectId, kind: Option<FieldKind>, name: &str, value: &FieldValue) -> bool {
    match kind {
        Some(FieldKind::TextField) => {
            if let Ok(node) = doc.get_dictionary_mut(annot_id) {
                node.set("V", encode_text_string(&value.to_string()));
                log::debug!("Set text field {} to {:?}", name, value.to_string());
                return true;
            }
        }
        Some(FieldKind::Checkbox) => {
            let state = name_bytes(&value.to_string());
            if !declares_state(doc, annot_id, &state) {
                log::warn!("Checkbox {} does not declare the state {}", name, value);
            }
            if let Ok(node) = doc.get_dictionary_mut(annot_id) {
                node.set("V", Object::Name(state.clone()));
                node.set("AS", Object::Name(state));
                log::debug!("Set checkbox {} to {}", name, value);
                return true;
            }
        }
        Some(FieldKind::RadioGroup) | None => {}
    }
    false
}

/// Object ids of the page's annotations, in page order
fn annotation_ids(doc: &Document, page_id: ObjectId) -> Result<Vec<ObjectId>> {
    let page = doc.get_dictionary(page_id)?;

    let annots = match page.get(b"Annots") {
        Ok(annots) => annots,
        Err(_) => return Ok(Vec::new()),
    };
    let annots = match resolve(doc, annots).as_array() {
        Ok(annots) => annots,
        Err(_) => return Ok(Vec::new()),
    };

    let mut ids = Vec::with_capacity(annots.len());
    for annot in annots {
        match annot {
            Object::Reference(id) => ids.push(*id),
            // Direct annotation dictionaries cannot be addressed for mutation
            _ => log::debug!("Skipping direct annotation on page {:?}", page_id),
        }
    }
    Ok(ids)
}

/// Own partial name (`/T`) of a field node
pub(crate) fn field_name(node: &Dictionary) -> Option<String> {
    node.get(b"T")
        .and_then(Object::as_str)
        .ok()
        .map(decode_text_string)
}

fn parent_id(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}

fn kid_id(doc: &Document, parent: &Dictionary, position: usize) -> Option<ObjectId> {
    let kids = parent.get(b"Kids").ok()?;
    let kids = resolve(doc, kids).as_array().ok()?;
    kids.get(position)?.as_reference().ok()
}

/// Whether the widget's normal appearance dictionary lists `state`
///
/// Widgets without an appearance dictionary are given the benefit of the doubt.
fn declares_state(doc: &Document, annot_id: ObjectId, state: &[u8]) -> bool {
    if state == b"Off" {
        return true;
    }

    let normal = doc
        .get_dictionary(annot_id)
        .and_then(|node| node.get(b"AP"))
        .map(|ap| resolve(doc, ap))
        .and_then(Object::as_dict)
        .and_then(|ap| ap.get(b"N"))
        .map(|n| resolve(doc, n));

    match normal {
        Ok(Object::Dictionary(states)) => states.has(state),
        Ok(Object::Stream(stream)) => stream.dict.has(state),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expense_form, field_value, snapshot, state_of};
    use lopdf::dictionary;

    fn payment_group() -> Vec<RadioGroupRegistry> {
        vec![RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque"]).unwrap()]
    }

    fn updates(entries: &[(&str, FieldValue)]) -> FieldValues {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_radio_group_selects_one_kid() {
        let mut form = expense_form();
        let registries = payment_group();

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(1))]), &registries).unwrap();

        assert_eq!(state_of(&form.doc, form.group_kids[1]), Some(name_bytes("Chèque")));
        assert_eq!(state_of(&form.doc, form.group_kids[0]), Some(b"Off".to_vec()));
        let parent = form.doc.get_dictionary(form.group_id).unwrap();
        assert_eq!(parent.get(b"V").unwrap().as_name().unwrap(), name_bytes("Chèque").as_slice());
    }

    #[test]
    fn test_radio_group_negative_index() {
        let mut form = expense_form();
        let registries = payment_group();

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(-2))]), &registries).unwrap();

        assert_eq!(state_of(&form.doc, form.group_kids[0]), Some(name_bytes("Dépôt")));
        assert_eq!(state_of(&form.doc, form.group_kids[1]), Some(b"Off".to_vec()));
    }

    #[test]
    fn test_radio_group_out_of_range() {
        let mut form = expense_form();
        let registries = payment_group();

        let err = update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(5))]), &registries)
            .unwrap_err();

        assert!(matches!(err, Error::IndexOutOfRange { .. }));
        let message = err.to_string();
        assert!(message.contains("Group4"));
        assert!(message.contains('5'));
    }

    #[test]
    fn test_radio_group_non_integer_value() {
        let mut form = expense_form();
        let registries = payment_group();

        let err = update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", "Chèque".into())]), &registries)
            .unwrap_err();

        assert!(matches!(err, Error::NotAnIndex { .. }));
    }

    #[test]
    fn test_earlier_fields_stay_written_after_failure() {
        let mut form = expense_form();
        let registries = payment_group();

        // "Name" comes before the group kids in the page's annotations
        let result = update_page_fields(
            &mut form.doc,
            form.page_id,
            &updates(&[("Name", "Dupré".into()), ("Group4", FieldValue::Integer(9))]),
            &registries,
        );

        assert!(result.is_err());
        assert_eq!(field_value(&form.doc, form.name_id).as_deref(), Some("Dupré"));
    }

    #[test]
    fn test_group_resolved_once_with_many_kids() {
        let mut form = expense_form();
        let page_id = form.page_id;
        let group_id = form.group_id;

        let third_kid = form.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => group_id,
            "AS" => "Off",
            "P" => page_id,
        });
        form.add_annotation(third_kid);
        if let Ok(Object::Array(kids)) = form.doc.get_dictionary_mut(group_id).unwrap().get_mut(b"Kids") {
            kids.push(Object::Reference(third_kid));
        }
        let registries = vec![RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque", "Virement"]).unwrap()];

        // Each of the three kids on the page leads back to the group
        let written = update_page_fields(&mut form.doc, page_id, &updates(&[("Group4", FieldValue::Integer(2))]), &registries)
            .unwrap();

        assert_eq!(written, vec!["Group4".to_string()]);
        assert_eq!(state_of(&form.doc, third_kid), Some(b"Virement".to_vec()));
        assert_eq!(state_of(&form.doc, form.group_kids[0]), Some(b"Off".to_vec()));
        assert_eq!(state_of(&form.doc, form.group_kids[1]), Some(b"Off".to_vec()));
    }

    #[test]
    fn test_written_fields_in_page_order() {
        let mut form = expense_form();
        let registries = payment_group();

        let written = update_page_fields(
            &mut form.doc,
            form.page_id,
            &updates(&[
                ("Group4", FieldValue::Integer(0)),
                ("Unknown", "x".into()),
                ("Boite1", FieldValue::name("Oui")),
                ("Name", "Dupré".into()),
            ]),
            &registries,
        )
        .unwrap();

        assert_eq!(written, vec!["Name", "Boite1", "Group4"]);
    }

    #[test]
    fn test_skipped_group_is_not_reported() {
        let mut form = expense_form();

        let written = update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(1))]), &[])
            .unwrap();

        assert!(written.is_empty());
    }

    #[test]
    fn test_radio_group_ignored_without_registries() {
        let mut form = expense_form();
        let before = snapshot(&form.doc);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(1))]), &[]).unwrap();

        assert_eq!(snapshot(&form.doc), before);
    }

    #[test]
    fn test_unregistered_group_is_skipped() {
        let mut form = expense_form();
        let registries = vec![RadioGroupRegistry::new("Group1", ["Choix1", "Choix2"]).unwrap()];
        let before = snapshot(&form.doc);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(1))]), &registries).unwrap();

        assert_eq!(snapshot(&form.doc), before);
    }

    #[test]
    fn test_text_field_update() {
        let mut form = expense_form();
        let before = snapshot(&form.doc);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Name", "Dupré".into())]), &payment_group())
            .unwrap();

        assert_eq!(field_value(&form.doc, form.name_id).as_deref(), Some("Dupré"));
        for (id, object) in snapshot(&form.doc) {
            if id != form.name_id {
                assert_eq!(Some(&object), before.get(&id), "object {:?} was modified", id);
            }
        }
    }

    #[test]
    fn test_numbers_are_written_as_text() {
        let mut form = expense_form();

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Name", FieldValue::Real(12.5))]), &[]).unwrap();

        assert_eq!(field_value(&form.doc, form.name_id).as_deref(), Some("12.5"));
    }

    #[test]
    fn test_checkbox_update() {
        let mut form = expense_form();

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Boite1", FieldValue::name("/Oui"))]), &[])
            .unwrap();

        assert_eq!(state_of(&form.doc, form.checkbox_id), Some(b"Oui".to_vec()));
        let node = form.doc.get_dictionary(form.checkbox_id).unwrap();
        assert_eq!(node.get(b"V").unwrap().as_name().unwrap(), b"Oui");
        assert_eq!(field_value(&form.doc, form.name_id), None);
    }

    #[test]
    fn test_checkbox_state_is_not_validated() {
        let mut form = expense_form();

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Boite1", FieldValue::name("Peut-être"))]), &[])
            .unwrap();

        assert_eq!(state_of(&form.doc, form.checkbox_id), Some(name_bytes("Peut-être")));
    }

    #[test]
    fn test_unknown_name_changes_nothing() {
        let mut form = expense_form();
        let before = snapshot(&form.doc);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Unknown", "x".into())]), &payment_group())
            .unwrap();

        assert_eq!(snapshot(&form.doc), before);
    }

    #[test]
    fn test_named_unsupported_field_is_inert() {
        let mut form = expense_form();
        let choice_id = form.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Ch",
            "T" => Object::string_literal("Province"),
        });
        form.add_annotation(choice_id);
        let before = snapshot(&form.doc);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Province", "QC".into())]), &[]).unwrap();

        assert_eq!(snapshot(&form.doc), before);
    }

    #[test]
    fn test_kid_without_parent_is_skipped() {
        let mut form = expense_form();
        let orphan_id = form.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "AS" => "Off",
        });
        form.add_annotation(orphan_id);

        update_page_fields(&mut form.doc, form.page_id, &updates(&[("Group4", FieldValue::Integer(1))]), &payment_group())
            .unwrap();

        assert_eq!(state_of(&form.doc, orphan_id), Some(b"Off".to_vec()));
        assert_eq!(state_of(&form.doc, form.group_kids[1]), Some(name_bytes("Chèque")));
    }

    #[test]
    fn test_page_without_annotations() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });

        update_page_fields(&mut doc, page_id, &updates(&[("Name", "x".into())]), &payment_group()).unwrap();
    }
}
