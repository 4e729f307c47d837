//! Expense Report Filler Library
//!
//! Fills the form fields of a PDF expense report template from a YAML field
//! setting file. This library provides functionality to:
//! - Write text, checkbox and radio button values into a page's fields
//! - Translate radio button choices between option indices and names
//! - Read field setting files and compute the report's totals
//! - List a document's fields and dump its object structure for debugging
//!
//! # Example
//!
//! ```no_run
//! use expense_report_filler::form::{update_page_fields, FieldValue, FieldValues, RadioGroupRegistry};
//! use expense_report_filler::pdf::{load_document, page_ids, save_document, set_need_appearances};
//! use std::path::Path;
//!
//! let mut doc = load_document(Path::new("rapport_depenses.pdf")).unwrap();
//! let groups = vec![RadioGroupRegistry::new("Group4", ["Dépôt", "Chèque"]).unwrap()];
//!
//! let mut values = FieldValues::new();
//! values.insert("Nom".to_string(), FieldValue::from("Tremblay"));
//! values.insert("Group4".to_string(), FieldValue::Integer(1));
//!
//! let page_id = page_ids(&doc)[0];
//! update_page_fields(&mut doc, page_id, &values, &groups).unwrap();
//! set_need_appearances(&mut doc, true).unwrap();
//! save_document(&mut doc, Path::new("rapport_rempli.pdf")).unwrap();
//! ```

pub mod error;
pub mod form;
pub mod paths;
pub mod pdf;
pub mod report;
pub mod setting;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use error::{Error, Result};
