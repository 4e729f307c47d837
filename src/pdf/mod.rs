//! PDF document handling module

pub mod document;
pub mod fields;
pub mod structure;
pub mod text;

// Re-export commonly used items
pub use document::{load_document, page_ids, save_document, set_fields_read_only, set_need_appearances};
pub use fields::{list_fields, text_field_names, write_field_names, write_field_values, PdfField};
pub use structure::{write_field_structures, write_object_structure, write_page_structures, StructureOptions};
