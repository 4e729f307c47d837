//! Form field classification and value writing

pub mod field;
pub mod registry;
pub mod update;

// Re-export commonly used items
pub use field::{FieldKind, FieldValue, FieldValues};
pub use registry::RadioGroupRegistry;
pub use update::{update_page_fields, FieldUpdater};
