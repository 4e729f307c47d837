//! Error types for the expense report filler

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the expense report filler library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Field setting file could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Radio button group declared without any option
    #[error("Radio button group {group} must have at least one option")]
    EmptyRadioGroup { group: String },

    /// Radio button index with no matching option
    #[error("Radio button group {group} has no option at index {index} (it has {len} options)")]
    IndexOutOfRange { group: String, index: isize, len: usize },

    /// Option identity that does not belong to a radio button group
    #[error("Radio button group {group} has no option {identity:?}")]
    IdentityNotFound { group: String, identity: String },

    /// Radio button group value that is not an integer index
    #[error("Radio button group {group} expects an integer index, got {value}")]
    NotAnIndex { group: String, value: String },

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path with an unexpected extension
    #[error("{} must have one of these extensions: {}", .path.display(), .expected.join(", "))]
    WrongExtension { path: PathBuf, expected: Vec<String> },

    /// Value in a field setting file that the report layout cannot map
    #[error("Unexpected value for {key}: {value}")]
    UnexpectedSettingValue { key: String, value: String },

    /// PDF without an interactive form
    #[error("{} does not contain fields", .0.display())]
    NoFields(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}
