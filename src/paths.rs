//! Path argument checks and default output names

use std::path::{Path, PathBuf};
use crate::error::{Error, Result};

/// Whether `path` ends with one of `extensions` (given with their dot)
///
/// The comparison ignores case. Only the last extension counts, so
/// `report.tar.pdf` has the extension `.pdf`.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let extension = match path.extension().and_then(|e| e.to_str()) {
        Some(extension) => format!(".{}", extension.to_lowercase()),
        None => return false,
    };

    extensions.iter().any(|expected| expected.to_lowercase() == extension)
}

fn wrong_extension(path: &Path, extensions: &[&str]) -> Error {
    Error::WrongExtension {
        path: path.to_path_buf(),
        expected: extensions.iter().map(|e| e.to_string()).collect(),
    }
}

/// Check that an input file exists and has one of the expected extensions
pub fn check_input_path(path: &Path, extensions: &[&str]) -> Result<()> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    if !has_extension(path, extensions) {
        return Err(wrong_extension(path, extensions));
    }

    Ok(())
}

/// Default output file name derived from an input path
///
/// `<stem><termination><extension>`, e.g. `rapport_field_values.txt` for
/// `rapport.pdf`, `_field_values` and `.txt`.
pub fn default_output_name(input: &Path, termination: &str, extension: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!("{}{}{}", stem, termination, extension)
}

/// Default output path, next to the input file
pub fn default_output_path(input: &Path, termination: &str, extension: &str) -> PathBuf {
    input.with_file_name(default_output_name(input, termination, extension))
}

/// Resolve an optional output path argument
///
/// - no path: the default output path next to `input`
/// - a directory: the default output name inside that directory
/// - a file: kept, but it must have the extension `extension`
pub fn resolve_output_path(
    output: Option<&Path>,
    input: &Path,
    termination: &str,
    extension: &str,
) -> Result<PathBuf> {
    match output {
        None => Ok(default_output_path(input, termination, extension)),
        Some(dir) if dir.is_dir() => Ok(dir.join(default_output_name(input, termination, extension))),
        Some(path) if has_extension(path, &[extension]) => Ok(path.to_path_buf()),
        Some(path) => Err(wrong_extension(path, &[extension])),
    }
}

/// Like [`resolve_output_path`], but a wrong extension is replaced
pub fn coerce_output_path(
    output: Option<&Path>,
    input: &Path,
    termination: &str,
    extension: &str,
) -> PathBuf {
    match output {
        Some(path) if !path.is_dir() && !has_extension(path, &[extension]) => {
            path.with_extension(extension.trim_start_matches('.'))
        }
        _ => resolve_output_path(output, input, termination, extension)
            .unwrap_or_else(|_| default_output_path(input, termination, extension)),
    }
}
