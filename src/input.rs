//! Document loading for the command line.
//!
//! A path of `-` reads standard input. Documents are read as UTF-8 text and
//! returned verbatim; line endings are left alone since offsets are computed
//! over the exact text.

use crate::error::InputError;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Returns true if `path` names standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Reads a document from `path`, or from standard input for `-`.
///
/// # Errors
///
/// - `InputError::FileNotFound` if the path does not exist
/// - `InputError::ReadError` if the file cannot be read as UTF-8 text
/// - `InputError::StdinError` if standard input cannot be read
pub fn read_document(path: &Path) -> Result<String, InputError> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|source| InputError::StdinError { source })?;
        debug!(chars = content.chars().count(), "read document from stdin");
        return Ok(content);
    }

    if !path.exists() {
        return Err(InputError::file_not_found(path.to_string_lossy()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| InputError::read_error(path.to_string_lossy(), e))?;
    debug!(
        path = %path.display(),
        chars = content.chars().count(),
        "read document"
    );
    Ok(content)
}

/// Checks that at most one of `paths` is standard input.
pub fn check_stdin_once<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<(), InputError> {
    if paths.into_iter().filter(|p| is_stdin(p)).count() > 1 {
        return Err(InputError::StdinReused);
    }
    Ok(())
}
