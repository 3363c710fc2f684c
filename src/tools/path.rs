//! Path normalization for note and folder arguments
//!
//! Models write paths loosely ("/Ideas/project", "Daily/today.md "). Both
//! normalizers are idempotent: feeding their output back in is a no-op.

/// Default document extension
pub const NOTE_EXTENSION: &str = ".md";

/// Characters that may not appear in a note path
pub const INVALID_PATH_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

/// Normalize a note path: trim, drop leading separators, ensure the extension.
///
/// Returns an empty string when nothing but whitespace and separators was given.
pub fn normalize_note_path(path: &str, extension: &str) -> String {
    let trimmed = path
        .trim_start_matches(|c: char| c == '/' || c.is_whitespace())
        .trim_end();

    if trimmed.is_empty() {
        return String::new();
    }

    if has_extension(trimmed, extension) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, extension)
    }
}

/// Normalize a folder path: trim whitespace and separators on both ends.
///
/// The root folder is the empty string, so "", "/" and "  " all name it.
pub fn normalize_folder_path(path: &str) -> String {
    path.trim_matches(|c: char| c == '/' || c.is_whitespace()).to_string()
}

/// Check a path for characters the vault cannot store
pub fn is_valid_path(path: &str) -> bool {
    !path.contains(INVALID_PATH_CHARS)
}

fn has_extension(path: &str, extension: &str) -> bool {
    path.len() >= extension.len()
        && path
            .get(path.len() - extension.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(extension))
}
