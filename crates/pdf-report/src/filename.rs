//! Download filename sanitation

use crate::constants::{DEFAULT_FILENAME, MAX_FILENAME_LEN};

/// Reduce a filename to `[A-Za-z0-9-_]`.
///
/// Characters outside `[A-Za-z0-9\-_ ]` are dropped, runs of spaces become a
/// single underscore, leading/trailing underscores are trimmed and the result
/// is truncated to 40 characters.
pub fn sanitize_filename(filename: &str) -> String {
    let mut collapsed = String::with_capacity(filename.len());
    let mut in_space = false;

    for c in filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
    {
        if c == ' ' {
            if !in_space {
                collapsed.push('_');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }

    collapsed
        .trim_matches('_')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect()
}

/// Name the artifact is offered under: sanitized stem plus `.pdf`.
pub fn download_name(filename: &str) -> String {
    let trimmed = filename.trim();
    let stem = match trimmed
        .len()
        .checked_sub(4)
        .and_then(|split| trimmed.get(split..).map(|ext| (split, ext)))
    {
        Some((split, ext)) if ext.eq_ignore_ascii_case(".pdf") => &trimmed[..split],
        _ => trimmed,
    };

    let sanitized = sanitize_filename(stem);
    if sanitized.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{}.pdf", sanitized)
    }
}
