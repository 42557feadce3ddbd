//! Title -> file name mapping.

/// Characters that are unsafe in a file name on at least one common filesystem.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace every reserved character with `_`, one for one.
///
/// Total and locale-independent. Length is not limited; callers that care about
/// `NAME_MAX` must guard it themselves.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `sanitize_filename(title)` followed by the literal target extension.
pub fn sanitized_file_name(title: &str, target_extension: &str) -> String {
    format!("{}{}", sanitize_filename(title), target_extension)
}
