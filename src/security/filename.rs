//! Filename sanitization.

/// Placeholder returned when nothing usable is left of a filename.
pub const UNNAMED: &str = "unnamed";

/// Longest filename produced, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '\0'];

/// Turns an arbitrary string into a single safe path component.
///
/// Directory components are dropped, unsafe characters become `_`, leading
/// and trailing whitespace and dots are trimmed, and long names are cut to
/// 255 characters keeping the extension.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let basename = name.rsplit('/').next().unwrap_or_default();

    let replaced: String = basename
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| matches!(c, '.' | ' ' | '\t' | '\n' | '\r'));
    if trimmed.is_empty() {
        return UNNAMED.to_string();
    }

    truncate_keeping_extension(trimmed)
}

fn truncate_keeping_extension(name: &str) -> String {
    let length = name.chars().count();
    if length <= MAX_FILENAME_LENGTH {
        return name.to_string();
    }

    // Trimming removed leading dots, so a dot at index 0 cannot occur here.
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };
    let ext_len = ext.chars().count();
    if ext_len >= MAX_FILENAME_LENGTH {
        return name.chars().take(MAX_FILENAME_LENGTH).collect();
    }

    let mut truncated: String = stem.chars().take(MAX_FILENAME_LENGTH - ext_len).collect();
    truncated.push_str(ext);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directory_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("/abs/path/report.pdf"), "report.pdf");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("a\"b*c"), "a_b_c");
        assert_eq!(sanitize_filename("x<y>z:w|v?u"), "x_y_z_w_v_u");
        assert_eq!(sanitize_filename("win\\path"), "win_path");
        assert_eq!(sanitize_filename("nul\0byte"), "nul_byte");
    }

    #[test]
    fn empty_and_degenerate_names_become_placeholder() {
        assert_eq!(sanitize_filename(""), UNNAMED);
        assert_eq!(sanitize_filename(".."), UNNAMED);
        assert_eq!(sanitize_filename("dir/"), UNNAMED);
        assert_eq!(sanitize_filename("  . "), UNNAMED);
    }

    #[test]
    fn trims_dots_and_whitespace() {
        assert_eq!(sanitize_filename("  .hidden.txt. "), "hidden.txt");
    }

    #[test]
    fn long_names_keep_extension() {
        let name = format!("{}.tar", "a".repeat(300));
        let sanitized = sanitize_filename(&name);
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_LENGTH);
        assert!(sanitized.ends_with(".tar"));
    }

    #[test]
    fn long_names_without_extension_are_cut() {
        let sanitized = sanitize_filename(&"é".repeat(400));
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn oversized_extension_is_cut_as_a_whole() {
        let name = format!("a.{}", "b".repeat(300));
        assert_eq!(sanitize_filename(&name).chars().count(), MAX_FILENAME_LENGTH);
    }
}
