//! Filename handling for ingested media.
//!
//! Two kinds of names exist and they never mix:
//!
//! - **Display names** ([`sanitize_filename`]): derived once from the user's
//!   filename, kept in the record for UIs. Advisory only.
//! - **Storage names** ([`original_file_name`], [`rendition_file_name`], …):
//!   built exclusively from the generated id, a fixed role suffix, and the
//!   normalized extension. A hostile upload name can therefore never steer a
//!   write outside the storage tree or collide with another asset.
//!
//! ```text
//! images/<id>_original.jpg
//! images/tile/<id>_tile.jpg
//! thumbnails/<id>_thumb.jpg
//! audio/<id>.mp3
//! ```

use std::path::Path;

/// Replacement for any character outside the allow-list.
const FILLER: char = '_';

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

/// Sanitize a user-supplied filename for display.
///
/// Only the final path component is considered. Every character outside
/// `[A-Za-z0-9._-]` becomes `_` and runs of `_` collapse to one. If nothing
/// usable remains (empty, or dots only), a placeholder `file_<hex8><ext>` is
/// returned instead.
///
/// - `"Team Photo (1).JPG"` → `"Team_Photo_1_.JPG"`
/// - `"../../etc/passwd"` → `"passwd"`
/// - `"日本.png"` → `"_.png"`
/// - `"..."` → `"file_1a2b3c4d"`
pub fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let mut sanitized = String::with_capacity(base.len());
    for c in base.chars() {
        let mapped = if is_allowed(c) { c } else { FILLER };
        if mapped == FILLER && sanitized.ends_with(FILLER) {
            continue;
        }
        sanitized.push(mapped);
    }

    if sanitized.chars().all(|c| c == '.') {
        return placeholder_name(base);
    }
    sanitized
}

fn placeholder_name(original: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let ext = normalized_extension(Path::new(original))
        .filter(|e| e.len() > 1 && e[1..].chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_default();
    format!("file_{}{}", &token[..8], ext)
}

/// Lower-cased extension with a leading dot, e.g. `".jpg"`.
///
/// Returns `None` for files without an extension.
pub fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
}

/// Whether `extension` (with or without leading dot, any case) is in `allowed`.
pub fn extension_allowed(extension: &str, allowed: &[String]) -> bool {
    let wanted = extension.trim_start_matches('.');
    allowed
        .iter()
        .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(wanted))
}

/// Whether the extension names a JPEG variant.
pub fn is_jpeg_extension(extension: &str) -> bool {
    matches!(
        extension.trim_start_matches('.').to_ascii_lowercase().as_str(),
        "jpg" | "jpeg" | "jpe" | "jfif"
    )
}

pub fn original_file_name(id: &str, extension: &str) -> String {
    format!("{id}_original{extension}")
}

pub fn rendition_file_name(id: &str, rendition: &str, extension: &str) -> String {
    format!("{id}_{rendition}{extension}")
}

pub fn thumbnail_file_name(id: &str, extension: &str) -> String {
    format!("{id}_thumb{extension}")
}

pub fn audio_file_name(id: &str, extension: &str) -> String {
    format!("{id}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_names() {
        assert_eq!(sanitize_filename("dawn-01_v2.jpg"), "dawn-01_v2.jpg");
    }

    #[test]
    fn sanitize_replaces_spaces_and_punctuation() {
        assert_eq!(sanitize_filename("Team Photo (1).JPG"), "Team_Photo_1_.JPG");
    }

    #[test]
    fn sanitize_collapses_filler_runs() {
        assert_eq!(sanitize_filename("a   &&  b.png"), "a_b.png");
        assert_eq!(sanitize_filename("a__b.png"), "a_b.png");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("/tmp/upload/cat.gif"), "cat.gif");
    }

    #[test]
    fn sanitize_non_ascii_becomes_filler() {
        assert_eq!(sanitize_filename("日本.png"), "_.png");
    }

    #[test]
    fn sanitize_empty_gets_placeholder() {
        let name = sanitize_filename("");
        assert!(name.starts_with("file_"), "got {name}");
        assert_eq!(name.len(), "file_".len() + 8);
    }

    #[test]
    fn sanitize_dot_only_gets_placeholder() {
        let name = sanitize_filename("...");
        assert!(name.starts_with("file_"), "got {name}");
    }

    #[test]
    fn placeholders_are_distinct() {
        assert_ne!(sanitize_filename(""), sanitize_filename(""));
    }

    #[test]
    fn leading_dot_name_is_kept() {
        // Not dot-only, so it is a legitimate (if hidden) display name.
        assert_eq!(sanitize_filename(".hidden.png"), ".hidden.png");
    }

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(
            normalized_extension(Path::new("x/Photo.JPEG")),
            Some(".jpeg".to_string())
        );
        assert_eq!(normalized_extension(Path::new("README")), None);
    }

    #[test]
    fn extension_allowed_ignores_case_and_dot() {
        let allowed = vec!["png".to_string(), ".jpg".to_string()];
        assert!(extension_allowed(".PNG", &allowed));
        assert!(extension_allowed("jpg", &allowed));
        assert!(!extension_allowed(".gif", &allowed));
    }

    #[test]
    fn jpeg_detection() {
        assert!(is_jpeg_extension(".jpg"));
        assert!(is_jpeg_extension("JPEG"));
        assert!(!is_jpeg_extension(".png"));
        assert!(!is_jpeg_extension(".webp"));
    }

    #[test]
    fn storage_names_derive_from_id_only() {
        assert_eq!(original_file_name("abc", ".jpg"), "abc_original.jpg");
        assert_eq!(rendition_file_name("abc", "tile_2x", ".png"), "abc_tile_2x.png");
        assert_eq!(thumbnail_file_name("abc", ".gif"), "abc_thumb.gif");
        assert_eq!(audio_file_name("abc", ".mp3"), "abc.mp3");
    }
}
