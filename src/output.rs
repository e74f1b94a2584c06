//! CLI output formatting for every catalog command.
//!
//! # Information-First Display
//!
//! Output is **asset-centric, not file-centric**. Each record leads with its
//! positional index and display name; the id, description and stored paths
//! follow as indented context lines. That keeps a listing readable as a media
//! inventory while still letting users copy an id into the next command.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! 001 Team_Photo.JPG [image 1600x900]
//!     Id: 5d0c9a4e-…
//!     Description: kickoff photo
//! 002 buzzer.wav [audio]
//!     Id: 0b7f13c2-…
//!
//! 2 items (1 images, 1 audio), 48713 bytes
//! ```
//!
//! ## Show
//!
//! ```text
//! Team Photo.JPG
//!     Id: 5d0c9a4e-…
//!     Type: image
//!     Uploaded: 2026-10-19T09:12:44+00:00
//!     Size: 48213 bytes
//!     Dimensions: 1600x900
//!     Files:
//!         original: images/5d0c…_original.jpg
//!         tile: images/tile/5d0c…_tile.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::DeleteOutcome;
use crate::gc::{GcReport, IntegrityIssue};
use crate::types::{MediaRecord, StorageStats};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

/// One-line summary: index, display name, type and dimensions.
///
/// ```text
/// 001 Team_Photo.JPG [image 1600x900]
/// 002 buzzer.wav [audio]
/// ```
fn record_line(index: usize, record: &MediaRecord) -> String {
    let kind = match record.dimensions() {
        Some(dims) => format!("{} {}", record.media_type(), dims),
        None => record.media_type().to_string(),
    };
    format!(
        "{} {} [{}]",
        format_index(index),
        record.sanitized_filename,
        kind
    )
}

// ============================================================================
// Records
// ============================================================================

/// Full detail for one record (`show`).
pub fn format_record(record: &MediaRecord) -> Vec<String> {
    let mut lines = vec![record.original_filename.clone()];
    lines.push(format!("{}Id: {}", indent(1), record.id));
    lines.push(format!("{}Type: {}", indent(1), record.media_type()));
    lines.push(format!(
        "{}Uploaded: {}",
        indent(1),
        record.uploaded_at.to_rfc3339()
    ));
    lines.push(format!("{}Size: {} bytes", indent(1), record.file_size_bytes));
    if let Some(dims) = record.dimensions() {
        lines.push(format!("{}Dimensions: {}", indent(1), dims));
    }
    if let Some(desc) = &record.description {
        lines.push(format!("{}Description: {}", indent(1), desc));
    }
    lines.push(format!("{}Files:", indent(1)));
    for (label, path) in record.named_paths() {
        lines.push(format!("{}{}: {}", indent(2), label, path.display()));
    }
    lines
}

pub fn print_record(record: &MediaRecord) {
    for line in format_record(record) {
        println!("{}", line);
    }
}

/// Inventory listing (`list`), followed by a stats footer.
pub fn format_record_list(records: &[&MediaRecord], stats: &StorageStats) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        lines.push(record_line(i + 1, record));
        lines.push(format!("{}Id: {}", indent(1), record.id));
        if let Some(desc) = &record.description {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(desc, 60)
            ));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(stats.to_string());
    lines
}

pub fn print_record_list(records: &[&MediaRecord], stats: &StorageStats) {
    for line in format_record_list(records, stats) {
        println!("{}", line);
    }
}

pub fn format_stats(stats: &StorageStats) -> Vec<String> {
    vec![
        format!("Items: {}", stats.total_items),
        format!("{}Images: {}", indent(1), stats.images),
        format!("{}Audio: {}", indent(1), stats.audio),
        format!("Total size: {} bytes", stats.total_bytes),
    ]
}

pub fn print_stats(stats: &StorageStats) {
    for line in format_stats(stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Maintenance
// ============================================================================

pub fn format_delete(id: &str, outcome: &DeleteOutcome) -> Vec<String> {
    match outcome {
        DeleteOutcome::NotFound => vec![format!("No media with id {}", id)],
        DeleteOutcome::Deleted { failures } => {
            let mut lines = vec![format!("Deleted {}", id)];
            for failure in failures {
                lines.push(format!("{}Could not remove: {}", indent(1), failure));
            }
            lines
        }
    }
}

pub fn print_delete(id: &str, outcome: &DeleteOutcome) {
    for line in format_delete(id, outcome) {
        println!("{}", line);
    }
}

/// Orphan sweep result (`gc`): summary first, then each file.
pub fn format_gc(report: &GcReport) -> Vec<String> {
    let mut lines = vec![report.to_string()];
    for path in &report.removed {
        lines.push(format!("{}Removed: {}", indent(1), path.display()));
    }
    for failure in &report.failures {
        lines.push(format!("{}Failed: {}", indent(1), failure));
    }
    lines
}

pub fn print_gc(report: &GcReport) {
    for line in format_gc(report) {
        println!("{}", line);
    }
}

/// Integrity check result (`check`).
pub fn format_integrity(issues: &[IntegrityIssue]) -> Vec<String> {
    if issues.is_empty() {
        return vec!["All files present".to_string()];
    }
    let mut lines: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
    lines.push(String::new());
    lines.push(format!("{} missing file(s)", issues.len()));
    lines
}

pub fn print_integrity(issues: &[IntegrityIssue]) {
    for line in format_integrity(issues) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::RemovalFailure;
    use crate::test_helpers::sample_image_record;
    use crate::types::MediaPayload;
    use std::path::PathBuf;

    fn audio_record(id: &str) -> MediaRecord {
        let path = PathBuf::from(format!("audio/{id}.wav"));
        MediaRecord {
            id: id.to_string(),
            original_filename: "buzzer sound.wav".into(),
            sanitized_filename: "buzzer_sound.wav".into(),
            description: Some("x".repeat(80)),
            uploaded_at: chrono::Utc::now(),
            file_size_bytes: 500,
            extension: ".wav".into(),
            original_path: path.clone(),
            payload: MediaPayload::Audio { audio_path: path },
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        assert_eq!(truncate_desc(&text, 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_desc_respects_char_boundaries() {
        assert_eq!(truncate_desc("ééééé", 2), "éé...");
    }

    #[test]
    fn record_line_shows_dimensions_for_images_only() {
        assert_eq!(
            record_line(1, &sample_image_record("a")),
            "001 a.jpg [image 10x10]"
        );
        assert_eq!(
            record_line(2, &audio_record("b")),
            "002 buzzer_sound.wav [audio]"
        );
    }

    // =========================================================================
    // Command output tests
    // =========================================================================

    #[test]
    fn format_record_lists_every_file() {
        let lines = format_record(&sample_image_record("abc"));
        assert_eq!(lines[0], "a.jpg");
        assert_eq!(lines[1], "    Id: abc");
        assert_eq!(lines[2], "    Type: image");
        assert!(lines.contains(&"    Dimensions: 10x10".to_string()));
        assert!(lines.contains(&"    Files:".to_string()));
        assert!(lines.contains(&"        original: images/abc_original.jpg".to_string()));
        assert!(lines.contains(&"        tile: images/tile/abc_tile.jpg".to_string()));
    }

    #[test]
    fn format_record_audio_has_no_dimensions() {
        let lines = format_record(&audio_record("snd"));
        assert!(lines.iter().all(|l| !l.contains("Dimensions")));
        assert!(lines.contains(&"        audio: audio/snd.wav".to_string()));
    }

    #[test]
    fn format_list_with_footer() {
        let image = sample_image_record("img");
        let audio = audio_record("snd");
        let stats = StorageStats {
            total_items: 2,
            images: 1,
            audio: 1,
            total_bytes: 501,
        };
        let lines = format_record_list(&[&image, &audio], &stats);
        assert_eq!(
            lines,
            vec![
                "001 a.jpg [image 10x10]".to_string(),
                "    Id: img".to_string(),
                "002 buzzer_sound.wav [audio]".to_string(),
                "    Id: snd".to_string(),
                format!("    Description: {}...", "x".repeat(60)),
                String::new(),
                "2 items (1 images, 1 audio), 501 bytes".to_string(),
            ]
        );
    }

    #[test]
    fn format_empty_list_is_just_stats() {
        let lines = format_record_list(&[], &StorageStats::default());
        assert_eq!(lines, vec!["0 items (0 images, 0 audio), 0 bytes"]);
    }

    #[test]
    fn format_stats_breakdown() {
        let stats = StorageStats {
            total_items: 3,
            images: 2,
            audio: 1,
            total_bytes: 3500,
        };
        assert_eq!(
            format_stats(&stats),
            vec![
                "Items: 3",
                "    Images: 2",
                "    Audio: 1",
                "Total size: 3500 bytes"
            ]
        );
    }

    #[test]
    fn format_delete_outcomes() {
        assert_eq!(
            format_delete("abc", &DeleteOutcome::NotFound),
            vec!["No media with id abc"]
        );
        let outcome = DeleteOutcome::Deleted {
            failures: vec![RemovalFailure {
                path: PathBuf::from("/u/images/abc_original.jpg"),
                reason: "permission denied".into(),
            }],
        };
        assert_eq!(
            format_delete("abc", &outcome),
            vec![
                "Deleted abc",
                "    Could not remove: /u/images/abc_original.jpg: permission denied"
            ]
        );
    }

    #[test]
    fn format_gc_lists_removed_files() {
        let report = GcReport {
            removed: vec![PathBuf::from("/u/audio/stray.mp3")],
            failures: vec![],
        };
        assert_eq!(
            format_gc(&report),
            vec!["Removed 1 orphan file(s)", "    Removed: /u/audio/stray.mp3"]
        );
    }

    #[test]
    fn format_integrity_clean_and_dirty() {
        assert_eq!(format_integrity(&[]), vec!["All files present"]);

        let issues = vec![IntegrityIssue {
            id: "abc".into(),
            label: "tile".into(),
            path: PathBuf::from("/u/images/tile/abc_tile.jpg"),
        }];
        let lines = format_integrity(&issues);
        assert_eq!(lines[0], "Missing tile file for abc: /u/images/tile/abc_tile.jpg");
        assert_eq!(lines.last().unwrap(), "1 missing file(s)");
    }
}
