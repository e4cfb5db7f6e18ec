//! Client-side document export.
//!
//! # Responsibility
//! - Render one journal entry as a PDF the caller saves to the device.
//!
//! # Invariants
//! - Export is pure: no store access, no file-system writes.

pub mod pdf;

use crate::model::journal::JournalEntry;
use chrono::{DateTime, Utc};
use pdf::PdfWriter;

const TITLE_SIZE: f32 = 18.0;
const META_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;

/// Renders `entry` as PDF bytes: title, category and date, then the body.
pub fn journal_entry_pdf(entry: &JournalEntry) -> Vec<u8> {
    let mut writer = PdfWriter::new();
    let title = if entry.title.trim().is_empty() {
        "Untitled entry"
    } else {
        entry.title.trim()
    };
    writer.paragraph(title, TITLE_SIZE);
    writer.paragraph(
        &format!(
            "{} | {}",
            entry.category.label(),
            format_timestamp(entry.created_at)
        ),
        META_SIZE,
    );
    writer.spacer(BODY_SIZE);
    writer.paragraph(&entry.content, BODY_SIZE);
    writer.finish()
}

/// Suggested file name for a saved export.
pub fn journal_entry_file_name(entry: &JournalEntry) -> String {
    let slug = entry
        .title
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "journal-entry.pdf".to_string()
    } else {
        format!("{slug}.pdf")
    }
}

fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

#[cfg(test)]
mod tests {
    use super::{journal_entry_file_name, journal_entry_pdf};
    use crate::model::journal::{JournalCategory, JournalEntry};

    #[test]
    fn pdf_contains_title_category_and_date() {
        let entry = JournalEntry::new(
            "Week (1) recap",
            "Ran twice.\n\nFelt good.",
            JournalCategory::Progress,
            1_767_225_600_000,
        );
        let text = String::from_utf8(journal_entry_pdf(&entry)).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains(r"(Week \(1\) recap) Tj"));
        assert!(text.contains("Progress | 2026-01-01 00:00 UTC"));
        assert!(text.contains("(Felt good.) Tj"));
    }

    #[test]
    fn file_name_is_slugged_title() {
        let entry = JournalEntry::new("My Big Day!", "", JournalCategory::General, 0);
        assert_eq!(journal_entry_file_name(&entry), "my-big-day.pdf");
        let untitled = JournalEntry::new("???", "", JournalCategory::General, 0);
        assert_eq!(journal_entry_file_name(&untitled), "journal-entry.pdf");
    }
}
