//! BibTeX writer.

use std::fmt::Write as _;
use std::path::Path;

use super::BibRecord;
use super::error::StoreError;

/// Formats records as BibTeX, one block per record, raw field values kept.
#[must_use]
pub fn format_records(records: &[BibRecord]) -> String {
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        format_record(&mut out, record);
    }
    out
}

fn format_record(out: &mut String, record: &BibRecord) {
    let _ = write!(out, "@{}{{", record.entry_type());
    match record.key() {
        Some(key) if record.fields().is_empty() => {
            let _ = writeln!(out, "{key}}}");
            return;
        }
        Some(key) => {
            let _ = writeln!(out, "{key},");
        }
        None => out.push('\n'),
    }

    let last = record.fields().len().saturating_sub(1);
    for (index, field) in record.fields().iter().enumerate() {
        let separator = if index == last { "" } else { "," };
        let _ = writeln!(out, "  {} = {}{separator}", field.name(), field.raw());
    }
    out.push_str("}\n");
}

/// Writes records to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written.
pub async fn write_file(path: &Path, records: &[BibRecord]) -> Result<(), StoreError> {
    tokio::fs::write(path, format_records(records))
        .await
        .map_err(|e| StoreError::io(path, e))
}
