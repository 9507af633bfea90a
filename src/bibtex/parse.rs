//! BibTeX reader.
//!
//! Splits the input into `@type{...}` blocks, then each block into a citation
//! key and a field list. `@comment`, `@preamble` and `@string` blocks are
//! skipped, text between blocks is ignored. Any malformed block rejects the
//! whole bibliography.

use tracing::warn;

use super::error::StoreError;
use super::{BibField, BibRecord};

const IGNORED_BLOCK_TYPES: [&str; 3] = ["comment", "preamble", "string"];

/// Parses every entry of a bibliography, in file order.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] on the first block that is not valid
/// BibTeX.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> Result<Vec<BibRecord>, StoreError> {
    let mut records: Vec<BibRecord> = Vec::new();

    for (index, raw_entry) in segment_entries(input).iter().enumerate() {
        let Some(record) = parse_entry(index + 1, raw_entry)? else {
            continue;
        };
        if let Some(key) = record.key()
            && records.iter().any(|other| other.key() == Some(key))
        {
            warn!(key, "duplicate citation key; both entries are kept");
        }
        records.push(record);
    }

    Ok(records)
}

fn segment_entries(input: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut entries = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].1 != '@' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_ascii_alphabetic() {
            j += 1;
        }
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }

        if j >= chars.len() || chars[j].1 != '{' {
            i += 1;
            continue;
        }

        let start = chars[i].0;
        let mut depth = 0usize;
        let mut in_quotes = false;
        let mut escape = false;
        let mut found_end = None;

        for (k, (_, ch)) in chars.iter().enumerate().skip(j) {
            if escape {
                escape = false;
                continue;
            }
            match *ch {
                '\\' => escape = true,
                // Quotes only delimit values at the top level of the entry.
                '"' if depth == 1 => in_quotes = !in_quotes,
                '{' if !in_quotes => depth += 1,
                '}' if !in_quotes => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        found_end = Some(k);
                        break;
                    }
                }
                _ => {}
            }
        }

        if let Some(end_index) = found_end {
            let end_exclusive = chars
                .get(end_index + 1)
                .map_or(input.len(), |(offset, _)| *offset);
            entries.push(input[start..end_exclusive].trim().to_string());
            i = end_index + 1;
        } else {
            // Unterminated block: keep everything up to the next entry that
            // starts a line so the error points at the right block.
            let mut recovery = i + 1;
            while recovery < chars.len() {
                if chars[recovery].1 == '@' && matches!(chars[recovery - 1].1, '\n' | '\r') {
                    break;
                }
                recovery += 1;
            }
            let end_exclusive = chars
                .get(recovery)
                .map_or(input.len(), |(offset, _)| *offset);
            entries.push(input[start..end_exclusive].trim().to_string());
            i = recovery;
        }
    }

    entries
}

fn parse_entry(position: usize, raw_entry: &str) -> Result<Option<BibRecord>, StoreError> {
    let trimmed = raw_entry.trim();
    let after_at = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let Some(brace_pos) = after_at.find('{') else {
        return Err(StoreError::malformed(
            position,
            trimmed,
            "missing opening '{' after the entry type",
        ));
    };

    let entry_type = after_at[..brace_pos].trim().to_ascii_lowercase();
    if entry_type.is_empty() {
        return Err(StoreError::malformed(position, trimmed, "missing entry type"));
    }
    if IGNORED_BLOCK_TYPES.contains(&entry_type.as_str()) {
        return Ok(None);
    }
    if !trimmed.ends_with('}') {
        return Err(StoreError::malformed(
            position,
            trimmed,
            "unbalanced braces (entry never closed)",
        ));
    }

    let body = &after_at[brace_pos + 1..after_at.len() - 1];
    let (key, fields_raw) = split_key(body);

    let fields = parse_fields(fields_raw)
        .map_err(|reason| StoreError::malformed(position, trimmed, reason))?;

    Ok(Some(BibRecord::new(entry_type, key, fields)))
}

/// Separates the citation key from the field list.
///
/// A first segment that already looks like a field assignment means the entry
/// has no key at all.
fn split_key(body: &str) -> (Option<String>, &str) {
    match body.split_once(',') {
        Some((head, rest)) if !head.contains('=') => {
            let key = head.trim();
            let key = (!key.is_empty()).then(|| key.to_string());
            (key, rest)
        }
        Some(_) => (None, body),
        None if body.contains('=') => (None, body),
        None => {
            let key = body.trim();
            ((!key.is_empty()).then(|| key.to_string()), "")
        }
    }
}

fn parse_fields(input: &str) -> Result<Vec<BibField>, String> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }
        if ch == '\\' {
            current.push(ch);
            escape = true;
            continue;
        }
        if ch == '"' && depth == 0 {
            in_quotes = !in_quotes;
            current.push(ch);
            continue;
        }
        if !in_quotes {
            if ch == '{' {
                depth += 1;
            } else if ch == '}' {
                if depth == 0 {
                    return Err("closing brace without matching opening brace".to_string());
                }
                depth -= 1;
            } else if ch == ',' && depth == 0 {
                let segment = current.trim();
                if !segment.is_empty() {
                    pairs.push(segment.to_string());
                }
                current.clear();
                continue;
            }
        }
        current.push(ch);
    }

    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    if depth != 0 {
        return Err("unbalanced braces in field values".to_string());
    }

    let tail = current.trim();
    if !tail.is_empty() {
        pairs.push(tail.to_string());
    }

    let mut fields = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let Some((name, raw_value)) = pair.split_once('=') else {
            return Err(format!("missing '=' in field segment `{pair}`"));
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err("empty field name".to_string());
        }
        let raw_value = raw_value.trim();
        if raw_value.is_empty() {
            return Err(format!("empty value in field `{name}`"));
        }
        fields.push(BibField::new(name, raw_value));
    }

    Ok(fields)
}
