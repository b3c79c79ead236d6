//! Field-level normalization for the question CSV format.
//!
//! Any field value may be wrapped in one matching pair of square brackets to
//! protect embedded commas from the CSV tokenizer. Masking runs over the raw
//! file before parsing, and every parsed field is cleaned with
//! [`clean_field`] afterwards; bracket wrappers never reach the database.

/// Stand-in for commas that sit inside brackets while the CSV reader splits
/// the record. U+0001 cannot appear in sane CSV input.
const COMMA_MASK: char = '\u{1}';

/// Replaces commas inside square brackets with the comma mask. Bracket depth
/// resets at line ends, so an unclosed bracket cannot leak the mask into the
/// rest of the file.
pub fn mask_bracketed_commas(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth: usize = 0;

    for ch in raw.chars() {
        match ch {
            '[' => {
                depth += 1;
                out.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                out.push(ch);
            }
            '\n' | '\r' => {
                depth = 0;
                out.push(ch);
            }
            ',' if depth > 0 => out.push(COMMA_MASK),
            _ => out.push(ch),
        }
    }

    out
}

/// True when the whole string is enclosed by one matching bracket pair, i.e.
/// the opening bracket at the start closes exactly at the end.
fn is_wrapped(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'[' || bytes[bytes.len() - 1] != b']' {
        return false;
    }

    let mut depth: usize = 0;
    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && index != bytes.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0
}

/// Strips exactly one pair of wrapping brackets, if present.
pub fn unwrap_brackets(value: &str) -> &str {
    let trimmed = value.trim();
    if is_wrapped(trimmed) {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Restores masked commas and strips one wrapping bracket pair.
pub fn clean_field(field: &str) -> String {
    let restored: String = field
        .chars()
        .map(|ch| if ch == COMMA_MASK { ',' } else { ch })
        .collect();

    unwrap_brackets(&restored).to_string()
}

/// Canonical header form: cleaned, lowercased, spaces to underscores.
pub fn normalize_header(name: &str) -> String {
    clean_field(name).to_lowercase().replace(' ', "_")
}

/// Splits a pipe-separated choice list into trimmed, bracket-stripped,
/// non-empty entries.
pub fn split_choices(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(unwrap_brackets)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Recognized truthy/falsy spellings for the `is_active` column.
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
