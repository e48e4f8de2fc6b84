use std::collections::BTreeMap;

/// Doc text split into the leading summary and per-field descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DocComment {
    pub summary: Option<String>,
    pub descriptions: BTreeMap<String, String>,
}

impl DocComment {
    pub fn description(&self, field: &str) -> &str {
        self.descriptions.get(field).map(String::as_str).unwrap_or("")
    }
}

/// Splits a doc text into a summary and a field-name to description map.
///
/// The contract mirrors reStructuredText field lists: an optional free-text
/// summary paragraph, then lines of the form `:field_name: description`.
/// A description continues over following non-empty lines until a blank line
/// or the next field marker.
pub(crate) fn extract_descriptions(doc: &str) -> DocComment {
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut descriptions = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in doc.lines() {
        let trimmed = line.trim();
        if let Some((field, description)) = parse_field_marker(trimmed) {
            descriptions.insert(field.clone(), description);
            current = Some(field);
        } else if trimmed.is_empty() {
            current = None;
        } else if let Some(entry) = current.as_ref().and_then(|f| descriptions.get_mut(f)) {
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(trimmed);
        } else if descriptions.is_empty() {
            summary_lines.push(trimmed);
        }
    }

    let summary = if summary_lines.is_empty() {
        None
    } else {
        Some(summary_lines.join(" "))
    };
    DocComment {
        summary,
        descriptions,
    }
}

/// Recognizes `:field_name: description` lines. Field names follow the usual
/// identifier rules; anything else is not a marker.
fn parse_field_marker(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(':')?;
    let close = rest.find(':')?;
    let field = &rest[..close];
    let valid = !field.is_empty()
        && !field.starts_with(|c: char| c.is_ascii_digit())
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return None;
    }
    Some((field.to_string(), rest[close + 1..].trim().to_string()))
}
