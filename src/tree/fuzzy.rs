//! Typo-tolerant label matching used by the explorer filter.
//!
//! A filter matches a label when it is a case-insensitive substring of it, or when
//! its tokens are prefixes of label tokens in order: `Met.Ent` and `MetEntNa` both
//! match `Metadata.EntityName`. Tokens split at `.` (dropped) and before every
//! uppercase letter (kept).

/// Cut `text` at its first `(` and trim what precedes it, so annotations such as
/// `Name (String)` or `Orion (3 items)` are not searched. Text that would become empty
/// is returned unchanged.
pub fn strip_annotation(text: &str) -> &str {
    match text.find('(') {
        Some(index) => {
            let head = text[..index].trim_end();
            if head.is_empty() { text } else { head }
        }
        None => text,
    }
}

/// Split at dots and before capitals.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        if ch == '.' {
            if index > start {
                tokens.push(&text[start..index]);
            }
            start = index + ch.len_utf8();
        } else if ch.is_uppercase() && index > start {
            tokens.push(&text[start..index]);
            start = index;
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text = text.chars().flat_map(char::to_lowercase);
    prefix.chars().flat_map(char::to_lowercase).all(|expected| text.next() == Some(expected))
}

/// Does `filter` select `label`? `filter` is expected to be non-blank.
pub fn matches(filter: &str, label: &str) -> bool {
    let filter = strip_annotation(filter);
    let label = strip_annotation(label);

    if label.to_lowercase().contains(&filter.to_lowercase()) {
        return true;
    }

    let filter_tokens = tokenize(filter);
    let label_tokens = tokenize(label);
    let mut remaining = label_tokens.iter();
    filter_tokens
        .iter()
        .all(|wanted| remaining.by_ref().any(|token| starts_with_ignore_case(token, wanted)))
}

/// A normalized, non-blank filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(String);

impl Filter {
    /// `None` for missing, empty or whitespace-only text.
    pub fn parse(text: Option<&str>) -> Option<Self> {
        text.filter(|text| !text.trim().is_empty()).map(|text| Filter(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, label: &str) -> bool {
        matches(&self.0, label)
    }
}
