//! Input validation for title and suggestion queries.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Longest accepted query, in characters, after trimming.
pub const MAX_TITLE_LENGTH: usize = 200;

fn allowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9\s\-'.:,&!?()]+$").expect("static title pattern is valid")
    })
}

/// Validate a title or partial-title query and return it trimmed.
///
/// Rejects empty input, input longer than [`MAX_TITLE_LENGTH`], and input
/// containing characters outside letters, digits, whitespace, and
/// `- ' . : , & ! ? ( )`.
pub fn validate_title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::Validation("Title cannot be empty".into()));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::Validation(format!(
            "Title too long (max {MAX_TITLE_LENGTH} characters)"
        )));
    }

    if !allowed_chars().is_match(trimmed) {
        return Err(Error::Validation("Title contains invalid characters".into()));
    }

    Ok(trimmed.to_string())
}
