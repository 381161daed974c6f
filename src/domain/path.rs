//! Dotted attribute paths (`build.frontend`, `pkgs."hello-2.12"`)

use itertools::Itertools;
use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

const SEGMENT: &str = r#""([^"]*)"|([^."\s]+)"#;

/// Split a dotted attribute path into its segments.
///
/// Segments are separated by `.`; a segment may be double-quoted to contain
/// dots. The empty string is the root path.
pub fn parse_attr_path(path: &str) -> DomainResult<Vec<String>> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let invalid = |reason: String| DomainError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    let whole = Regex::new(&format!(r"^(?:{SEGMENT})(?:\.(?:{SEGMENT}))*$"))
        .map_err(|e| invalid(e.to_string()))?;
    if !whole.is_match(path) {
        return Err(invalid("expected dot-separated names".to_string()));
    }

    let segment = Regex::new(SEGMENT).map_err(|e| invalid(e.to_string()))?;
    Ok(segment
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Join segments back into a dotted path, quoting segments that need it.
pub fn format_attr_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| {
            let s = s.as_ref();
            if s.is_empty() || s.contains(['.', '"']) || s.contains(char::is_whitespace) {
                format!("\"{s}\"")
            } else {
                s.to_string()
            }
        })
        .join(".")
}
