//! Rendering help entries into a text block

use itertools::Itertools;

use crate::domain::entities::HelpEntry;
use crate::domain::options::HelpOptions;

/// Order entries with `prepare_entries`, render each with `render_entry`,
/// and join all lines with `\n`.
pub fn render(options: &HelpOptions, entries: Vec<HelpEntry>) -> String {
    let ordered = (options.prepare_entries)(entries);
    ordered
        .iter()
        .flat_map(|entry| (options.render_entry)(entry))
        .join("\n")
}

/// Default ordering: documented entries first, then by concatenated path.
///
/// The sort is stable, so entries with equal keys keep collection order.
pub fn sort_entries(mut entries: Vec<HelpEntry>) -> Vec<HelpEntry> {
    entries.sort_by_cached_key(|entry| (entry.message.is_none(), entry.path.concat()));
    entries
}

/// Default line format.
///
/// Mappings (but not artifacts) render as `path: (attrset) message`,
/// everything else as `path` or `path - message`.
pub fn render_entry(entry: &HelpEntry) -> Vec<String> {
    let dotted = entry.dotted();
    let line = if entry.value.is_attrs() && !entry.value.is_artifact() {
        format!(
            "{dotted}: (attrset) {}",
            entry.message.as_deref().unwrap_or("")
        )
    } else {
        match &entry.message {
            Some(message) => format!("{dotted} - {message}"),
            None => dotted,
        }
    };
    vec![line]
}
