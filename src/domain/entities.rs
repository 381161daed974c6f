//! Domain entities: core data structures

use crate::domain::path::format_attr_path;
use crate::domain::value::Value;

/// One documented position in a target tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpEntry {
    /// Keys from the tree root to this entry.
    pub path: Vec<String>,
    /// Help text; `None` marks an unannotated leaf.
    pub message: Option<String>,
    /// The original value at this position, used to classify it when rendering.
    pub value: Value,
}

impl HelpEntry {
    pub fn new(path: Vec<String>, message: Option<String>, value: Value) -> Self {
        Self {
            path,
            message,
            value,
        }
    }

    /// Path segments joined with `.`, exactly as written.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Path formatted for the command line (segments containing dots are quoted).
    pub fn attr_path(&self) -> String {
        format_attr_path(&self.path)
    }

    /// Like [`HelpEntry::attr_path`], but the root entry shows as `<root>`.
    pub fn display_path(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.attr_path()
        }
    }
}
