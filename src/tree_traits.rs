//! termtree rendering of (erased) target trees

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Attrs, Value, MAX_FORCE_DEPTH};

pub trait ValueTreeConvert {
    fn to_tree_string(&self, label: &str) -> Tree<String>;
}

impl ValueTreeConvert for Value {
    /// Attribute sets become branches; everything else is a `label = value` leaf.
    /// Values that fail when forced are shown with their error instead of aborting.
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self, label: &str) -> Tree<String> {
        tree_at(self, label.to_string(), 0)
    }
}

fn tree_at(value: &Value, label: String, depth: usize) -> Tree<String> {
    if depth >= MAX_FORCE_DEPTH {
        return Tree::new(format!("{label} = <error: nested too deep>"));
    }
    let forced = match value.force() {
        Ok(forced) => forced,
        Err(e) => return Tree::new(format!("{label} = <error: {e}>")),
    };
    match forced.as_ref() {
        Value::Attrs(attrs) => branch(label, attrs, depth),
        Value::Artifact(artifact) => {
            branch(format!("{label} «{}»", artifact.name), &artifact.attrs, depth)
        }
        Value::Annotated(annotated) => {
            let label = match &annotated.message {
                Some(message) => format!("{label} - {message}"),
                None => label,
            };
            tree_at(&annotated.original, label, depth)
        }
        other => Tree::new(format!("{label} = {other}")),
    }
}

fn branch(root: String, attrs: &Attrs, depth: usize) -> Tree<String> {
    Tree::new(root).with_leaves(
        attrs
            .iter()
            .map(|(key, value)| tree_at(value, key.clone(), depth + 1)),
    )
}
