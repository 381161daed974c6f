//! Annotated nodes and the annotator handed to tree builders

use std::borrow::Cow;
use std::fmt;

use crate::domain::value::{Attrs, Value};

/// A value paired with its help text.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated {
    /// The wrapped value; may itself contain further annotated nodes.
    pub original: Value,
    /// Help text; `None` documents the position without a description.
    pub message: Option<String>,
    /// Stop help collection (and erasure) below this node.
    pub shallow: bool,
}

impl Annotated {
    pub fn new(message: Option<String>, original: Value, shallow: bool) -> Self {
        Self {
            original,
            message,
            shallow,
        }
    }
}

impl From<Annotated> for Value {
    fn from(annotated: Annotated) -> Self {
        Value::Annotated(Box::new(annotated))
    }
}

/// Wrap `value` with `message`.
pub fn annotate(message: impl Into<String>, value: impl Into<Value>) -> Value {
    Annotated::new(Some(message.into()), value.into(), false).into()
}

/// Like [`annotate`], but nothing below the wrapped value is documented or erased.
pub fn shallow_annotate(message: impl Into<String>, value: impl Into<Value>) -> Value {
    Annotated::new(Some(message.into()), value.into(), true).into()
}

/// Never fails: a value whose forcing errors is not annotated.
pub fn is_annotated(value: &Value) -> bool {
    annotation_of(value).is_some()
}

/// The annotation carried by `value`, forcing thunks on the way.
pub fn annotation_of(value: &Value) -> Option<Cow<'_, Annotated>> {
    match value.force().ok()? {
        Cow::Borrowed(Value::Annotated(annotated)) => Some(Cow::Borrowed(annotated.as_ref())),
        Cow::Owned(Value::Annotated(annotated)) => Some(Cow::Owned(*annotated)),
        _ => None,
    }
}

/// The annotation constructor passed to tree builders.
#[derive(Clone, Copy)]
pub struct Annotator {
    construct: fn(String, Value) -> Value,
}

impl Annotator {
    /// Builds regular annotations.
    pub fn deep() -> Self {
        Self {
            construct: |message, value| annotate(message, value),
        }
    }

    /// Builds shallow annotations.
    pub fn shallow() -> Self {
        Self {
            construct: |message, value| shallow_annotate(message, value),
        }
    }

    pub fn custom(construct: fn(String, Value) -> Value) -> Self {
        Self { construct }
    }

    pub fn help(&self, message: impl Into<String>, value: impl Into<Value>) -> Value {
        (self.construct)(message.into(), value.into())
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::deep()
    }
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator").finish_non_exhaustive()
    }
}

/// Annotate each key of `original` with the matching text from `texts`.
///
/// Keys missing from `texts` pass through unannotated; keys only present in
/// `texts` are ignored. Non-string texts are rendered with `Display`.
pub fn zip_help(annotator: &Annotator, original: &Attrs, texts: &Attrs) -> Attrs {
    original
        .iter()
        .map(|(key, value)| {
            let value = match texts.get(key) {
                Some(text) => annotator.help(help_text(text), value.clone()),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn help_text(text: &Value) -> String {
    match text.force() {
        Ok(forced) => match forced.as_ref() {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        },
        Err(e) => e.to_string(),
    }
}
