//! Target tree values
//!
//! A target tree is a [`Value`]: scalars, lists, ordered attribute sets,
//! opaque build artifacts, annotated nodes and deferred thunks. Thunks are
//! what make placeholders and self references possible; forcing one may
//! fail, and every classification predicate here masks that failure.

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::domain::annotation::Annotated;
use crate::domain::error::{DomainError, DomainResult};

/// Ordered string-keyed mapping; iteration follows insertion order.
pub type Attrs = IndexMap<String, Value>;

/// Opaque build output.
///
/// It carries sub-attributes (outputs, metadata) like any mapping, but help
/// collection never lists them as unannotated leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub attrs: Attrs,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

type Compute = dyn Fn() -> DomainResult<Value>;

/// Nesting limit for thunks forced from inside other thunks, and for
/// [`Value::force_deep`].
pub const MAX_FORCE_DEPTH: usize = 128;

thread_local! {
    static FORCE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts one level of nested forcing for as long as it lives.
struct ForceDepth;

impl ForceDepth {
    fn enter(label: &str) -> DomainResult<Self> {
        FORCE_DEPTH.with(|depth| {
            if depth.get() >= MAX_FORCE_DEPTH {
                return Err(DomainError::InfiniteRecursion {
                    path: label.to_string(),
                });
            }
            depth.set(depth.get() + 1);
            Ok(ForceDepth)
        })
    }
}

impl Drop for ForceDepth {
    fn drop(&mut self) {
        FORCE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// A deferred value, computed each time it is forced.
#[derive(Clone)]
pub struct Thunk {
    label: Rc<str>,
    compute: Rc<Compute>,
}

impl Thunk {
    pub fn new(
        label: impl Into<String>,
        compute: impl Fn() -> DomainResult<Value> + 'static,
    ) -> Self {
        Self {
            label: Rc::from(label.into()),
            compute: Rc::new(compute),
        }
    }

    /// A placeholder that fails with `message` whenever it is forced.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new("error", move || Err(DomainError::Thrown(message.clone())))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the computation.
    ///
    /// Fails with [`DomainError::InfiniteRecursion`] instead of overflowing
    /// the stack when thunks keep forcing each other, as a reference cycle does.
    pub fn force(&self) -> DomainResult<Value> {
        let _depth = ForceDepth::enter(&self.label)?;
        (self.compute)()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Thunk").field(&self.label).finish()
    }
}

// Thunks are opaque: two are equal only if they share the same computation.
impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.compute), Rc::as_ptr(&other.compute))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Attrs(Attrs),
    Artifact(Artifact),
    Annotated(Box<Annotated>),
    Thunk(Thunk),
}

impl Value {
    pub fn attrs<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Attrs(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn empty_attrs() -> Self {
        Value::Attrs(Attrs::new())
    }

    /// Force thunks until a non-thunk value is reached.
    pub fn force(&self) -> DomainResult<Cow<'_, Value>> {
        let mut current = match self {
            Value::Thunk(thunk) => thunk.force()?,
            other => return Ok(Cow::Borrowed(other)),
        };
        while let Value::Thunk(thunk) = current {
            current = thunk.force()?;
        }
        Ok(Cow::Owned(current))
    }

    /// Force this value and everything reachable below it.
    ///
    /// Mappings and lists are rebuilt with forced entries; an annotation keeps
    /// its wrapper around a forced original. The first failure aborts.
    pub fn force_deep(&self) -> DomainResult<Value> {
        self.force_deep_at(&mut Vec::new())
    }

    fn force_deep_at(&self, path: &mut Vec<String>) -> DomainResult<Value> {
        if path.len() >= MAX_FORCE_DEPTH {
            return Err(DomainError::InfiniteRecursion {
                path: display_path(path),
            });
        }
        let forced = self.force()?;
        match forced.as_ref() {
            Value::Attrs(attrs) => Ok(Value::Attrs(force_entries(attrs, path)?)),
            Value::Artifact(artifact) => Ok(Value::Artifact(Artifact {
                name: artifact.name.clone(),
                attrs: force_entries(&artifact.attrs, path)?,
            })),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    path.push(index.to_string());
                    let result = item.force_deep_at(path);
                    path.pop();
                    result
                })
                .collect::<DomainResult<Vec<_>>>()
                .map(Value::List),
            Value::Annotated(annotated) => {
                let mut annotated = annotated.as_ref().clone();
                annotated.original = annotated.original.force_deep_at(path)?;
                Ok(Value::Annotated(Box::new(annotated)))
            }
            other => Ok(other.clone()),
        }
    }

    /// True for attribute sets and artifacts. Forcing errors count as `false`.
    pub fn is_attrs(&self) -> bool {
        matches!(
            self.force().as_deref(),
            Ok(Value::Attrs(_) | Value::Artifact(_))
        )
    }

    /// True for opaque build artifacts. Forcing errors count as `false`.
    pub fn is_artifact(&self) -> bool {
        matches!(self.force().as_deref(), Ok(Value::Artifact(_)))
    }

    /// Entries of an attribute set or artifact, without forcing.
    pub fn as_attrs(&self) -> Option<&Attrs> {
        match self {
            Value::Attrs(attrs) => Some(attrs),
            Value::Artifact(artifact) => Some(&artifact.attrs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Attrs(_) => "attrset",
            Value::Artifact(_) => "artifact",
            Value::Annotated(_) => "annotated",
            Value::Thunk(_) => "thunk",
        }
    }

    /// Rebuild a mapping with every entry passed through `f`.
    ///
    /// Keys and their order are kept; an artifact stays an artifact.
    /// Returns `None` for non-mappings.
    pub fn map_entries(&self, mut f: impl FnMut(&str, &Value) -> Value) -> Option<Value> {
        let mut map = |attrs: &Attrs| -> Attrs {
            attrs
                .iter()
                .map(|(key, value)| (key.clone(), f(key, value)))
                .collect()
        };
        match self {
            Value::Attrs(attrs) => Some(Value::Attrs(map(attrs))),
            Value::Artifact(artifact) => Some(Value::Artifact(Artifact {
                name: artifact.name.clone(),
                attrs: map(&artifact.attrs),
            })),
            _ => None,
        }
    }

    /// Walk `path` from this value, forcing every step, and return the forced target.
    pub fn select<S: AsRef<str>>(&self, path: &[S]) -> DomainResult<Value> {
        let walked = |depth: usize| display_path(&path[..depth]);

        let mut current = self.force()?.into_owned();
        for (depth, key) in path.iter().enumerate() {
            let next = match current.as_attrs() {
                Some(attrs) => attrs.get(key.as_ref()).cloned().ok_or_else(|| {
                    DomainError::MissingAttribute {
                        path: walked(depth + 1),
                    }
                })?,
                None => {
                    return Err(DomainError::NotAttrs {
                        path: walked(depth),
                    })
                }
            };
            current = next.force()?.into_owned();
        }
        Ok(current)
    }
}

fn force_entries(attrs: &Attrs, path: &mut Vec<String>) -> DomainResult<Attrs> {
    attrs
        .iter()
        .map(|(key, value)| {
            path.push(key.clone());
            let result = value.force_deep_at(path);
            path.pop();
            Ok((key.clone(), result?))
        })
        .collect()
}

/// Dotted path for error messages; the empty path is `<root>`.
pub(crate) fn display_path<S: AsRef<str>>(path: &[S]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.iter().map(AsRef::as_ref).join(".")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) if items.is_empty() => write!(f, "[ ]"),
            Value::List(items) => write!(f, "[ {} ]", items.iter().join(" ")),
            Value::Attrs(attrs) if attrs.is_empty() => write!(f, "{{ }}"),
            Value::Attrs(attrs) => write!(
                f,
                "{{ {} }}",
                attrs.iter().map(|(k, v)| format!("{k} = {v};")).join(" ")
            ),
            Value::Artifact(artifact) => write!(f, "«artifact {}»", artifact.name),
            Value::Annotated(annotated) => write!(f, "«annotated {}»", annotated.original),
            Value::Thunk(thunk) => write!(f, "«thunk {}»", thunk.label()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Attrs> for Value {
    fn from(attrs: Attrs) -> Self {
        Value::Attrs(attrs)
    }
}

impl From<Artifact> for Value {
    fn from(artifact: Artifact) -> Self {
        Value::Artifact(artifact)
    }
}

impl From<Thunk> for Value {
    fn from(thunk: Thunk) -> Self {
        Value::Thunk(thunk)
    }
}
