//! Top-level composition: build a raw tree, erase it, attach help
//!
//! The builder receives a [`SelfRef`] to the finished (erased) tree. Reads
//! through it are deferred thunks that resolve once the tree exists, which
//! lets one target alias another without ordering the builder.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::domain::{
    collect_help_entries, erase, parse_attr_path, render, Annotator, DomainError, DomainResult,
    HelpOptions, Thunk, Value,
};

/// Forward reference to the erased tree a builder is producing.
///
/// The tree is never freed while thunks created through it are alive:
/// the finished tree holds those thunks, and they hold the tree.
#[derive(Clone, Default)]
pub struct SelfRef {
    tree: Rc<OnceCell<Value>>,
}

impl SelfRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deferred lookup of a dotted attribute path in the finished tree.
    ///
    /// Forcing the returned thunk before [`SelfRef::finalize`] fails with
    /// [`DomainError::SelfNotReady`].
    pub fn get(&self, path: &str) -> Value {
        let tree = Rc::clone(&self.tree);
        let segments = parse_attr_path(path);
        let display = path.to_string();
        Value::Thunk(Thunk::new(format!("self.{path}"), move || {
            let segments = segments.clone()?;
            let root = tree.get().ok_or_else(|| DomainError::SelfNotReady {
                path: display.clone(),
            })?;
            root.select(&segments)
        }))
    }

    /// Install the finished tree. Only the first call has an effect.
    pub fn finalize(&self, tree: Value) {
        if self.tree.set(tree).is_err() {
            debug!("self reference already finalized");
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.tree.get().is_some()
    }
}

impl fmt::Debug for SelfRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfRef")
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

/// Build a self-documenting target tree.
///
/// Returns the erased tree extended with `options.help_attribute` (the
/// rendered help passed through `wrapper` and `throw`) and
/// `options.all_attribute` (the erased tree itself).
pub fn with_help<F>(options: &HelpOptions, build: F) -> DomainResult<Value>
where
    F: FnOnce(&SelfRef, &Annotator) -> Value,
{
    try_with_help(options, |self_ref, annotator| {
        Ok::<_, DomainError>(build(self_ref, annotator))
    })
}

/// [`with_help`] for builders that can fail.
#[instrument(level = "debug", skip_all, fields(help = %options.help_attribute))]
pub fn try_with_help<F, E>(options: &HelpOptions, build: F) -> Result<Value, E>
where
    F: FnOnce(&SelfRef, &Annotator) -> Result<Value, E>,
    E: From<DomainError>,
{
    let self_ref = SelfRef::new();
    let raw = build(&self_ref, &options.annotate)?;

    let erased = erase(&raw);
    let Value::Attrs(mut public) = erased.clone() else {
        return Err(DomainError::NotAttrs {
            path: "<root>".to_string(),
        }
        .into());
    };
    self_ref.finalize(erased.clone());

    let entries = collect_help_entries(options, &raw);
    let text = render(options, entries);
    debug!(lines = text.lines().count(), "rendered help");

    public.insert(
        options.help_attribute.clone(),
        (options.throw)((options.wrapper)(&text)),
    );
    public.insert(options.all_attribute.clone(), erased);
    Ok(Value::Attrs(public))
}
