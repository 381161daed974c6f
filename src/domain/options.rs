//! Help options: the pluggable policy used by collection, rendering and `with_help`

use std::fmt;
use std::rc::Rc;

use crate::domain::annotation::Annotator;
use crate::domain::entities::HelpEntry;
use crate::domain::render::{render_entry, sort_entries};
use crate::domain::value::{Thunk, Value};

/// Header prepended to the rendered help text by the default wrapper.
pub const DEFAULT_HEADER: &str = "Available targets:";

pub type Predicate = Rc<dyn Fn(&Value) -> bool>;
pub type PrepareEntries = Rc<dyn Fn(Vec<HelpEntry>) -> Vec<HelpEntry>>;
pub type RenderEntry = Rc<dyn Fn(&HelpEntry) -> Vec<String>>;
pub type Wrapper = Rc<dyn Fn(&str) -> String>;
pub type Throw = Rc<dyn Fn(String) -> Value>;

#[derive(Clone)]
pub struct HelpOptions {
    /// Annotation constructor handed to tree builders.
    pub annotate: Annotator,
    /// Attribute carrying the help text in the finished tree.
    pub help_attribute: String,
    /// Attribute aliasing the whole erased tree.
    pub all_attribute: String,
    /// Turns the rendered entries into the final message.
    pub wrapper: Wrapper,
    /// Turns the final message into the help attribute's value.
    pub throw: Throw,
    /// Only list annotated positions; no unannotated leaves.
    pub annotated_attrs_only: bool,
    /// Mappings for which unannotated leaves are never listed.
    pub should_skip: Predicate,
    /// Path prefix for every collected entry.
    pub base_path: Vec<String>,
    pub prepare_entries: PrepareEntries,
    pub render_entry: RenderEntry,
    /// Appended after the collected entries.
    pub additional_entries: Vec<HelpEntry>,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self {
            annotate: Annotator::deep(),
            help_attribute: "help".to_string(),
            all_attribute: "all".to_string(),
            wrapper: header_wrapper(DEFAULT_HEADER),
            throw: Rc::new(throw_message),
            annotated_attrs_only: true,
            should_skip: Rc::new(Value::is_artifact),
            base_path: Vec::new(),
            prepare_entries: Rc::new(sort_entries),
            render_entry: Rc::new(render_entry),
            additional_entries: Vec::new(),
        }
    }
}

impl HelpOptions {
    /// Help attribute evaluates to the text itself instead of failing with it.
    pub fn returning_text(mut self) -> Self {
        self.throw = Rc::new(|message| Value::Str(message));
        self
    }

    pub fn with_annotator(mut self, annotate: Annotator) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn with_help_attribute(mut self, name: impl Into<String>) -> Self {
        self.help_attribute = name.into();
        self
    }

    pub fn with_all_attribute(mut self, name: impl Into<String>) -> Self {
        self.all_attribute = name.into();
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.wrapper = header_wrapper(header);
        self
    }

    pub fn with_wrapper(mut self, wrapper: impl Fn(&str) -> String + 'static) -> Self {
        self.wrapper = Rc::new(wrapper);
        self
    }

    pub fn with_throw(mut self, throw: impl Fn(String) -> Value + 'static) -> Self {
        self.throw = Rc::new(throw);
        self
    }

    pub fn with_annotated_attrs_only(mut self, only: bool) -> Self {
        self.annotated_attrs_only = only;
        self
    }

    pub fn with_should_skip(mut self, should_skip: impl Fn(&Value) -> bool + 'static) -> Self {
        self.should_skip = Rc::new(should_skip);
        self
    }

    pub fn with_base_path<S: Into<String>>(
        mut self,
        base_path: impl IntoIterator<Item = S>,
    ) -> Self {
        self.base_path = base_path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prepare_entries(
        mut self,
        prepare: impl Fn(Vec<HelpEntry>) -> Vec<HelpEntry> + 'static,
    ) -> Self {
        self.prepare_entries = Rc::new(prepare);
        self
    }

    pub fn with_render_entry(
        mut self,
        render: impl Fn(&HelpEntry) -> Vec<String> + 'static,
    ) -> Self {
        self.render_entry = Rc::new(render);
        self
    }

    pub fn with_additional_entries(mut self, entries: Vec<HelpEntry>) -> Self {
        self.additional_entries = entries;
        self
    }
}

impl fmt::Debug for HelpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpOptions")
            .field("help_attribute", &self.help_attribute)
            .field("all_attribute", &self.all_attribute)
            .field("annotated_attrs_only", &self.annotated_attrs_only)
            .field("base_path", &self.base_path)
            .field("additional_entries", &self.additional_entries.len())
            .finish_non_exhaustive()
    }
}

/// Default `throw`: a value that fails with `message` when forced.
pub fn throw_message(message: String) -> Value {
    Value::Thunk(Thunk::failing(message))
}

fn header_wrapper(header: impl Into<String>) -> Wrapper {
    let header = header.into();
    Rc::new(move |text: &str| {
        if header.is_empty() {
            text.to_string()
        } else {
            format!("{header}\n\n{text}")
        }
    })
}
