//! Domain layer: target tree values, annotation, erasure and rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod annotation;
pub mod entities;
pub mod error;
pub mod options;
pub mod path;
pub mod render;
pub mod transform;
pub mod value;

pub use annotation::{
    annotate, annotation_of, is_annotated, shallow_annotate, zip_help, Annotated, Annotator,
};
pub use entities::HelpEntry;
pub use error::{DomainError, DomainResult};
pub use options::{throw_message, HelpOptions, DEFAULT_HEADER};
pub use path::{format_attr_path, parse_attr_path};
pub use render::{render, render_entry, sort_entries};
pub use transform::{collect_help_entries, erase, rewrite, Rewrite};
pub use value::{Artifact, Attrs, Thunk, Value, MAX_FORCE_DEPTH};
