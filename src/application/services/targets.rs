//! Target tree service
//!
//! Loads target files and answers help, listing and lookup requests.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::help::{try_with_help, SelfRef};
use crate::application::loader::{parse_targets, TargetLoader};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{collect_help_entries, erase, parse_attr_path, HelpEntry, HelpOptions, Value};
use crate::infrastructure::traits::FileSystem;

/// What to include in rendered help.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRequest {
    /// List unannotated leaves as well.
    pub all: bool,
    /// Dotted prefix for every listed path.
    pub base_path: Option<String>,
    /// Omit the header.
    pub raw: bool,
}

/// Service for loading and documenting target trees.
pub struct TargetService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TargetService {
    /// Create a new target service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Help options derived from the effective settings.
    pub fn options(&self) -> HelpOptions {
        self.settings.help_options()
    }

    /// Load a target file into its public tree (erased, with help and all attributes).
    pub fn load(&self, file: &Path, options: &HelpOptions) -> ApplicationResult<Value> {
        let table = self.read_targets(file)?;
        try_with_help(options, |self_ref, annotator| {
            TargetLoader::new(self_ref, annotator).load_table(&table)
        })
    }

    /// The help text carried by the help attribute.
    #[instrument(skip(self))]
    pub fn doc(&self, file: &Path, request: &DocRequest) -> ApplicationResult<String> {
        let options = self.doc_options(request)?;
        let tree = self.load(file, &options)?;
        match tree.select(&[options.help_attribute.as_str()])? {
            Value::Str(text) => Ok(text),
            other => Err(ApplicationError::Config {
                message: format!(
                    "help attribute '{}' evaluated to {}, expected a string",
                    options.help_attribute,
                    other.type_name()
                ),
            }),
        }
    }

    /// Help entries in render order.
    #[instrument(skip(self))]
    pub fn entries(&self, file: &Path, all: bool) -> ApplicationResult<Vec<HelpEntry>> {
        let options = self
            .options()
            .with_annotated_attrs_only(self.settings.annotated_attrs_only && !all);
        let table = self.read_targets(file)?;

        let self_ref = SelfRef::new();
        let raw = TargetLoader::new(&self_ref, &options.annotate).load_table(&table)?;
        self_ref.finalize(erase(&raw));

        let entries = (options.prepare_entries)(collect_help_entries(&options, &raw));
        debug!("entries: {} documented paths", entries.len());
        Ok(entries)
    }

    /// Value at a dotted path of the public tree, forced all the way down.
    ///
    /// Forcing the help attribute fails with the help text; so does any
    /// failing value below `path`.
    #[instrument(skip(self))]
    pub fn get(&self, file: &Path, path: &str) -> ApplicationResult<Value> {
        Ok(self.lookup(file, path)?.force_deep()?)
    }

    /// Value at a dotted path of the public tree, forced only at the top.
    ///
    /// Nested thunks stay deferred, so failures below `path` do not abort.
    #[instrument(skip(self))]
    pub fn lookup(&self, file: &Path, path: &str) -> ApplicationResult<Value> {
        let segments = parse_attr_path(path)?;
        let tree = self.load(file, &self.options())?;
        Ok(tree.select(&segments)?)
    }

    fn doc_options(&self, request: &DocRequest) -> ApplicationResult<HelpOptions> {
        let mut options = self
            .options()
            .returning_text()
            .with_annotated_attrs_only(self.settings.annotated_attrs_only && !request.all);
        if let Some(base_path) = &request.base_path {
            options = options.with_base_path(parse_attr_path(base_path)?);
        }
        if request.raw {
            options = options.with_header("");
        }
        Ok(options)
    }

    fn read_targets(&self, file: &Path) -> ApplicationResult<toml::Table> {
        debug!("read_targets: file={}", file.display());
        if !self.fs.is_file(file) {
            return Err(ApplicationError::TargetsNotFound(file.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(file)
            .with_path_context("read targets file", file)?;
        parse_targets(&content, file)
    }
}
