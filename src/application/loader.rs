//! Target files: TOML documents describing a raw (annotated) target tree
//!
//! Ordinary keys become attributes. Keys starting with `__` are directives
//! that shape the table they appear in:
//!
//! ```toml
//! [build]
//! __help = "Build all packages"
//!
//! [build.frontend]
//! __help = "Bundle the web UI"
//! __artifact = "frontend-1.2.0"
//! out = "/store/frontend-1.2.0"
//!
//! [test]
//! unit = { __help = "Run unit tests", __value = "cargo test" }
//! broken = { __help = "Not on this platform", __error = "unsupported system" }
//! ui = { __help = "Alias for build.frontend", __ref = "build.frontend" }
//! ```

use std::path::Path;

use tracing::debug;

use crate::application::help::SelfRef;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    format_attr_path, shallow_annotate, Annotated, Annotator, Artifact, Attrs, Thunk, Value,
};

pub const DIRECTIVE_PREFIX: &str = "__";

/// Parse target file content into a TOML table (key order preserved).
pub fn parse_targets(content: &str, origin: &Path) -> ApplicationResult<toml::Table> {
    toml::from_str(content).map_err(|e| ApplicationError::TargetsParse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Converts TOML tables into raw target trees.
pub struct TargetLoader<'a> {
    self_ref: &'a SelfRef,
    annotator: &'a Annotator,
}

impl<'a> TargetLoader<'a> {
    pub fn new(self_ref: &'a SelfRef, annotator: &'a Annotator) -> Self {
        Self {
            self_ref,
            annotator,
        }
    }

    pub fn load_table(&self, table: &toml::Table) -> ApplicationResult<Value> {
        let mut path = Vec::new();
        let tree = self.table_value(&mut path, table)?;
        debug!(keys = table.len(), "loaded target tree");
        Ok(tree)
    }

    fn convert(&self, path: &mut Vec<String>, value: &toml::Value) -> ApplicationResult<Value> {
        Ok(match value {
            toml::Value::String(s) => Value::Str(s.clone()),
            toml::Value::Integer(i) => Value::Int(*i),
            toml::Value::Float(x) => Value::Float(*x),
            toml::Value::Boolean(b) => Value::Bool(*b),
            toml::Value::Datetime(d) => Value::Str(d.to_string()),
            toml::Value::Array(items) => {
                let mut converted = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(index.to_string());
                    let item = self.convert(path, item);
                    path.pop();
                    converted.push(item?);
                }
                Value::List(converted)
            }
            toml::Value::Table(table) => self.table_value(path, table)?,
        })
    }

    fn table_value(&self, path: &mut Vec<String>, table: &toml::Table) -> ApplicationResult<Value> {
        let mut attrs = Attrs::new();
        let mut directives = Directives::default();

        for (key, value) in table {
            if let Some(name) = key.strip_prefix(DIRECTIVE_PREFIX) {
                directives
                    .set(name, value)
                    .map_err(|reason| invalid(path.as_slice(), reason))?;
                continue;
            }
            path.push(key.clone());
            let converted = self.convert(path, value);
            path.pop();
            attrs.insert(key.clone(), converted?);
        }

        let base = self.base_value(path, &directives, attrs)?;
        Ok(match (directives.help, directives.shallow) {
            (Some(help), true) => shallow_annotate(help, base),
            (Some(help), false) => self.annotator.help(help, base),
            (None, true) => Annotated::new(None, base, true).into(),
            (None, false) => base,
        })
    }

    fn base_value(
        &self,
        path: &mut Vec<String>,
        directives: &Directives<'_>,
        attrs: Attrs,
    ) -> ApplicationResult<Value> {
        let exclusive = [
            directives.value.is_some(),
            directives.reference.is_some(),
            directives.error.is_some(),
            directives.artifact.is_some(),
        ];
        if exclusive.iter().filter(|set| **set).count() > 1 {
            return Err(invalid(
                path,
                "only one of __value, __ref, __error, __artifact is allowed".to_string(),
            ));
        }
        let standalone = directives.value.is_some()
            || directives.reference.is_some()
            || directives.error.is_some();
        if standalone && !attrs.is_empty() {
            return Err(invalid(
                path,
                "__value, __ref and __error cannot be combined with attributes".to_string(),
            ));
        }

        if let Some(value) = directives.value {
            return self.convert(path, value);
        }
        if let Some(reference) = directives.reference {
            return Ok(self.self_ref.get(reference));
        }
        if let Some(message) = directives.error {
            return Ok(Value::Thunk(Thunk::failing(message)));
        }
        if let Some(name) = directives.artifact {
            return Ok(Value::Artifact(Artifact {
                name: name.to_string(),
                attrs,
            }));
        }
        Ok(Value::Attrs(attrs))
    }
}

#[derive(Debug, Default)]
struct Directives<'t> {
    help: Option<&'t str>,
    shallow: bool,
    value: Option<&'t toml::Value>,
    reference: Option<&'t str>,
    error: Option<&'t str>,
    artifact: Option<&'t str>,
}

impl<'t> Directives<'t> {
    fn set(&mut self, name: &str, value: &'t toml::Value) -> Result<(), String> {
        let text = || {
            value
                .as_str()
                .ok_or_else(|| format!("__{name} must be a string"))
        };
        match name {
            "help" => self.help = Some(text()?),
            "shallow" => {
                self.shallow = value
                    .as_bool()
                    .ok_or_else(|| "__shallow must be a boolean".to_string())?
            }
            "value" => self.value = Some(value),
            "ref" => self.reference = Some(text()?),
            "error" => self.error = Some(text()?),
            "artifact" => self.artifact = Some(text()?),
            other => return Err(format!("unknown directive __{other}")),
        }
        Ok(())
    }
}

fn invalid(path: &[String], reason: String) -> ApplicationError {
    let path = if path.is_empty() {
        "<root>".to_string()
    } else {
        format_attr_path(path)
    };
    ApplicationError::InvalidTarget { path, reason }
}
