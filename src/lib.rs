//! Self-documenting target trees.
//!
//! A builder produces a tree of attribute sets whose entries may be wrapped
//! with help text. [`application::with_help`] erases the wrappers, renders a
//! sorted listing of the documented paths and attaches it to the tree:
//!
//! ```
//! use helptree::application::with_help;
//! use helptree::domain::{HelpOptions, Value};
//!
//! let options = HelpOptions::default().returning_text();
//! let tree = with_help(&options, |_, help| {
//!     Value::attrs([("x", help.help("desc", 42))])
//! })
//! .unwrap();
//!
//! assert_eq!(tree.select(&["all", "x"]).unwrap(), Value::Int(42));
//! assert_eq!(
//!     tree.select(&["help"]).unwrap(),
//!     Value::from("Available targets:\n\nx - desc")
//! );
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
