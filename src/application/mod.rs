//! Application layer: composition and target file services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod help;
pub mod loader;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use help::{try_with_help, with_help, SelfRef};
pub use loader::{parse_targets, TargetLoader};
