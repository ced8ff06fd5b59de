pub mod catalog;
pub mod config;
pub mod digest;
pub mod discover;
pub mod error;
pub mod manifest;
pub mod manifest_codec;
pub mod path;
pub mod reconcile;
pub mod report;
pub mod scan;
pub mod verify;

pub use config::{HashMode, RunConfig};
pub use digest::DigestSet;
pub use error::{Error, Result};
pub use manifest::Manifest;
pub use path::FilePath;
pub use reconcile::{Outcome, Reconciliation};
