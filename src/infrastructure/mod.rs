//! Infrastructure layer providing file system integrations.
//!
//! Loading form definitions and probing files picked for upload.

pub mod persistence;
pub mod files;

pub use persistence::*;
pub use files::*;
