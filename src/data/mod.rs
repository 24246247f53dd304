//! Data layer module
//!
//! Plain values shared by every other layer:
//! - Cast and author models
//! - Session status
//! - Supported languages

mod language;
mod models;

pub use language::LanguageCode;
pub use models::*;
