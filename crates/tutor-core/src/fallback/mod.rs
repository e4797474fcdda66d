//! Fallback content when the completion service cannot produce a quiz.
//!
//! The catalog only ever serves curated items; it never synthesizes questions
//! or answers for topics it does not know.

mod builtin;
mod catalog;
mod file;

pub use catalog::{CatalogError, FallbackCatalog, FallbackUnavailable};
pub use file::load_catalog;
