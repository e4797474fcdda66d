//! CLI command handlers. Each command is in its own file.

mod fallback;
mod quiz;
mod render;
mod topics;

pub use fallback::run_fallback;
pub use quiz::run_quiz;
pub use topics::run_topics;
