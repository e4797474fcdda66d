pub mod config;
pub mod logging;

pub mod client;
pub mod fallback;
pub mod quiz;
pub mod remote;
pub mod retry;
