// Frameworks: runtime wiring and configuration.

pub mod config;
pub mod server;
