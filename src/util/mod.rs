//! Cross-cutting helpers: files, config, hashing, terminal output.

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod hash;

pub use config::UserConfig;
pub use diagnostic::Diagnostic;
