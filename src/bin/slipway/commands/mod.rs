//! One module per subcommand.

pub mod completions;
pub mod doctor;
pub mod export;
pub mod init;
pub mod new;
pub mod targets;
