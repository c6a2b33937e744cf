//! The operations behind each CLI command, usable as a library.

pub mod doctor;
pub mod new;
pub mod save;
pub mod targets;

pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use new::{init_project, new_project, NewOptions};
pub use save::{save_project, ProjectSaver, SaveError, SaveOptions, SaveReport};
pub use targets::{add_target, list_targets, remove_target, TargetRow};
