//! The project model and everything derived from it before a file is
//! written: the on-disk form (`Slipway.toml`), linkage modes and the
//! artifact plan they imply, and the version encoders.

pub mod linkage;
pub mod plan;
pub mod project;
pub mod version;

pub use linkage::{LinkageConfig, LinkageMode, LinkageModeKind};
pub use plan::ArtifactPlan;
pub use project::{
    find_project_file, ExporterKind, ExporterSpec, Project, ProjectKind, ProjectModel,
    PROJECT_FILENAME,
};
