//! Slipway - a project generator for C++ library consumers
//!
//! One declarative project model in, a deterministic set of generated glue
//! sources and a native build project per configured toolchain out. The CLI
//! in `src/bin/slipway` is a thin layer over the [`ops`] module.

pub mod codegen;
pub mod core;
pub mod exporters;
pub mod ops;
pub mod util;

pub use crate::core::{
    find_project_file, ArtifactPlan, ExporterKind, ExporterSpec, LinkageMode, Project,
    ProjectKind, ProjectModel, PROJECT_FILENAME,
};

pub use crate::exporters::ToolchainExporter;
pub use crate::ops::{save_project, ProjectSaver, SaveError, SaveOptions, SaveReport};
pub use crate::util::UserConfig;
