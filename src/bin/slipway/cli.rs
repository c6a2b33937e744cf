//! clap argument surface for the slipway binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use slipway::{ExporterKind, ProjectKind};

/// Slipway - one C++ project model, native projects for many toolchains
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Never colorize diagnostics
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new slipway project
    New(NewArgs),

    /// Initialize a slipway project in an existing directory
    Init(InitArgs),

    /// Regenerate sources and write native projects for every target
    Export(ExportArgs),

    /// Inspect or edit the project's toolchain targets
    Targets(TargetsArgs),

    /// Check the environment and project health
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Name of the project to create
    pub name: String,

    /// What the project builds (application, library or audio-plugin)
    #[arg(long, default_value = "application")]
    pub kind: ProjectKind,

    /// Name of the library the project is built against
    #[arg(long)]
    pub library: String,

    /// Directory to create the project in (defaults to the project name)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Name of the project to create (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// What the project builds (application, library or audio-plugin)
    #[arg(long, default_value = "application")]
    pub kind: ProjectKind,

    /// Name of the library the project is built against
    #[arg(long)]
    pub library: String,

    /// Directory to initialize (defaults to the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Project file or directory (defaults to searching upward from the
    /// current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Write the project file to a new location before exporting
    #[arg(long)]
    pub save_as: Option<PathBuf>,

    /// Verify the model survives a serialization round trip
    #[arg(long)]
    pub verify_model: bool,
}

#[derive(Args)]
pub struct TargetsArgs {
    #[command(subcommand)]
    pub command: TargetsCommands,
}

#[derive(Subcommand)]
pub enum TargetsCommands {
    /// List the configured targets
    List(TargetsListArgs),

    /// Add a toolchain target
    Add(TargetsAddArgs),

    /// Remove a toolchain target
    Remove(TargetsRemoveArgs),
}

#[derive(Args)]
pub struct TargetsListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TargetsAddArgs {
    /// Toolchain kind (linux-make, mac-make or msvc)
    pub kind: ExporterKind,

    /// Folder for the native project files, relative to the project dir
    #[arg(long)]
    pub folder: Option<PathBuf>,
}

#[derive(Args)]
pub struct TargetsRemoveArgs {
    /// Toolchain kind to remove
    pub kind: ExporterKind,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
