//! `slipway doctor` command

use std::env;

use anyhow::{Context, Result};

use crate::cli::DoctorArgs;
use slipway::ops::{doctor, format_report};
use slipway::util::config::config_for_project;
use slipway::{find_project_file, Project};

pub fn execute(args: DoctorArgs, verbose: bool) -> Result<()> {
    let cwd = env::current_dir().with_context(|| "failed to get current directory")?;
    let project = match find_project_file(&cwd) {
        Some(path) => Some(Project::load(&path)?),
        None => None,
    };

    let config_root = project.as_ref().map(|p| p.dir().to_path_buf());
    let config = config_for_project(config_root.as_deref().unwrap_or(&cwd));

    let report = doctor(project.as_ref(), &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, verbose));
    }

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
