//! `slipway targets` command

use std::env;

use anyhow::{bail, Context, Result};

use crate::cli::{TargetsArgs, TargetsCommands};
use slipway::ops::{add_target, list_targets, remove_target};
use slipway::{find_project_file, Project, PROJECT_FILENAME};

pub fn execute(args: TargetsArgs) -> Result<()> {
    let cwd = env::current_dir().with_context(|| "failed to get current directory")?;
    let project_file = match find_project_file(&cwd) {
        Some(path) => path,
        None => bail!(
            "no {} found in {} or any parent directory",
            PROJECT_FILENAME,
            cwd.display()
        ),
    };

    match args.command {
        TargetsCommands::List(list) => {
            let project = Project::load(&project_file)?;
            let rows = list_targets(&project);
            if list.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("no targets configured");
            } else {
                for row in rows {
                    println!("{:<12} {:<18} {}", row.kind.to_string(), row.name, row.folder);
                }
            }
        }
        TargetsCommands::Add(add) => {
            add_target(&project_file, add.kind, add.folder.as_deref())?;
            eprintln!("     Added {} target", add.kind.display_name());
        }
        TargetsCommands::Remove(remove) => {
            let removed = remove_target(&project_file, remove.kind)?;
            if removed == 0 {
                bail!("no `{}` target declared in {}", remove.kind, project_file.display());
            }
            eprintln!("     Removed {} target", remove.kind.display_name());
        }
    }

    Ok(())
}
