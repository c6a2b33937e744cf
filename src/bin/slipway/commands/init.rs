//! `slipway init` command

use std::env;

use anyhow::{Context, Result};

use crate::cli::InitArgs;
use slipway::ops::{init_project, NewOptions};

pub fn execute(args: InitArgs) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => env::current_dir().with_context(|| "failed to get current directory")?,
    };

    let name = match args.name {
        Some(name) => name,
        None => {
            let resolved = path.canonicalize().unwrap_or_else(|_| path.clone());
            resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string())
        }
    };

    let opts = NewOptions {
        name,
        kind: args.kind,
        library: args.library,
        init: true,
    };

    let project_file = init_project(&path, &opts)?;
    eprintln!("     Created `{}`", project_file.display());

    Ok(())
}
