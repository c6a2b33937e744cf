//! `slipway new` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::NewArgs;
use slipway::ops::{new_project, NewOptions};

pub fn execute(args: NewArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from(&args.name));

    let opts = NewOptions {
        name: args.name.clone(),
        kind: args.kind,
        library: args.library.clone(),
        init: false,
    };

    let project_file = new_project(&path, &opts)?;
    eprintln!(
        "     Created {} project `{}` ({})",
        args.kind,
        args.name,
        project_file.display()
    );

    Ok(())
}
