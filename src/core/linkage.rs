//! Library linkage modes.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// How a generated project pulls in the underlying library's code.
///
/// The mode alone decides which generated artifacts exist: amalgamated modes
/// get source shims plus the config and app headers, an externally linked
/// build keeps the headers but compiles nothing, and `NotLinked` projects get
/// at most an app header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageMode {
    /// The project does not use the library at all.
    NotLinked,
    /// One shim including the single fully-amalgamated source unit.
    AmalgamatedSingle,
    /// One shim including the amalgamation template unit.
    AmalgamatedTemplate,
    /// `n` shims, each including one numbered amalgamated unit.
    AmalgamatedMultiple(u32),
    /// The library is linked as a prebuilt binary; headers only.
    ExternallyLinked,
}

impl LinkageMode {
    /// Whether library source code is compiled into the project.
    pub fn is_amalgamated(&self) -> bool {
        matches!(
            self,
            LinkageMode::AmalgamatedSingle
                | LinkageMode::AmalgamatedTemplate
                | LinkageMode::AmalgamatedMultiple(_)
        )
    }
}

impl fmt::Display for LinkageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkageMode::NotLinked => write!(f, "not-linked"),
            LinkageMode::AmalgamatedSingle => write!(f, "amalgamated-single"),
            LinkageMode::AmalgamatedTemplate => write!(f, "amalgamated-template"),
            LinkageMode::AmalgamatedMultiple(n) => write!(f, "amalgamated-multiple ({} units)", n),
            LinkageMode::ExternallyLinked => write!(f, "externally-linked"),
        }
    }
}

/// Serialized linkage-mode name (the `linkage.mode` key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkageModeKind {
    NotLinked,
    AmalgamatedSingle,
    AmalgamatedTemplate,
    AmalgamatedMultiple,
    ExternallyLinked,
}

/// The `[linkage]` table of a project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkageConfig {
    /// Linkage mode name
    pub mode: LinkageModeKind,

    /// Number of amalgamated units, only meaningful for `amalgamated-multiple`
    #[serde(default, skip_serializing_if = "is_zero")]
    pub amalgamated_files: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl LinkageConfig {
    /// A single-unit amalgamated configuration, the default for new projects.
    pub fn amalgamated_single() -> Self {
        LinkageConfig {
            mode: LinkageModeKind::AmalgamatedSingle,
            amalgamated_files: 0,
        }
    }

    /// Validate the table and resolve it to a [`LinkageMode`].
    pub fn resolve(&self) -> Result<LinkageMode> {
        Ok(match self.mode {
            LinkageModeKind::NotLinked => LinkageMode::NotLinked,
            LinkageModeKind::AmalgamatedSingle => LinkageMode::AmalgamatedSingle,
            LinkageModeKind::AmalgamatedTemplate => LinkageMode::AmalgamatedTemplate,
            LinkageModeKind::AmalgamatedMultiple => {
                if self.amalgamated_files == 0 {
                    bail!("linkage mode `amalgamated-multiple` requires `amalgamated_files` >= 1");
                }
                LinkageMode::AmalgamatedMultiple(self.amalgamated_files)
            }
            LinkageModeKind::ExternallyLinked => LinkageMode::ExternallyLinked,
        })
    }
}
