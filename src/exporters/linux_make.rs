//! GNU make exporter for Linux toolchains.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{Project, ProjectKind};
use crate::util::fs;

use super::{map_from_base, product_name, ToolchainExporter};

/// Emits a `Makefile` driving g++.
#[derive(Debug)]
pub struct LinuxMakeExporter {
    target_folder: PathBuf,
    include_base: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl LinuxMakeExporter {
    pub fn new(target_folder: PathBuf, include_base: PathBuf) -> Self {
        LinuxMakeExporter {
            target_folder,
            include_base,
            artifacts: Vec::new(),
        }
    }

    fn makefile_text(&self, project: &Project) -> String {
        let mut out = String::new();
        out.push_str(
            "# Auto-generated by slipway. Any edits will be overwritten on the next export.\n\n",
        );
        out.push_str("CXX ?= g++\n");
        out.push_str(&format!(
            "CPPFLAGS := -D{}=1 $(CPPFLAGS)\n",
            self.identifier_macro()
        ));
        out.push_str("CXXFLAGS := -O2 -fPIC $(CXXFLAGS)\n");
        out.push_str("LDFLAGS := $(LDFLAGS)\n\n");

        out.push_str(&format!("TARGET := {}\n", product_name(project)));

        out.push_str("SOURCES := \\\n");
        for source in self.sources() {
            out.push_str(&format!("  {} \\\n", fs::forward_slashes(source)));
        }
        out.push('\n');
        out.push_str("OBJECTS := $(SOURCES:.cpp=.o)\n\n");

        out.push_str("all: $(TARGET)\n\n");
        out.push_str("$(TARGET): $(OBJECTS)\n");
        out.push_str(&match project.kind() {
            ProjectKind::Application => "\t$(CXX) $(LDFLAGS) -o $@ $(OBJECTS)\n\n".to_string(),
            ProjectKind::Library => "\tar rcs $@ $(OBJECTS)\n\n".to_string(),
            ProjectKind::AudioPlugin => {
                "\t$(CXX) -shared $(LDFLAGS) -o $@ $(OBJECTS)\n\n".to_string()
            }
        });

        out.push_str("%.o: %.cpp\n");
        out.push_str("\t$(CXX) $(CPPFLAGS) $(CXXFLAGS) -c -o $@ $<\n\n");

        out.push_str("clean:\n");
        out.push_str("\trm -f $(TARGET) $(OBJECTS)\n\n");
        out.push_str(".PHONY: all clean\n");
        out
    }

    fn sources(&self) -> impl Iterator<Item = &PathBuf> {
        self.artifacts
            .iter()
            .filter(|a| a.extension().is_some_and(|e| e == "cpp"))
    }
}

impl ToolchainExporter for LinuxMakeExporter {
    fn name(&self) -> &str {
        "Linux Makefile"
    }

    fn identifier_macro(&self) -> &str {
        "SLIPWAY_LINUX_MAKE"
    }

    fn target_folder(&self) -> &Path {
        &self.target_folder
    }

    fn map_include_path(&self, logical_path: &str) -> String {
        map_from_base(&self.include_base, logical_path)
    }

    fn receive_generated_artifacts(&mut self, artifacts: Vec<PathBuf>) {
        self.artifacts = artifacts;
    }

    fn export(&self, project: &Project) -> Result<()> {
        let path = self.target_folder.join("Makefile");
        fs::write_if_different(&path, self.makefile_text(project).as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("wrote {}", path.display());
        Ok(())
    }
}
