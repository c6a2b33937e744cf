//! Makefile exporter for macOS toolchains.
//!
//! Drives clang++ directly instead of emitting an Xcode project. Shims are
//! handed over with the `.mm` extension so Objective-C++ is available to the
//! library code on this platform.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{Project, ProjectKind};
use crate::util::fs;

use super::{map_from_base, product_name, ToolchainExporter};

/// Emits a `Makefile` driving clang++ with Objective-C++ enabled.
#[derive(Debug)]
pub struct MacMakeExporter {
    target_folder: PathBuf,
    include_base: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl MacMakeExporter {
    pub fn new(target_folder: PathBuf, include_base: PathBuf) -> Self {
        MacMakeExporter {
            target_folder,
            include_base,
            artifacts: Vec::new(),
        }
    }

    fn frameworks(project: &Project) -> &'static str {
        if project.kind().is_audio_plugin() {
            "-framework Cocoa -framework IOKit -framework AudioUnit -framework AudioToolbox -framework CoreAudio"
        } else {
            "-framework Cocoa -framework IOKit"
        }
    }

    fn makefile_text(&self, project: &Project) -> String {
        let mut out = String::new();
        out.push_str(
            "# Auto-generated by slipway. Any edits will be overwritten on the next export.\n\n",
        );
        out.push_str("CXX ?= clang++\n");
        out.push_str(&format!(
            "CPPFLAGS := -D{}=1 $(CPPFLAGS)\n",
            self.identifier_macro()
        ));
        out.push_str("CXXFLAGS := -O2 $(CXXFLAGS)\n");
        out.push_str(&format!("FRAMEWORKS := {}\n\n", Self::frameworks(project)));

        out.push_str(&format!("TARGET := {}\n", product_name(project)));

        out.push_str("SOURCES := \\\n");
        for source in self.sources() {
            out.push_str(&format!("  {} \\\n", fs::forward_slashes(source)));
        }
        out.push('\n');
        out.push_str("OBJECTS := $(addsuffix .o,$(basename $(SOURCES)))\n\n");

        out.push_str("all: $(TARGET)\n\n");
        out.push_str("$(TARGET): $(OBJECTS)\n");
        out.push_str(&match project.kind() {
            ProjectKind::Application => {
                "\t$(CXX) $(FRAMEWORKS) -o $@ $(OBJECTS)\n\n".to_string()
            }
            ProjectKind::Library => "\tar rcs $@ $(OBJECTS)\n\n".to_string(),
            ProjectKind::AudioPlugin => {
                "\t$(CXX) -bundle $(FRAMEWORKS) -o $@ $(OBJECTS)\n\n".to_string()
            }
        });

        // Objective-C++ for the .mm shims, plain C++ for everything else.
        out.push_str("%.o: %.mm\n");
        out.push_str("\t$(CXX) -ObjC++ $(CPPFLAGS) $(CXXFLAGS) -c -o $@ $<\n\n");
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
            .filter(|a| a.extension().is_some_and(|e| e == "cpp" || e == "mm"))
    }
}

impl ToolchainExporter for MacMakeExporter {
    fn name(&self) -> &str {
        "macOS Makefile"
    }

    fn identifier_macro(&self) -> &str {
        "SLIPWAY_MAC_MAKE"
    }

    fn target_folder(&self) -> &Path {
        &self.target_folder
    }

    fn map_include_path(&self, logical_path: &str) -> String {
        map_from_base(&self.include_base, logical_path)
    }

    fn uses_alternate_source_extension(&self) -> bool {
        true
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
