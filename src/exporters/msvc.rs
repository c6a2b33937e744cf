//! Visual Studio project exporter.
//!
//! Emits a minimal MSBuild `.vcxproj` referencing the generated sources. The
//! project is self-contained enough for `msbuild` from a developer prompt;
//! solution files and per-configuration tuning are left to the user.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{Project, ProjectKind};
use crate::util::fs;

use super::{map_from_base, sanitized_stem, ToolchainExporter};

/// Emits a `.vcxproj` MSBuild project for Visual Studio.
#[derive(Debug)]
pub struct MsvcExporter {
    target_folder: PathBuf,
    include_base: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl MsvcExporter {
    pub fn new(target_folder: PathBuf, include_base: PathBuf) -> Self {
        MsvcExporter {
            target_folder,
            include_base,
            artifacts: Vec::new(),
        }
    }

    fn configuration_type(project: &Project) -> &'static str {
        match project.kind() {
            ProjectKind::Application => "Application",
            ProjectKind::Library => "StaticLibrary",
            ProjectKind::AudioPlugin => "DynamicLibrary",
        }
    }

    fn vcxproj_text(&self, project: &Project) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push_str("<Project DefaultTargets=\"Build\" ToolsVersion=\"4.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n");

        out.push_str("  <ItemGroup Label=\"ProjectConfigurations\">\n");
        out.push_str("    <ProjectConfiguration Include=\"Release|x64\">\n");
        out.push_str("      <Configuration>Release</Configuration>\n");
        out.push_str("      <Platform>x64</Platform>\n");
        out.push_str("    </ProjectConfiguration>\n");
        out.push_str("  </ItemGroup>\n");

        out.push_str("  <PropertyGroup Label=\"Globals\">\n");
        out.push_str(&format!(
            "    <ProjectName>{}</ProjectName>\n",
            xml_escape(project.name())
        ));
        out.push_str("  </PropertyGroup>\n");
        out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.Default.props\" />\n");

        out.push_str("  <PropertyGroup>\n");
        out.push_str(&format!(
            "    <ConfigurationType>{}</ConfigurationType>\n",
            Self::configuration_type(project)
        ));
        out.push_str("    <PlatformToolset>$(DefaultPlatformToolset)</PlatformToolset>\n");
        out.push_str("    <CharacterSet>Unicode</CharacterSet>\n");
        out.push_str("  </PropertyGroup>\n");
        out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.props\" />\n");

        out.push_str("  <ItemDefinitionGroup>\n");
        out.push_str("    <ClCompile>\n");
        out.push_str(&format!(
            "      <PreprocessorDefinitions>{}=1;%(PreprocessorDefinitions)</PreprocessorDefinitions>\n",
            self.identifier_macro()
        ));
        out.push_str("      <Optimization>MaxSpeed</Optimization>\n");
        out.push_str("    </ClCompile>\n");
        out.push_str("  </ItemDefinitionGroup>\n");

        out.push_str("  <ItemGroup>\n");
        for source in self.artifacts_with_extension("cpp") {
            out.push_str(&format!(
                "    <ClCompile Include=\"{}\" />\n",
                backslashes(source)
            ));
        }
        out.push_str("  </ItemGroup>\n");

        out.push_str("  <ItemGroup>\n");
        for header in self.artifacts_with_extension("h") {
            out.push_str(&format!(
                "    <ClInclude Include=\"{}\" />\n",
                backslashes(header)
            ));
        }
        out.push_str("  </ItemGroup>\n");

        out.push_str("  <Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />\n");
        out.push_str("</Project>\n");
        out
    }

    fn artifacts_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a PathBuf> {
        self.artifacts
            .iter()
            .filter(move |a| a.extension().is_some_and(|e| e == ext))
    }
}

impl ToolchainExporter for MsvcExporter {
    fn name(&self) -> &str {
        "Visual Studio"
    }

    fn identifier_macro(&self) -> &str {
        "SLIPWAY_MSVC"
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
        let path = self
            .target_folder
            .join(format!("{}.vcxproj", sanitized_stem(project)));
        fs::write_if_different(&path, self.vcxproj_text(project).as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("wrote {}", path.display());
        Ok(())
    }
}

fn backslashes(path: &Path) -> String {
    fs::forward_slashes(path).replace('/', "\\")
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
