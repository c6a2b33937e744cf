//! Embedded resource bundling.
//!
//! Resource entries in the project model are glob patterns relative to the
//! project directory. Matched files are embedded as byte arrays in a
//! generated source/header pair, so projects can ship binary data without
//! touching any build system.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::Project;
use crate::util::fs;

use super::headers::{banner, header_guard};

/// One embedded file.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// C identifier the data is exposed under
    pub ident: String,

    /// Original location, relative to the project dir
    pub path: PathBuf,

    /// File contents
    pub data: Vec<u8>,
}

/// The set of files matched by the project's resource patterns.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    entries: Vec<ResourceEntry>,
}

impl ResourceBundle {
    /// An empty bundle.
    pub fn empty() -> ResourceBundle {
        ResourceBundle::default()
    }

    /// Expand the project's resource globs and load the matched files.
    ///
    /// Matches are sorted and deduplicated, so the generated bundle is
    /// byte-identical across runs for an unchanged file set.
    pub fn collect(project: &Project) -> Result<ResourceBundle> {
        let files = fs::glob_files(project.dir(), &project.model().resources)?;

        let mut entries = Vec::new();
        let mut used: HashSet<String> = HashSet::new();

        for path in files {
            let data = std::fs::read(&path)
                .with_context(|| format!("failed to read resource: {}", path.display()))?;

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let base = resource_ident(&file_name);
            let mut ident = base.clone();
            let mut n = 2;
            while !used.insert(ident.clone()) {
                ident = format!("{}_{}", base, n);
                n += 1;
            }

            entries.push(ResourceEntry {
                ident,
                path: fs::relative_path(project.dir(), &path),
                data,
            });
        }

        Ok(ResourceBundle { entries })
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of all embedded data in bytes.
    pub fn total_size(&self) -> usize {
        self.entries.iter().map(|e| e.data.len()).sum()
    }

    /// Render the declarations header (`ResourceData.h`).
    pub fn render_header(&self, header_path: &Path) -> String {
        let guard = header_guard("RESOURCEDATA", header_path);
        let mut out = banner("Declarations for the project's embedded resource data.");

        out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
        out.push_str("namespace ResourceData\n{\n");
        for entry in &self.entries {
            out.push_str(&format!("    // {}\n", fs::forward_slashes(&entry.path)));
            out.push_str(&format!("    extern const char*  {};\n", entry.ident));
            out.push_str(&format!(
                "    const int           {}Size = {};\n\n",
                entry.ident,
                entry.data.len()
            ));
        }
        out.push_str("}\n");
        out.push_str(&format!("\n#endif   // {}\n", guard));
        out
    }

    /// Render the definitions file (`ResourceData.cpp`).
    pub fn render_source(&self) -> String {
        let mut out = banner("Definitions of the project's embedded resource data.");
        out.push_str("#include \"ResourceData.h\"\n\n");

        for entry in &self.entries {
            out.push_str(&byte_array(&format!("resource_{}", entry.ident), &entry.data));
            out.push_str(&format!(
                "const char* ResourceData::{} = (const char*) resource_{};\n\n",
                entry.ident, entry.ident
            ));
        }

        out
    }
}

/// Turn a file name into a C identifier.
fn resource_ident(file_name: &str) -> String {
    let mut ident: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident.is_empty() {
        ident.push_str("resource");
    }
    ident
}

fn byte_array(name: &str, data: &[u8]) -> String {
    let mut out = format!("static const unsigned char {}[] = {{", name);
    for (i, b) in data.iter().enumerate() {
        if i % 16 == 0 {
            out.push_str("\n    ");
        }
        out.push_str(&format!("{},", b));
    }
    if data.len() % 16 == 0 {
        out.push_str("\n    ");
    }
    // Trailing zero keeps text resources usable as C strings.
    out.push_str("0 };\n\n");
    out
}
