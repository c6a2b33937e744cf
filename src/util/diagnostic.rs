//! Terminal diagnostics for the slipway CLI.
//!
//! An export that breaks on two toolchains should show both failures, each
//! with the file it concerns and a concrete next step. Commands build one
//! `Diagnostic` per failure and emit them before deciding the exit status.

use std::fmt;
use std::path::PathBuf;

/// Canned next-step lines shared by the commands.
pub mod suggestions {
    /// Next step when no project file is found.
    pub const NO_PROJECT: &str = "Run `slipway new <name>` to create a project";

    /// Next step when an export fails.
    pub const EXPORT_FAILED: &str = "Run `slipway export --verbose` for more details";

    /// Next step when the project declares no exporters.
    pub const NO_EXPORTERS: &str = "Run `slipway targets add <kind>` to configure a build target";

    /// Next step when a toolchain export fails.
    pub const TOOL_MISSING: &str = "Run `slipway doctor` to check your environment";
}

/// How a diagnostic is labelled on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
        }
    }
}

/// One message destined for stderr: a headline, the path it concerns, and
/// follow-up `note:` and `help:` lines.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    headline: String,
    path: Option<PathBuf>,
    notes: Vec<String>,
    help: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, headline: impl Into<String>) -> Diagnostic {
        Diagnostic {
            severity,
            headline: headline.into(),
            path: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    pub fn error(headline: impl Into<String>) -> Diagnostic {
        Diagnostic::new(Severity::Error, headline)
    }

    pub fn warning(headline: impl Into<String>) -> Diagnostic {
        Diagnostic::new(Severity::Warning, headline)
    }

    /// Name the file or folder the diagnostic is about.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Diagnostic {
        self.path = Some(path.into());
        self
    }

    /// Add a `note:` line elaborating on the headline.
    pub fn with_note(mut self, note: impl Into<String>) -> Diagnostic {
        self.notes.push(note.into());
        self
    }

    /// Add a `help:` line with a concrete next step.
    pub fn with_suggestion(mut self, help: impl Into<String>) -> Diagnostic {
        self.help.push(help.into());
        self
    }

    /// Render in the compiler style: the headline first, then one indented
    /// line per note and suggestion.
    pub fn render(&self, color: bool) -> String {
        let mut out = format!("{}: {}\n", self.severity.label(color), self.headline);
        if let Some(path) = &self.path {
            out.push_str(&format!("  --> {}\n", path.display()));
        }
        for note in &self.notes {
            out.push_str(&format!("  = note: {}\n", note));
        }
        for help in &self.help {
            out.push_str(&format!("  = help: {}\n", help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.render(color));
}
