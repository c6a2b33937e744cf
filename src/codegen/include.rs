//! Conditional include resolution.
//!
//! Different toolchains can see the library tree at different locations, so a
//! generated file that includes an amalgamated unit may need a different
//! include path per toolchain. The resolver computes the per-toolchain paths
//! and collapses them into the smallest preprocessor guard chain that picks
//! the right one at compile time.

use crate::exporters::ToolchainExporter;

/// One branch of a resolved include: a guard macro (absent when the include
/// is unconditional) and the path to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeBranch {
    pub guard: Option<String>,
    pub path: String,
}

/// Compute the include branches for `logical_path` across `exporters`.
///
/// Exact (macro, path) duplicates collapse onto their first occurrence. A
/// single surviving pair needs no guard, since every configured toolchain
/// agrees on the path. Anything else becomes one guarded branch per pair, in
/// declaration order, so regeneration is byte-identical for an unchanged
/// exporter list. No exporters means no branches; callers supply their own
/// fallback.
pub fn resolve_include(
    logical_path: &str,
    exporters: &[Box<dyn ToolchainExporter>],
) -> Vec<IncludeBranch> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for exporter in exporters {
        let pair = (
            exporter.identifier_macro().to_string(),
            exporter.map_include_path(logical_path),
        );
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    if pairs.len() == 1 {
        let (_, path) = pairs.remove(0);
        return vec![IncludeBranch { guard: None, path }];
    }

    pairs
        .into_iter()
        .map(|(guard, path)| IncludeBranch {
            guard: Some(guard),
            path,
        })
        .collect()
}

/// Render branches as preprocessor text: a bare `#include` for a single
/// unconditional branch, otherwise an `#if defined` / `#elif defined` chain
/// closed by `#endif`.
pub fn render_include_section(branches: &[IncludeBranch]) -> String {
    match branches {
        [] => String::new(),
        [only] if only.guard.is_none() => format!("#include \"{}\"\n", only.path),
        _ => {
            let mut out = String::new();
            for (i, branch) in branches.iter().enumerate() {
                let keyword = if i == 0 { "#if" } else { "#elif" };
                if let Some(guard) = &branch.guard {
                    out.push_str(&format!("{} defined ({})\n", keyword, guard));
                }
                out.push_str(&format!(" #include \"{}\"\n", branch.path));
            }
            out.push_str("#endif\n");
            out
        }
    }
}
