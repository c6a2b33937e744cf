//! Artifact planning.
//!
//! A save starts by deciding, from the linkage mode alone, which generated
//! artifacts exist for this project. The planner touches neither the
//! filesystem nor the exporters, so the decision table is directly
//! unit-testable and the same inputs always produce the same plan.

use crate::core::linkage::LinkageMode;
use crate::core::project::ProjectKind;

/// The set of generated artifacts a save will produce.
///
/// Computed once at the start of a save and treated as immutable for the rest
/// of the operation. Artifacts the plan excludes are actively deleted if a
/// previous save left them behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactPlan {
    /// Emit the aggregated app header
    pub has_app_header: bool,

    /// Emit the config-flag header
    pub has_app_config: bool,

    /// Number of amalgamated source shims (0 = none)
    pub num_source_shims: u32,

    /// Emit the embedded resource bundle
    pub has_resources: bool,

    /// Emit the plugin-characteristics header
    pub has_plugin_characteristics: bool,
}

impl ArtifactPlan {
    /// Decide which artifacts exist for the given project shape.
    pub fn compute(linkage: LinkageMode, kind: ProjectKind, resource_count: usize) -> ArtifactPlan {
        let (has_app_header, has_app_config, num_source_shims) = match linkage {
            // A library that doesn't link anything needs no app header either:
            // its consumers bring their own.
            LinkageMode::NotLinked => (!kind.is_library(), false, 0),
            LinkageMode::AmalgamatedSingle | LinkageMode::AmalgamatedTemplate => (true, true, 1),
            LinkageMode::AmalgamatedMultiple(n) => (true, true, n),
            LinkageMode::ExternallyLinked => (true, true, 0),
        };

        ArtifactPlan {
            has_app_header,
            has_app_config,
            num_source_shims,
            has_resources: resource_count > 0,
            has_plugin_characteristics: kind.is_audio_plugin(),
        }
    }

    /// Indexes of the shim files this plan writes.
    ///
    /// A single shim is file 0; multiple shims are numbered from 1 so their
    /// file names line up with the numbered amalgamated units they include.
    pub fn shim_indexes(&self) -> Vec<u32> {
        match self.num_source_shims {
            0 => Vec::new(),
            1 => vec![0],
            n => (1..=n).collect(),
        }
    }
}
