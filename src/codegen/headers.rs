//! Renderers for the generated header and shim files.
//!
//! Everything here is pure string building: the saver decides what gets
//! written where, the renderers only produce content. Include paths that
//! depend on the configured toolchains go through the include resolver so a
//! single file works for every exporter.

use std::path::Path;

use crate::core::linkage::LinkageMode;
use crate::core::plan::ArtifactPlan;
use crate::core::project::{FlagState, PluginSettings, Project};
use crate::core::version::{max_input_channels, max_output_channels, version_code_hex};
use crate::exporters::ToolchainExporter;
use crate::util::{fs, hash};

use super::include::{render_include_section, resolve_include};

/// Comment banner opening every generated file.
pub fn banner(note: &str) -> String {
    format!(
        "/*\n\n    {}\n\n    This file is auto-generated by slipway. Any edits made here will be\n    overwritten the next time the project is exported.\n\n*/\n\n",
        note
    )
}

/// Include-guard macro derived from the artifact's target path.
///
/// The path is hashed so two projects generating into different folders never
/// collide, while regenerating the same project always reproduces the same
/// guard.
pub fn header_guard(prefix: &str, target_path: &Path) -> String {
    let digest = hash::short_fingerprint(&fs::forward_slashes(target_path)).to_uppercase();
    format!("{}_{}_INCLUDED", prefix, digest)
}

/// Escape a string for embedding in a C string literal.
fn escape_c(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// First four characters of a code string, for multi-char literals.
fn four_char(code: &str) -> String {
    code.trim().chars().take(4).collect()
}

/// Resolve and render one library include across the configured toolchains.
///
/// With no exporters configured there is nothing to resolve against, so the
/// include falls back to the project's default library location.
fn library_include(
    logical_path: &str,
    exporters: &[Box<dyn ToolchainExporter>],
    fallback_include_base: &Path,
) -> String {
    let branches = resolve_include(logical_path, exporters);
    if branches.is_empty() {
        let path = fs::forward_slashes(&fallback_include_base.join(logical_path));
        return format!("#include \"{}\"\n", path);
    }
    render_include_section(&branches)
}

/// The library header a generated app header pulls in.
fn library_header_unit(project: &Project) -> String {
    let lib = &project.model().library.name;
    if project.linkage_mode().is_amalgamated() {
        format!("{}_amalgamated.h", lib)
    } else {
        format!("{}.h", lib)
    }
}

/// The amalgamated source unit a shim with the given index pulls in.
fn amalgamated_unit(project: &Project, index: u32) -> String {
    let lib = &project.model().library.name;
    if index == 0 {
        match project.linkage_mode() {
            LinkageMode::AmalgamatedSingle => format!("{}_amalgamated.cpp", lib),
            _ => format!("amalgamation/{}_amalgamated_template.cpp", lib),
        }
    } else {
        format!("amalgamation/{}_amalgamated{}.cpp", lib, index)
    }
}

/// Render the config-flag header (`AppConfig.h`).
pub fn render_app_config(project: &Project) -> String {
    let mut out = banner(&format!(
        "Configuration flags for the {} library.",
        project.model().library.name
    ));

    if project.linkage_mode() == LinkageMode::ExternallyLinked {
        out.push_str(
            "/* NOTE: this project links against a prebuilt copy of the library, so these\n   flags have no effect until the library itself is rebuilt with them. */\n\n",
        );
    }

    for config_flag in &project.model().config_flags {
        match config_flag.state {
            FlagState::Enabled => {
                out.push_str(&format!("#define    {} 1\n", config_flag.symbol))
            }
            FlagState::Disabled => {
                out.push_str(&format!("#define    {} 0\n", config_flag.symbol))
            }
            FlagState::Default => out.push_str(&format!("//#define  {}\n", config_flag.symbol)),
        }
    }

    out
}

/// Render the aggregated app header (`AppHeader.h`).
pub fn render_app_header(
    project: &Project,
    plan: &ArtifactPlan,
    header_path: &Path,
    exporters: &[Box<dyn ToolchainExporter>],
    fallback_include_base: &Path,
) -> String {
    let guard = header_guard("APPHEADER", header_path);
    let mut out = banner("This is the header that all project source files should include.");

    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));

    if plan.has_app_config {
        out.push_str("#include \"AppConfig.h\"\n");
        out.push_str(&library_include(
            &library_header_unit(project),
            exporters,
            fallback_include_base,
        ));
    }
    if plan.has_resources {
        out.push_str("#include \"ResourceData.h\"\n");
    }

    out.push('\n');
    out.push_str("namespace ProjectInfo\n{\n");
    out.push_str(&format!(
        "    const char* const  projectName    = \"{}\";\n",
        escape_c(project.name())
    ));
    out.push_str(&format!(
        "    const char* const  versionString  = \"{}\";\n",
        escape_c(project.version())
    ));
    out.push_str(&format!(
        "    const int          versionNumber  = {};\n",
        version_code_hex(project.version())
    ));
    out.push_str("}\n");

    out.push_str(&format!("\n#endif   // {}\n", guard));
    out
}

/// Render one amalgamated source shim.
///
/// The same content is written for both the `.cpp` and `.mm` twin; the file
/// extension alone decides how a toolchain compiles it.
pub fn render_source_shim(
    project: &Project,
    index: u32,
    exporters: &[Box<dyn ToolchainExporter>],
    fallback_include_base: &Path,
) -> String {
    let mut out = banner(
        "This shim pulls one amalgamated unit of the library into the project\n    so it is compiled with this project's settings and config flags.",
    );
    out.push_str("#include \"AppConfig.h\"\n\n");
    out.push_str(&library_include(
        &amalgamated_unit(project, index),
        exporters,
        fallback_include_base,
    ));
    out
}

/// Render the plugin-characteristics header (`PluginCharacteristics.h`).
pub fn render_plugin_characteristics(
    project: &Project,
    plugin: &PluginSettings,
    header_path: &Path,
) -> String {
    let guard = header_guard("PLUGINCHARACTERISTICS", header_path);
    let version = project.version();

    let mut out = banner("Plugin characteristics consumed by the plugin wrapper layers.");
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));

    out.push_str(&format!(
        "#define SlipwayPlugin_Build_VST    {}\n",
        flag(plugin.build_vst)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_Build_AU     {}\n",
        flag(plugin.build_au)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_Build_RTAS   {}\n\n",
        flag(plugin.build_rtas)
    ));

    out.push_str(&format!(
        "#define SlipwayPlugin_Name                   \"{}\"\n",
        escape_c(&plugin.name)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_Desc                   \"{}\"\n",
        escape_c(&plugin.description)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_Manufacturer           \"{}\"\n",
        escape_c(&plugin.manufacturer)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_ManufacturerCode       '{}'\n",
        four_char(&plugin.manufacturer_code)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_PluginCode             '{}'\n",
        four_char(&plugin.plugin_code)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_MaxNumInputChannels    {}\n",
        max_input_channels(&plugin.channel_configs)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_MaxNumOutputChannels   {}\n",
        max_output_channels(&plugin.channel_configs)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_PreferredChannelConfigurations   {}\n",
        plugin.channel_configs
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_IsSynth                {}\n",
        flag(plugin.is_synth)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_WantsMidiInput         {}\n",
        flag(plugin.wants_midi_input)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_ProducesMidiOutput     {}\n",
        flag(plugin.produces_midi_output)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_SilenceInProducesSilenceOut  {}\n",
        flag(plugin.silence_in_produces_silence_out)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_TailLengthSeconds      {}\n",
        plugin.tail_length_seconds
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_EditorRequiresKeyboardFocus  {}\n",
        flag(plugin.editor_wants_keyboard_focus)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_VersionCode            {}\n",
        version_code_hex(version)
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_VersionString          \"{}\"\n\n",
        escape_c(version)
    ));

    out.push_str("#define SlipwayPlugin_VSTUniqueID            SlipwayPlugin_PluginCode\n");
    out.push_str(&format!(
        "#define SlipwayPlugin_VSTCategory            {}\n",
        if plugin.is_synth {
            "kPlugCategSynth"
        } else {
            "kPlugCategEffect"
        }
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_AUMainType             {}\n",
        if plugin.is_synth {
            "kAudioUnitType_MusicDevice"
        } else {
            "kAudioUnitType_Effect"
        }
    ));
    out.push_str("#define SlipwayPlugin_AUSubType              SlipwayPlugin_PluginCode\n");
    out.push_str(&format!(
        "#define SlipwayPlugin_AUExportPrefix         {}\n",
        plugin.au_export_prefix
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_AUExportPrefixQuoted   \"{}\"\n",
        escape_c(&plugin.au_export_prefix)
    ));
    out.push_str("#define SlipwayPlugin_AUManufacturerCode     SlipwayPlugin_ManufacturerCode\n");
    out.push_str(&format!(
        "#define SlipwayPlugin_AUCocoaViewClassName   {}\n",
        plugin.au_view_class
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_BundleIdentifier       {}\n\n",
        project.model().project.bundle_identifier
    ));
    out.push_str(&format!(
        "#define SlipwayPlugin_RTASCategory           {}\n",
        if plugin.is_synth {
            "ePlugInCategory_SWGenerators"
        } else {
            "ePlugInCategory_None"
        }
    ));
    out.push_str("#define SlipwayPlugin_RTASManufacturerCode   SlipwayPlugin_ManufacturerCode\n");
    out.push_str("#define SlipwayPlugin_RTASProductId          SlipwayPlugin_PluginCode\n");

    out.push_str(&format!("\n#endif   // {}\n", guard));
    out
}
