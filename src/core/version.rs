//! Version and channel-configuration encoders.
//!
//! Generated headers embed the project version as one packed integer and the
//! plugin channel configuration as per-direction channel maxima. Both
//! encoders are tolerant of sloppy input: a component that doesn't parse as a
//! plain integer counts as zero instead of failing the whole save.

/// Pack a dotted version string into a single integer.
///
/// `"A.B.C"` becomes `(A << 16) | (B << 8) | C`. When a fourth component is
/// present the packed value shifts left one byte and ORs it in, so
/// `"1.2.3.4"` becomes `0x01020304`. Missing components read as zero and
/// components past the fourth are ignored.
pub fn version_code(version: &str) -> u32 {
    let parts: Vec<u64> = version
        .split(['.', ','])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().unwrap_or(0))
        .collect();
    let part = |i: usize| parts.get(i).copied().unwrap_or(0);

    // Computed wide so oversized components wrap instead of panicking.
    let mut value = (part(0) << 16) | (part(1) << 8) | part(2);
    if parts.len() >= 4 {
        value = (value << 8) | part(3);
    }
    value as u32
}

/// Format a version code the way generated headers embed it.
pub fn version_code_hex(version: &str) -> String {
    format!("{:#x}", version_code(version))
}

/// Maximum input channel count across a `"{in,out},{in,out}"` config string.
pub fn max_input_channels(configs: &str) -> u32 {
    max_channels(configs, 0)
}

/// Maximum output channel count across a channel-config string.
pub fn max_output_channels(configs: &str) -> u32 {
    max_channels(configs, 1)
}

fn max_channels(configs: &str, first: usize) -> u32 {
    let tokens: Vec<&str> = configs
        .split(|c: char| c == ',' || c == '{' || c == '}' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.len() % 2 != 0 {
        tracing::warn!(
            "channel config `{}` has an odd number of values; taking the best-effort maximum",
            configs
        );
    }

    // Even positions are inputs, odd positions are outputs.
    tokens
        .iter()
        .skip(first)
        .step_by(2)
        .map(|t| t.parse::<u32>().unwrap_or(0))
        .max()
        .unwrap_or(0)
}
