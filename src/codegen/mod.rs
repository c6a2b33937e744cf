//! Generated-source rendering.
//!
//! Pure content production for everything the saver writes into the
//! generated-sources folder: the config and app headers, amalgamated source
//! shims, plugin characteristics and the embedded resource bundle. The
//! include resolver lives here too, since every library include in generated
//! text goes through it.

pub mod headers;
pub mod include;
pub mod resources;

pub use include::{render_include_section, resolve_include, IncludeBranch};
pub use resources::ResourceBundle;
