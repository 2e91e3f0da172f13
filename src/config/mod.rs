// src/config/mod.rs
// =============================================================================
// Configuration: where settings come from and what they look like.
//
// Submodules:
// - settings: the immutable Settings value plus Mode / ViolationPolicy
// - resolve: ConfigResolver, which merges CLI, config file, ignore file and
//   defaults into a Settings value
// =============================================================================

mod resolve;
mod settings;

pub use resolve::{parse_header, ConfigResolver, Overrides};
pub(crate) use resolve::compile_glob;
pub use settings::{Mode, Settings, ViolationPolicy};
