//! Readers for variable and settings files.
//!
//! Settings are JSON; variable files may be JSON or YAML.

mod json;
mod yaml;

pub use json::*;
pub use yaml::*;
