//! Helper namespace implementations (`api` in expression code).

mod registry;
mod standard;

pub use registry::HelperRegistry;
pub use standard::standard_helpers;
