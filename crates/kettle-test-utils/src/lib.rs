//! Test helpers shared across Kettle crates.

pub mod fixture;
pub mod modules;

pub use fixture::ConfigDir;
pub use modules::{ModuleCall, RecordingModuleLoader};
