//! Public SDK surface for Kettle.
//!
//! This crate re-exports the config composer and provides the command-line
//! bootstrap used by the `kettle` binary.

pub mod cli;

/// Re-export for convenience.
pub use kettle_config as config;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
