use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the JSON emitted by `tern tokens` and `tern parse`.
/// Bump this when changing the shape of either dump.
pub const OUTPUT_SCHEMA_VERSION: u32 = 1;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("tern {VERSION}");

    if let Some(hash) = option_env!("TERN_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}
