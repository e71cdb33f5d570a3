mod config;
pub mod contact_store;

pub use config::{Config, CountdownConfig, DetectorConfig};
pub use contact_store::{ContactStore, SqliteContactStore, CONTACT_KEY};

use std::path::PathBuf;

/// Returns `~/.config/safezone[-dev]/` based on SAFEZONE_ENV.
///
/// Set SAFEZONE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SAFEZONE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("safezone-dev")
    } else {
        base_dir.join("safezone")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
