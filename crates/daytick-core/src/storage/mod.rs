mod config;

pub use config::{
    validate_session_token, CalendarConfig, Config, SearchConfig, ServerConfig, BASE_URL_ENV,
    SESSION_TOKEN_ENV,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/daytick[-dev]/` based on DAYTICK_ENV.
///
/// Set DAYTICK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("DAYTICK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("daytick-dev")
    } else {
        base_dir.join("daytick")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
