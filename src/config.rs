use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Environment variable (and secrets-file key) holding the Gemini credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY missing! Add it to `.env` or {0}")]
    MissingApiKey(String),
}

/// Startup configuration. Resolved exactly once; the process refuses to
/// come up without a credential.
#[derive(Debug)]
pub struct Config {
    pub api_key: String,
}

impl Config {
    /// Resolves the credential from the environment first, then from the
    /// secrets file. `dotenv` has already been applied by `main`, so `.env`
    /// entries arrive through the environment path.
    pub fn load() -> Result<Self, ConfigError> {
        let env_value = env::var(API_KEY_VAR).ok();
        let secrets = secrets_path().map(read_secrets).unwrap_or_default();

        match resolve_api_key(env_value, &secrets) {
            Some(api_key) => Ok(Self { api_key }),
            None => Err(ConfigError::MissingApiKey(secrets_location())),
        }
    }
}

fn resolve_api_key(
    env_value: Option<String>,
    secrets: &HashMap<String, String>,
) -> Option<String> {
    env_value
        .filter(|value| !value.is_empty())
        .or_else(|| secrets.get(API_KEY_VAR).filter(|v| !v.is_empty()).cloned())
}

fn secrets_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("upsc-insight").join("secrets.json"))
}

fn secrets_location() -> String {
    secrets_path()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "the secrets file".to_string())
}

fn read_secrets(path: PathBuf) -> HashMap<String, String> {
    match fs::read_to_string(&path) {
        Ok(contents) => parse_secrets(&contents, &path),
        Err(_) => HashMap::new(),
    }
}

/// A secrets file that does not parse is treated as absent rather than
/// fatal; the credential check downstream produces the actionable error.
fn parse_secrets(contents: &str, path: &Path) -> HashMap<String, String> {
    serde_json::from_str(contents).unwrap_or_else(|e| {
        debug!("Ignoring malformed secrets file {}: {e}", path.display());
        HashMap::new()
    })
}
