//! API-key storage and user configuration.
//!
//! Resolution order for the key: `--api-key` flag (handled by the CLI), the
//! `GITMUSE_GEMINI_API_KEY` environment variable, then the platform config
//! file (`~/.config/gitmuse/config.json` on Linux). The same directory may
//! hold an optional `rules.md` with user commit rules for the prompt.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable checked before the config file.
pub const API_KEY_ENV_VAR: &str = "GITMUSE_GEMINI_API_KEY";

const CONFIG_FILE: &str = "config.json";
const RULES_FILE: &str = "rules.md";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<String>,
}

/// The gitmuse config directory under the platform config root.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("gitmuse"))
        .ok_or(ConfigError::NoConfigDir)
}

fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Validate an API key: at least 10 printable ASCII characters.
///
/// Non-ASCII characters would be rejected by the HTTP header encoding, so
/// they are caught here with a readable error instead.
pub fn is_valid_api_key(key: &str) -> bool {
    key.len() >= 10 && key.bytes().all(|b| (0x21..=0x7e).contains(&b))
}

/// Load the API key from the environment or the config file.
pub fn load_api_key() -> Result<Option<String>, ConfigError> {
    if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
        let key = key.trim().to_string();
        if is_valid_api_key(&key) {
            return Ok(Some(key));
        }
    }

    read_key_from(&config_path()?)
}

fn read_key_from(path: &Path) -> Result<Option<String>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::ReadFailed(e)),
    };

    let config: ConfigFile = serde_json::from_str(&raw).map_err(ConfigError::ParseFailed)?;
    Ok(config
        .gemini_api_key
        .filter(|key| is_valid_api_key(key)))
}

/// Save the API key to the config file, merging with existing contents.
pub fn save_api_key(key: &str) -> Result<(), ConfigError> {
    write_key_to(&config_path()?, key)
}

fn write_key_to(path: &Path, key: &str) -> Result<(), ConfigError> {
    if !is_valid_api_key(key) {
        return Err(ConfigError::InvalidApiKey);
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(ConfigError::WriteFailed)?;
    }

    let mut config = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        Err(_) => ConfigFile::default(),
    };
    config.gemini_api_key = Some(key.to_string());

    let body = serde_json::to_string_pretty(&config).map_err(ConfigError::ParseFailed)?;
    fs::write(path, body).map_err(ConfigError::WriteFailed)?;

    // The file holds a credential: owner read/write only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(ConfigError::WriteFailed)?;
    }

    Ok(())
}

/// Delete the saved API key. Returns whether a key was present.
pub fn delete_api_key() -> Result<bool, ConfigError> {
    delete_key_from(&config_path()?)
}

fn delete_key_from(path: &Path) -> Result<bool, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ConfigError::ReadFailed(e)),
    };

    let mut config: ConfigFile = serde_json::from_str(&raw).map_err(ConfigError::ParseFailed)?;
    let had_key = config.gemini_api_key.take().is_some();

    let body = serde_json::to_string_pretty(&config).map_err(ConfigError::ParseFailed)?;
    fs::write(path, body).map_err(ConfigError::WriteFailed)?;

    Ok(had_key)
}

/// Read the optional user rules file for the system prompt.
pub fn load_user_rules() -> Option<String> {
    let path = config_dir().ok()?.join(RULES_FILE);
    fs::read_to_string(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_key_format() {
        assert!(is_valid_api_key("AIzaSyB1234567890"));
        assert!(!is_valid_api_key("short"));
        assert!(!is_valid_api_key("has spaces in it"));
        assert!(!is_valid_api_key("ключ-не-ascii"));
        assert!(!is_valid_api_key(""));
    }

    #[test]
    fn save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        write_key_to(&path, "AIzaSyB1234567890").unwrap();
        let key = read_key_from(&path).unwrap();
        assert_eq!(key.as_deref(), Some("AIzaSyB1234567890"));
    }

    #[test]
    fn save_rejects_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = write_key_to(&path, "short").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiKey));
        assert!(!path.exists() || read_key_from(&path).unwrap().is_none());
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(read_key_from(&path).unwrap().is_none());
    }

    #[test]
    fn invalid_stored_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"gemini_api_key": "short"}"#).unwrap();
        assert!(read_key_from(&path).unwrap().is_none());
    }

    #[test]
    fn delete_removes_the_key_and_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        write_key_to(&path, "AIzaSyB1234567890").unwrap();
        assert!(delete_key_from(&path).unwrap());
        assert!(read_key_from(&path).unwrap().is_none());
        assert!(!delete_key_from(&path).unwrap());
    }

    #[test]
    fn env_var_takes_precedence_over_missing_file() {
        temp_env::with_var(API_KEY_ENV_VAR, Some("AIzaSyB1234567890"), || {
            let key = load_api_key().unwrap();
            assert_eq!(key.as_deref(), Some("AIzaSyB1234567890"));
        });
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_has_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_key_to(&path, "AIzaSyB1234567890").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
