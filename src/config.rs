use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR_PREFIX: &str = "cell-incrementer";
const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.json";
const TOKEN_FILE: &str = "token.json";
const DEFAULT_SHEET_NAME: &str = "Values";

/// Environment variable holding the target spreadsheet identifier
pub const SPREADSHEET_ID_ENV: &str = "GOOGLE_SHEET_ID";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    /// Sheet that every target range is resolved against
    pub sheet_name: String,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            credentials_path: PathBuf::from(CREDENTIALS_FILE),
            token_path: default_token_path(),
        }
    }
}

impl Config {
    /// Load the optional config file, then apply `GOOGLE_SHEET_ID` on top.
    pub fn load() -> Result<Self> {
        let config = Self::read()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], without requiring the result to be usable
    pub fn read() -> Result<Self> {
        let contents = match Self::xdg_dirs().find_config_file(CONFIG_FILE) {
            Some(path) => Some(fs::read_to_string(&path)?),
            None => None,
        };

        Self::from_sources(contents.as_deref(), env::var(SPREADSHEET_ID_ENV).ok())
    }

    fn from_sources(file_contents: Option<&str>, spreadsheet_id: Option<String>) -> Result<Self> {
        let mut config: Config = match file_contents {
            Some(contents) => toml::from_str(contents)
                .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?,
            None => Config::default(),
        };

        if let Some(id) = spreadsheet_id {
            config.spreadsheet_id = id;
        }

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Spreadsheet ID must be set via {} or the config file",
                SPREADSHEET_ID_ENV
            )));
        }

        if self.sheet_name.trim().is_empty() {
            return Err(AppError::Config("Sheet name must not be empty".to_string()));
        }

        Ok(())
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Self::xdg_dirs()
            .place_config_file(CONFIG_FILE)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }
}

// The token cache lives next to the executable, falling back to the working
// directory when that cannot be determined.
fn default_token_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TOKEN_FILE)))
        .unwrap_or_else(|| PathBuf::from(TOKEN_FILE))
}
