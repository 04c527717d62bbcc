use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

// Tokens this close to expiry count as expired
const EXPIRY_MARGIN_MS: i64 = 5 * 60 * 1000;

/// OAuth2 token as cached in `token.json`.
///
/// Field names follow the file Google's client libraries write, so a cache
/// created by them keeps working.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry time as milliseconds since Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredToken {
    /// Tokens without a recorded expiry are assumed valid.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.expiry_date
            .map(|expiry| expiry < now + EXPIRY_MARGIN_MS)
            .unwrap_or(false)
    }
}

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing is cached; an error when the file exists but
    /// cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredToken>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Auth(format!("Failed to read token file: {}", e)));
            }
        };

        let token: StoredToken = serde_json::from_str(&contents)
            .map_err(|e| AppError::Auth(format!("Failed to parse token file: {}", e)))?;

        Ok(Some(token))
    }

    pub fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Auth(format!("Failed to create token directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string(token)
            .map_err(|e| AppError::Auth(format!("Failed to serialize token: {}", e)))?;

        // Create file with owner-only permissions from the start to avoid race condition
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .map_err(|e| AppError::Auth(format!("Failed to create token file: {}", e)))?;

        file.write_all(contents.as_bytes())
            .map_err(|e| AppError::Auth(format!("Failed to write token file: {}", e)))?;

        Ok(())
    }

    /// Delete the cached token, if any
    #[instrument(name = "Clearing cached token", skip_all)]
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = ?self.path, "Cleared cached token");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached token to clear");
                Ok(())
            }
            Err(e) => Err(AppError::Auth(format!("Failed to delete token file: {}", e))),
        }
    }
}
