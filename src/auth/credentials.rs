use crate::error::{AppError, Result};
use std::path::Path;
use tracing::debug;
use yup_oauth2::ApplicationSecret;

/// Read the OAuth client secret file downloaded from the Google Cloud console.
///
/// Both the `installed` and `web` client layouts are accepted.
pub async fn load_client_secret(path: &Path) -> Result<ApplicationSecret> {
    let secret = yup_oauth2::read_application_secret(path).await.map_err(|e| {
        AppError::Credentials(format!(
            "Error loading client secret file {:?}: {}",
            path, e
        ))
    })?;

    if secret.redirect_uris.is_empty() {
        return Err(AppError::Credentials(format!(
            "Client secret file {:?} has no redirect_uris",
            path
        )));
    }

    debug!(client_id = %secret.client_id, "Loaded client secret");
    Ok(secret)
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use yup_oauth2::ApplicationSecret;

    pub(crate) const INSTALLED_SECRET: &str = r#"{
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "cell-incrementer",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
            "client_secret": "shh",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
        }
    }"#;

    pub(crate) fn mock_secret() -> ApplicationSecret {
        yup_oauth2::parse_application_secret(INSTALLED_SECRET).unwrap()
    }
}
