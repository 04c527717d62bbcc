use crate::auth::{Authenticator, GoogleOAuth, TerminalPrompt, TokenStore, load_client_secret};
use crate::config::Config;
use crate::error::Result;
use tracing::info;

pub async fn execute(reset: bool) -> Result<()> {
    let config = Config::load()?;
    let store = TokenStore::new(&config.token_path);

    if reset {
        store.clear()?;
    }

    let secret = load_client_secret(&config.credentials_path).await?;
    let authenticator = Authenticator::new(GoogleOAuth::new(&secret)?, TerminalPrompt, store);
    let authorized = authenticator.authorize().await?;

    info!(source = ?authorized.source, "Google Sheets authentication verified");

    Ok(())
}
