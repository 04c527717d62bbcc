mod credentials;
mod oauth;
mod prompt;
mod token;

pub use credentials::load_client_secret;
pub use oauth::GoogleOAuth;
pub use prompt::TerminalPrompt;
pub use token::{StoredToken, TokenStore};

#[cfg(test)]
pub(crate) use credentials::test_helpers::INSTALLED_SECRET;
#[cfg(test)]
pub(crate) use token::test_helpers;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[async_trait]
pub trait TokenExchange {
    /// URL a person visits to grant access and receive an authorization code
    fn authorize_url(&self) -> Url;

    async fn exchange_code(&self, code: &str) -> Result<StoredToken>;

    async fn refresh_token(&self, refresh_token: &str) -> Result<StoredToken>;
}

pub trait CodePrompt {
    fn request_code(&self, auth_url: &Url) -> Result<String>;
}

/// Where the access token of an authorization came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cached,
    Refreshed,
    Acquired,
}

#[derive(Debug, Clone)]
pub struct Authorized {
    pub access_token: String,
    pub source: TokenSource,
}

pub struct Authenticator<E, P> {
    exchange: E,
    prompt: P,
    store: TokenStore,
}

impl<E, P> Authenticator<E, P>
where
    E: TokenExchange + Sync,
    P: CodePrompt + Sync,
{
    pub fn new(exchange: E, prompt: P, store: TokenStore) -> Self {
        Self {
            exchange,
            prompt,
            store,
        }
    }

    /// Get a usable access token, refreshing or asking for a new grant as needed
    #[instrument(name = "Authorizing with Google", skip_all)]
    pub async fn authorize(&self) -> Result<Authorized> {
        let cached = match self.store.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, path = ?self.store.path(), "Ignoring unreadable cached token");
                None
            }
        };

        let Some(token) = cached else {
            debug!("No cached token found, requesting authorization...");
            return self.acquire().await;
        };

        if !token.is_expired() {
            debug!("Using cached token");
            return Ok(Authorized {
                access_token: token.access_token,
                source: TokenSource::Cached,
            });
        }

        let Some(refresh_token) = token.refresh_token.as_deref() else {
            debug!("Cached token expired without a refresh token, requesting authorization...");
            return self.acquire().await;
        };

        debug!("Access token expired, refreshing...");
        match self.exchange.refresh_token(refresh_token).await {
            Ok(refreshed) => {
                debug!("Token refresh successful");
                self.persist(&refreshed);
                Ok(Authorized {
                    access_token: refreshed.access_token,
                    source: TokenSource::Refreshed,
                })
            }
            Err(e) => {
                debug!("Token refresh failed ({}), requesting authorization...", e);
                self.acquire().await
            }
        }
    }

    async fn acquire(&self) -> Result<Authorized> {
        let auth_url = self.exchange.authorize_url();
        let code = self.prompt.request_code(&auth_url)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::Auth("No authorization code entered".to_string()));
        }

        let token = self.exchange.exchange_code(code).await?;
        self.persist(&token);

        Ok(Authorized {
            access_token: token.access_token,
            source: TokenSource::Acquired,
        })
    }

    // Persisting is best-effort: the token in hand is still good for this run.
    fn persist(&self, token: &StoredToken) {
        match self.store.save(token) {
            Ok(()) => info!(path = ?self.store.path(), "Token stored"),
            Err(e) => warn!(error = %e, "Failed to store token"),
        }
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct MockExchange {
        pub fail_refresh: bool,
        pub codes: Arc<Mutex<Vec<String>>>,
        pub refreshes: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TokenExchange for MockExchange {
        fn authorize_url(&self) -> Url {
            Url::parse("https://accounts.example.com/auth?access_type=offline").unwrap()
        }

        async fn exchange_code(&self, code: &str) -> Result<StoredToken> {
            self.codes.lock().unwrap().push(code.to_string());
            Ok(StoredToken {
                access_token: format!("access-for-{}", code),
                refresh_token: Some("refresh-new".to_string()),
                scope: None,
                token_type: Some("bearer".to_string()),
                expiry_date: Some(token::test_helpers::hours_from_now(1)),
            })
        }

        async fn refresh_token(&self, refresh_token: &str) -> Result<StoredToken> {
            self.refreshes.lock().unwrap().push(refresh_token.to_string());
            if self.fail_refresh {
                return Err(AppError::Auth("invalid_grant".to_string()));
            }
            Ok(StoredToken {
                access_token: "access-refreshed".to_string(),
                refresh_token: Some(refresh_token.to_string()),
                scope: None,
                token_type: Some("bearer".to_string()),
                expiry_date: Some(token::test_helpers::hours_from_now(1)),
            })
        }
    }

    #[derive(Clone)]
    pub(crate) struct MockPrompt {
        pub code: String,
        pub prompts: Arc<Mutex<usize>>,
    }

    impl MockPrompt {
        pub(crate) fn new(code: &str) -> Self {
            Self {
                code: code.to_string(),
                prompts: Arc::new(Mutex::new(0)),
            }
        }

        pub(crate) fn count(&self) -> usize {
            *self.prompts.lock().unwrap()
        }
    }

    impl CodePrompt for MockPrompt {
        fn request_code(&self, _auth_url: &Url) -> Result<String> {
            *self.prompts.lock().unwrap() += 1;
            Ok(self.code.clone())
        }
    }
}
