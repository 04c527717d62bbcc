use super::TokenExchange;
use super::token::StoredToken;
use crate::error::{AppError, Result};
use crate::sheets::AUTH_SCOPE;
use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RefreshToken, Scope, StandardRevocableToken, TokenResponse,
    TokenUrl,
    basic::{
        BasicClient, BasicErrorResponse, BasicRevocationErrorResponse,
        BasicTokenIntrospectionResponse, BasicTokenResponse,
    },
};
use reqwest::redirect::Policy;
use url::Url;
use yup_oauth2::ApplicationSecret;

// Type alias for the client when Auth and Token URLs are set
type ConfiguredClient = Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,    // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Authorization-code flow against Google's OAuth2 endpoints
pub struct GoogleOAuth {
    client: ConfiguredClient,
    http_client: reqwest::Client,
}

impl GoogleOAuth {
    pub fn new(secret: &ApplicationSecret) -> Result<Self> {
        let redirect_uri = secret
            .redirect_uris
            .first()
            .ok_or_else(|| AppError::Credentials("No redirect URI configured".to_string()))?;

        let auth_url = AuthUrl::new(secret.auth_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid auth URL: {}", e)))?;
        let token_url = TokenUrl::new(secret.token_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid token URL: {}", e)))?;
        let redirect_url = RedirectUrl::new(redirect_uri.clone())
            .map_err(|e| AppError::Auth(format!("Invalid redirect URL: {}", e)))?;

        let client = BasicClient::new(ClientId::new(secret.client_id.clone()))
            .set_client_secret(ClientSecret::new(secret.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let http_client = reqwest::ClientBuilder::new()
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            http_client,
        })
    }
}

#[async_trait]
impl TokenExchange for GoogleOAuth {
    fn authorize_url(&self) -> Url {
        let (url, _csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(AUTH_SCOPE.as_ref().to_string()))
            // Offline access makes Google issue a refresh token
            .add_extra_param("access_type", "offline")
            .url();
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<StoredToken> {
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to exchange code: {:?}", e)))?;

        Ok(stored_token(&token_result, None))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<StoredToken> {
        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to refresh token: {:?}", e)))?;

        Ok(stored_token(&token_result, Some(refresh_token)))
    }
}

/// Convert a token response into its cached form.
///
/// Refresh responses usually omit the refresh token; `fallback_refresh_token`
/// keeps the one that was used.
fn stored_token(
    token_result: &BasicTokenResponse,
    fallback_refresh_token: Option<&str>,
) -> StoredToken {
    let refresh_token = token_result
        .refresh_token()
        .map(|token| token.secret().clone())
        .or_else(|| fallback_refresh_token.map(str::to_string));

    let scope = token_result.scopes().map(|scopes| {
        scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    });

    // Lifetimes too long to represent are recorded as no expiry
    let expiry_date = token_result
        .expires_in()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .and_then(|ms| chrono::Utc::now().timestamp_millis().checked_add(ms));

    StoredToken {
        access_token: token_result.access_token().secret().clone(),
        refresh_token,
        scope,
        token_type: Some(token_result.token_type().as_ref().to_string()),
        expiry_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::test_helpers::mock_secret;

    fn token_response(json: &str) -> BasicTokenResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_authorize_url() {
        let oauth = GoogleOAuth::new(&mock_secret()).unwrap();
        let url = oauth.authorize_url();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(param("access_type"), Some("offline"));
        assert_eq!(
            param("scope"),
            Some("https://www.googleapis.com/auth/spreadsheets")
        );
        assert_eq!(param("client_id"), Some("123.apps.googleusercontent.com"));
        assert_eq!(param("redirect_uri"), Some("urn:ietf:wg:oauth:2.0:oob"));
        assert_eq!(param("response_type"), Some("code"));
    }

    #[test]
    fn test_no_redirect_uri() {
        let mut secret = mock_secret();
        secret.redirect_uris.clear();

        assert!(matches!(
            GoogleOAuth::new(&secret),
            Err(AppError::Credentials(_))
        ));
    }

    #[test]
    fn test_stored_token_from_code_exchange() {
        let response = token_response(
            r#"{"access_token": "ya29.new", "refresh_token": "1//new", "token_type": "Bearer",
                "expires_in": 3599, "scope": "https://www.googleapis.com/auth/spreadsheets"}"#,
        );
        let before = chrono::Utc::now().timestamp_millis();

        let token = stored_token(&response, None);

        assert_eq!(token.access_token, "ya29.new");
        assert_eq!(token.refresh_token.as_deref(), Some("1//new"));
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        assert_eq!(
            token.scope.as_deref(),
            Some("https://www.googleapis.com/auth/spreadsheets")
        );
        let expiry = token.expiry_date.unwrap();
        assert!(expiry >= before + 3_599_000);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_stored_token_keeps_refresh_token() {
        let response = token_response(
            r#"{"access_token": "ya29.refreshed", "token_type": "Bearer", "expires_in": 3599}"#,
        );

        let token = stored_token(&response, Some("1//old"));

        assert_eq!(token.access_token, "ya29.refreshed");
        assert_eq!(token.refresh_token.as_deref(), Some("1//old"));
        assert_eq!(token.scope, None);
    }

    #[test]
    fn test_stored_token_unrepresentable_lifetime() {
        let response = token_response(
            r#"{"access_token": "ya29.forever", "token_type": "Bearer",
                "expires_in": 18446744073709551615}"#,
        );
        assert_eq!(stored_token(&response, None).expiry_date, None);

        let response = token_response(
            r#"{"access_token": "ya29.forever", "token_type": "Bearer",
                "expires_in": 9223372036854775}"#,
        );
        let token = stored_token(&response, None);
        assert_eq!(token.expiry_date, None);
        assert!(!token.is_expired());
    }
}
