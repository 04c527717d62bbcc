use crate::auth::{
    Authenticator, CodePrompt, GoogleOAuth, TerminalPrompt, TokenExchange, TokenStore,
    load_client_secret,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::sheets::{CellOperations, CellUpdater, SheetsClient, UpdateOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use yup_oauth2::ApplicationSecret;

/// Payload the function is triggered with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationEvent {
    /// Cell to increment, e.g. `B2`
    pub target: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Updated,
    NoData,
    UpdateFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    pub status: u16,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<UpdateOutcome> for InvocationResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        match outcome {
            UpdateOutcome::Updated { status, value, .. } => Self {
                status,
                outcome: Outcome::Updated,
                value: Some(value),
            },
            UpdateOutcome::NoData { status } => Self {
                status,
                outcome: Outcome::NoData,
                value: None,
            },
            UpdateOutcome::Rejected { status } => Self {
                status,
                outcome: Outcome::UpdateFailed,
                value: None,
            },
        }
    }
}

/// Builds the clients an invocation talks to
pub trait Backend {
    type Exchange: TokenExchange + Sync;
    type Prompt: CodePrompt + Sync;
    type Cells: CellOperations + Sync;

    fn exchange(&self, secret: &ApplicationSecret) -> Result<Self::Exchange>;

    fn prompt(&self) -> Self::Prompt;

    fn cells(&self, access_token: String) -> Result<Self::Cells>;
}

/// Google OAuth, the terminal, and the Sheets API
pub struct GoogleBackend;

impl Backend for GoogleBackend {
    type Exchange = GoogleOAuth;
    type Prompt = TerminalPrompt;
    type Cells = SheetsClient;

    fn exchange(&self, secret: &ApplicationSecret) -> Result<GoogleOAuth> {
        GoogleOAuth::new(secret)
    }

    fn prompt(&self) -> TerminalPrompt {
        TerminalPrompt
    }

    fn cells(&self, access_token: String) -> Result<SheetsClient> {
        SheetsClient::new(access_token)
    }
}

pub struct Handler<B = GoogleBackend> {
    config: Config,
    backend: B,
}

impl Handler {
    pub fn new(config: Config) -> Self {
        Self::with_backend(config, GoogleBackend)
    }
}

impl<B: Backend> Handler<B> {
    pub fn with_backend(config: Config, backend: B) -> Self {
        Self { config, backend }
    }

    /// Authorize, then increment the event's target cell.
    ///
    /// Client credentials are read again on every invocation.
    #[instrument(name = "Handling invocation", skip_all, fields(cell = %event.target))]
    pub async fn handle(&self, event: InvocationEvent) -> Result<InvocationResponse> {
        info!(?event, "Event received");
        validate(&event)?;

        let secret = load_client_secret(&self.config.credentials_path).await?;
        let authenticator = Authenticator::new(
            self.backend.exchange(&secret)?,
            self.backend.prompt(),
            TokenStore::new(&self.config.token_path),
        );
        let authorized = authenticator.authorize().await?;
        debug!(source = ?authorized.source, "Authorized");

        let cells = self.backend.cells(authorized.access_token)?;
        self.update(&cells, &event).await
    }

    async fn update<C>(&self, cells: &C, event: &InvocationEvent) -> Result<InvocationResponse>
    where
        C: CellOperations + Sync,
    {
        let outcome = CellUpdater::new(&self.config, cells)
            .update(event.target.trim())
            .await?;
        info!(status = outcome.status(), "Invocation completed");

        Ok(outcome.into())
    }
}

fn validate(event: &InvocationEvent) -> Result<()> {
    if event.target.trim().is_empty() {
        return Err(AppError::InvalidEvent(
            "target must name a cell".to_string(),
        ));
    }
    Ok(())
}
