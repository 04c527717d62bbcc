use super::{CellOperations, ReadValues};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use google_sheets4::api::{Scope, Sheets, ValueRange};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use tracing::{debug, instrument};

// Read/write access to all of the user's spreadsheets
pub(crate) const AUTH_SCOPE: Scope = Scope::Spreadsheet;

pub struct SheetsClient {
    hub: Sheets<HttpsConnector<HttpConnector>>,
}

impl SheetsClient {
    /// Create a SheetsClient that sends `access_token` with every request
    pub fn new(access_token: String) -> Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| AppError::Sheets(format!("Failed to load native TLS roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);

        Ok(Self {
            hub: Sheets::new(client, access_token),
        })
    }
}

#[async_trait]
impl CellOperations for SheetsClient {
    #[instrument(name = "Reading values", skip(self))]
    async fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<ReadValues> {
        let (response, value_range) = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .major_dimension("ROWS")
            .add_scope(AUTH_SCOPE)
            .doit()
            .await
            .map_err(|e| AppError::Sheets(format!("Failed to read range '{}': {}", range, e)))?;

        let status = response.status().as_u16();
        debug!(status, "Read response");

        Ok(ReadValues {
            status,
            rows: value_range.values.unwrap_or_default(),
        })
    }

    #[instrument(name = "Writing values", skip(self, values))]
    async fn write_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        value_input_option: &str,
    ) -> Result<u16> {
        let value_range = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(range.to_string()),
            values: Some(values),
        };

        let result = self
            .hub
            .spreadsheets()
            .values_update(value_range, spreadsheet_id, range)
            .value_input_option(value_input_option)
            .add_scope(AUTH_SCOPE)
            .doit()
            .await;

        let status = write_status(
            result.map(|(response, _)| response.status().as_u16()),
            range,
        )?;
        debug!(status, "Write response");

        Ok(status)
    }
}

// A response with an error status is still an answer from the service; its
// status goes back to the caller instead of failing the update.
fn write_status(
    result: std::result::Result<u16, google_sheets4::Error>,
    range: &str,
) -> Result<u16> {
    match result {
        Ok(status) => Ok(status),
        Err(google_sheets4::Error::Failure(response)) => Ok(response.status().as_u16()),
        Err(google_sheets4::Error::BadRequest(body)) => error_code(&body).ok_or_else(|| {
            AppError::Sheets(format!("Failed to write range '{}': {}", range, body))
        }),
        Err(e) => Err(AppError::Sheets(format!(
            "Failed to write range '{}': {}",
            range, e
        ))),
    }
}

/// Status code from a Google API error body: `{"error": {"code": 500, ...}}`
fn error_code(body: &Value) -> Option<u16> {
    body.get("error")?
        .get("code")?
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
}
