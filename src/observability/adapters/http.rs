//! HTTP exporter posting JSON trace records to an ingestion endpoint.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::observability::{
    domain::TraceRecord,
    ports::{TraceExportError, TraceExportResult, TraceExporter},
};

/// Basic-auth credentials for the telemetry sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCredentials {
    /// Public key, sent as the user name.
    pub public_key: String,
    /// Secret key, sent as the password.
    pub secret_key: String,
}

/// Posts each trace as one JSON document.
///
/// Any non-2xx response counts as a failed attempt.
#[derive(Debug, Clone)]
pub struct HttpTraceExporter {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<SinkCredentials>,
}

impl HttpTraceExporter {
    /// Per-request timeout applied by the underlying client.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates an exporter for the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`TraceExportError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(
        endpoint: impl Into<String>,
        credentials: Option<SinkCredentials>,
    ) -> Result<Self, TraceExportError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(TraceExportError::transport)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        })
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TraceExporter for HttpTraceExporter {
    async fn export(&self, record: &TraceRecord) -> TraceExportResult {
        let mut request = self.client.post(&self.endpoint).json(record);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.public_key, Some(&credentials.secret_key));
        }

        let response = request.send().await.map_err(TraceExportError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TraceExportError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!(trace_id = %record.trace_id, %status, "trace delivered");
        Ok(())
    }
}
