use std::time::Duration;
use log::debug;
use thiserror::Error;
use crate::schemas::{StatusResponse, SubmitRequest, SubmitResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response (network, DNS, TLS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status code.
    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Seam to the remote generation service. The orchestrator only ever talks
/// through this trait, so tests can script the whole pipeline.
pub trait GenService {
    /// Queue one stage for execution, returning the remote task id.
    /// No internal retry; a rejected submission kills the stage.
    fn submit(&self, request: &SubmitRequest) -> Result<String, ClientError>;

    /// Fetch the current status of a previously submitted stage.
    fn poll(&self, task_id: &str) -> Result<StatusResponse, ClientError>;

    /// Existence probe for the proxy-model endpoint. Returns the proxy
    /// locator only when the probe confirms the model is actually there.
    fn probe_proxy(&self, task_id: &str) -> Result<Option<String>, ClientError>;
}

/// HTTP implementation against the generation service REST endpoints.
pub struct HttpGenClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpGenClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn ensure_success(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl GenService for HttpGenClient {
    fn submit(&self, request: &SubmitRequest) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/submit", self.base_url))
            .json(request)
            .timeout(Duration::from_secs(10))
            .send()?;

        let response = Self::ensure_success(response)?;
        let parsed: SubmitResponse = response.json()?;

        debug!(
            "submitted {} stage, task id {}",
            request.stage.label(),
            parsed.task_id
        );
        Ok(parsed.task_id)
    }

    fn poll(&self, task_id: &str) -> Result<StatusResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/status/{}", self.base_url, task_id))
            .timeout(Duration::from_secs(10))
            .send()?;

        let response = Self::ensure_success(response)?;
        Ok(response.json()?)
    }

    fn probe_proxy(&self, task_id: &str) -> Result<Option<String>, ClientError> {
        let url = format!("{}/proxy-model/{}", self.base_url, task_id);

        // The probe itself failing just means we cannot trust the proxy;
        // it is never fatal on its own.
        match self.http.get(&url).timeout(Duration::from_secs(5)).send() {
            Ok(response) if response.status().is_success() => Ok(Some(url)),
            Ok(response) => {
                debug!("proxy probe for {} returned {}", task_id, response.status());
                Ok(None)
            }
            Err(e) => {
                debug!("proxy probe for {} failed: {}", task_id, e);
                Ok(None)
            }
        }
    }
}
