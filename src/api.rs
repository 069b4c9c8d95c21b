use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::product::ProductRecord;

/// The three ways a lookup can fail. Callers show different text for each.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Product with barcode {barcode} not found.")]
    NotFound { barcode: String },
    #[error("An API error occurred: {message}")]
    ServerError { message: String },
    #[error("Could not connect to the Health Scanner API. Please check the server connection.")]
    NetworkFailure { reason: String },
}

/// Source of product records. Implemented over HTTP by [`HealthApi`].
pub trait ProductLookup {
    fn lookup(&self, barcode: &str) -> BoxFuture<'static, Result<ProductRecord, ApiError>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HealthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HealthApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ApiError::NetworkFailure {
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}/{}", self.base_url, barcode)
    }

    pub async fn fetch(&self, barcode: &str) -> Result<ProductRecord, ApiError> {
        let url = self.product_url(barcode);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Fetch error for {url}: {e}");
            ApiError::NetworkFailure { reason: e.to_string() }
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<ProductRecord>().await.map_err(|e| {
                error!("Unreadable product body from {url}: {e}");
                ApiError::NetworkFailure { reason: e.to_string() }
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { barcode: barcode.to_string() });
        }

        // Error bodies are optional; anything unparsable falls back to the generic text.
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Server Error".to_string());
        debug!("{url} answered {status}: {message}");
        Err(ApiError::ServerError { message })
    }
}

impl ProductLookup for HealthApi {
    fn lookup(&self, barcode: &str) -> BoxFuture<'static, Result<ProductRecord, ApiError>> {
        let api = self.clone();
        let barcode = barcode.to_string();
        async move { api.fetch(&barcode).await }.boxed()
    }
}
