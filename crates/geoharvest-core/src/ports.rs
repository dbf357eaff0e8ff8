//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

use crate::error::Result;
use crate::fetch::FetchRequest;
use crate::models::OutputFeatureCollection;
use async_trait::async_trait;
use thiserror::Error;

/// Raw outcome of a single HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete an exchange at all (DNS, connect, TLS, body read)
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Port for performing one GET request; retries and timeouts belong to the caller
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &FetchRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Port for the downstream consumer of a finished collection
#[async_trait]
pub trait FeatureSink: Send + Sync {
    /// Accept the complete collection; called at most once per run
    async fn submit(&self, collection: &OutputFeatureCollection) -> Result<()>;
}
