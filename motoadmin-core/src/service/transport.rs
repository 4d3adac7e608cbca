//! src/service/transport.rs
//! ============================================================================
//! # Transport: Per-Entity REST Contract
//!
//! The `Transport` trait is the seam between the CRUD layer and the wire:
//! every verb the backend exposes for one resource, each resolving to a raw
//! `{status, data}` pair or a `TransportError`. `HttpTransport` is the
//! reqwest implementation; tests substitute mock transports.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

use crate::model::row::RowId;

/// Raw successful backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

/// Wire-level failure, carrying the HTTP status and decoded body when a
/// response was received at all.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP {status}")]
    Status { status: u16, body: Value },

    #[error("network failure: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

/// Query-string parameters.
pub type Params = Vec<(String, String)>;

/// Everything the backend exposes for one resource. Default bodies cover the
/// conventional endpoints; implementations only override the base `request`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request: `path` is relative to the resource root, `body`
    /// is sent as JSON when present.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError>;

    async fn get_all(&self, params: &Params) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, "", params, None).await
    }

    async fn get_by_id(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, &format!("{id}/"), &vec![], None)
            .await
    }

    async fn create(&self, data: Value) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, "", &vec![], Some(data)).await
    }

    async fn update(&self, id: &RowId, data: Value) -> Result<ApiResponse, TransportError> {
        self.request(Method::PUT, &format!("{id}/"), &vec![], Some(data))
            .await
    }

    async fn patch(&self, id: &RowId, data: Value) -> Result<ApiResponse, TransportError> {
        self.request(Method::PATCH, &format!("{id}/"), &vec![], Some(data))
            .await
    }

    async fn delete(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::DELETE, &format!("{id}/"), &vec![], None)
            .await
    }

    async fn activate(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, &format!("{id}/activate/"), &vec![], None)
            .await
    }

    async fn deactivate(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, &format!("{id}/deactivate/"), &vec![], None)
            .await
    }

    /// Toggle the enabled flag; an explicit state wins over toggling.
    async fn toggle_active(
        &self,
        id: &RowId,
        explicit: Option<bool>,
    ) -> Result<ApiResponse, TransportError> {
        let body = explicit.map(|state| json!({ "activo": state }));
        self.request(Method::POST, &format!("{id}/toggle-active/"), &vec![], body)
            .await
    }

    async fn soft_delete(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, &format!("{id}/soft-delete/"), &vec![], None)
            .await
    }

    async fn hard_delete(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::DELETE, &format!("{id}/hard-delete/"), &vec![], None)
            .await
    }

    async fn restore(&self, id: &RowId) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, &format!("{id}/restore/"), &vec![], None)
            .await
    }

    async fn get_active(&self, params: &Params) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, "active/", params, None).await
    }

    async fn get_inactive(&self, params: &Params) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, "inactive/", params, None).await
    }

    async fn get_deleted(&self, params: &Params) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, "deleted/", params, None).await
    }

    async fn search(&self, query: &str, params: &Params) -> Result<ApiResponse, TransportError> {
        let mut all: Params = params.clone();
        all.push(("q".to_string(), query.to_string()));
        self.request(Method::GET, "search/", &all, None).await
    }

    async fn get_stats(&self) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, "stats/", &vec![], None).await
    }

    async fn activate_multiple(&self, ids: &[RowId]) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, "activate-multiple/", &vec![], Some(ids_body(ids)))
            .await
    }

    async fn deactivate_multiple(&self, ids: &[RowId]) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, "deactivate-multiple/", &vec![], Some(ids_body(ids)))
            .await
    }

    async fn soft_delete_multiple(&self, ids: &[RowId]) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, "soft-delete-multiple/", &vec![], Some(ids_body(ids)))
            .await
    }

    async fn restore_multiple(&self, ids: &[RowId]) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, "restore-multiple/", &vec![], Some(ids_body(ids)))
            .await
    }
}

fn ids_body(ids: &[RowId]) -> Value {
    json!({ "ids": ids.iter().map(RowId::as_str).collect::<Vec<_>>() })
}

/// Reqwest-backed transport for one resource, e.g. `{base}/motos/`.
pub struct HttpTransport {
    http: Client,
    resource_url: String,
}

impl HttpTransport {
    /// `base` without trailing slash, `resource` the collection segment.
    pub fn new(http: Client, base: &str, resource: &str) -> Self {
        Self {
            http,
            resource_url: format!("{}/{}/", base.trim_end_matches('/'), resource),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError> {
        let url: String = format!("{}{}", self.resource_url, path);
        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(method, &url).query(params);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() || e.is_request() {
                TransportError::Network(e.to_string())
            } else {
                TransportError::Other(e.to_string())
            }
        })?;

        let status: StatusCode = response.status();
        // 204 and friends have no body; treat undecodable bodies as null
        let data: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                data,
            })
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                body: data,
            })
        }
    }
}
