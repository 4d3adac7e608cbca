//! src/service/error.rs
//! ============================================================================
//! # ServiceError: Normalized Service-Layer Error Taxonomy
//!
//! Every transport failure is classified into one variant here; nothing from
//! the transport escapes the service layer. Callers match on the variant (or
//! just display it) instead of catching exceptions. The service layer has no
//! notification side channel; presentation decides what to show.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::service::transport::TransportError;

/// Field-level validation messages keyed by field name.
pub type ValidationErrors = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// HTTP 400 with a field-error object body. Recoverable: the caller
    /// redisplays the form with inline messages and keeps user input.
    #[error("Datos inválidos, revise los campos marcados")]
    Validation {
        status: u16,
        fields: ValidationErrors,
    },

    /// HTTP 401.
    #[error("Sesión expirada o sin autenticación")]
    AccessDenied { status: u16 },

    /// HTTP 403.
    #[error("No tiene permisos para realizar esta acción")]
    Forbidden { status: u16 },

    /// HTTP 404, entity-name-interpolated.
    #[error("No se encontró el registro de {entity}")]
    NotFound { status: u16, entity: String },

    /// HTTP 409 with server-supplied detail.
    #[error("Conflicto: {detail}")]
    Conflict { status: u16, detail: String },

    /// HTTP 5xx. Candidate for a caller-initiated retry; this layer never
    /// retries automatically.
    #[error("Error del servidor, intente nuevamente")]
    Server { status: u16 },

    /// No HTTP response at all.
    #[error("No se pudo conectar con el servidor")]
    Network,

    /// Anything else, wrapping the underlying message.
    #[error("{0}")]
    Unexpected(String),
}

impl ServiceError {
    /// The HTTP status that produced this error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Validation { status, .. }
            | ServiceError::AccessDenied { status }
            | ServiceError::Forbidden { status }
            | ServiceError::NotFound { status, .. }
            | ServiceError::Conflict { status, .. }
            | ServiceError::Server { status } => Some(*status),
            ServiceError::Network | ServiceError::Unexpected(_) => None,
        }
    }

    /// Field-level errors, present only for the validation class. Callers use
    /// this to attach messages to fields instead of raising a banner.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation { .. })
    }
}

/// Classify a transport failure for one entity. Total: every input maps to
/// exactly one variant.
pub fn classify(err: TransportError, entity: &str) -> ServiceError {
    match err {
        TransportError::Status { status, body } => match status {
            400 => classify_bad_request(status, body),
            401 => ServiceError::AccessDenied { status },
            403 => ServiceError::Forbidden { status },
            404 => ServiceError::NotFound {
                status,
                entity: entity.to_string(),
            },
            409 => ServiceError::Conflict {
                status,
                detail: body_detail(&body)
                    .unwrap_or_else(|| "el registro fue modificado por otro usuario".to_string()),
            },
            s if s >= 500 => ServiceError::Server { status },
            _ => ServiceError::Unexpected(
                body_detail(&body).unwrap_or_else(|| format!("Respuesta inesperada HTTP {status}")),
            ),
        },
        TransportError::Network(_) => ServiceError::Network,
        TransportError::Other(msg) => ServiceError::Unexpected(msg),
    }
}

/// A 400 whose object body lacks `detail`/`error` keys is a field-error map;
/// anything else wraps the server message.
fn classify_bad_request(status: u16, body: Value) -> ServiceError {
    match &body {
        Value::Object(obj) if !obj.contains_key("detail") && !obj.contains_key("error") => {
            let fields: ValidationErrors = obj
                .iter()
                .map(|(key, value)| (key.clone(), field_messages(value)))
                .collect();
            ServiceError::Validation { status, fields }
        }
        _ => ServiceError::Unexpected(
            body_detail(&body).unwrap_or_else(|| "Solicitud inválida".to_string()),
        ),
    }
}

/// Field errors arrive as a string or an array of strings.
fn field_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

fn body_detail(body: &Value) -> Option<String> {
    body.get("detail")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(String::from)
}
