//! src/service/crud.rs
//! ============================================================================
//! # CrudService: Normalized Per-Entity Verbs
//!
//! Wraps one `Transport` and resolves every call to the same normalized
//! shape: `Ok(ServiceReply)` or a classified `ServiceError`. One call is
//! idle → in-flight → terminal; there is no automatic retry and no
//! notification side effect at this layer. Transport failures never
//! propagate past this boundary.

use std::sync::Arc;

use serde_json::Value;

use crate::model::actions::BulkAction;
use crate::model::row::RowId;
use crate::service::error::{ServiceError, classify};
use crate::service::transport::{ApiResponse, Params, Transport, TransportError};

/// Normalized successful result of any service call.
#[derive(Debug, Clone)]
pub struct ServiceReply {
    pub status: u16,
    pub data: Value,
}

pub type ServiceResult = Result<ServiceReply, ServiceError>;

/// One entity's CRUD surface over a transport.
#[derive(Clone)]
pub struct CrudService {
    entity: String,
    transport: Arc<dyn Transport>,
}

impl CrudService {
    pub fn new(entity: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            entity: entity.into(),
            transport,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    fn normalize(&self, result: Result<ApiResponse, TransportError>) -> ServiceResult {
        match result {
            Ok(response) => Ok(ServiceReply {
                status: response.status,
                data: response.data,
            }),
            Err(err) => {
                let classified: ServiceError = classify(err, &self.entity);
                // validation errors are the caller's to attach to fields;
                // only the whole-view classes are worth a log line here
                if !classified.is_validation() {
                    tracing::warn!("{} call failed: {}", self.entity, classified);
                }
                Err(classified)
            }
        }
    }

    pub async fn list(&self, params: &Params) -> ServiceResult {
        self.normalize(self.transport.get_all(params).await)
    }

    pub async fn get(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.get_by_id(id).await)
    }

    pub async fn create(&self, data: Value) -> ServiceResult {
        self.normalize(self.transport.create(data).await)
    }

    pub async fn update(&self, id: &RowId, data: Value) -> ServiceResult {
        self.normalize(self.transport.update(id, data).await)
    }

    pub async fn patch(&self, id: &RowId, data: Value) -> ServiceResult {
        self.normalize(self.transport.patch(id, data).await)
    }

    pub async fn delete(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.delete(id).await)
    }

    pub async fn activate(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.activate(id).await)
    }

    pub async fn deactivate(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.deactivate(id).await)
    }

    pub async fn toggle_active(&self, id: &RowId, explicit: Option<bool>) -> ServiceResult {
        self.normalize(self.transport.toggle_active(id, explicit).await)
    }

    pub async fn soft_delete(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.soft_delete(id).await)
    }

    pub async fn hard_delete(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.hard_delete(id).await)
    }

    pub async fn restore(&self, id: &RowId) -> ServiceResult {
        self.normalize(self.transport.restore(id).await)
    }

    pub async fn list_active(&self, params: &Params) -> ServiceResult {
        self.normalize(self.transport.get_active(params).await)
    }

    pub async fn list_inactive(&self, params: &Params) -> ServiceResult {
        self.normalize(self.transport.get_inactive(params).await)
    }

    pub async fn list_deleted(&self, params: &Params) -> ServiceResult {
        self.normalize(self.transport.get_deleted(params).await)
    }

    pub async fn search(&self, query: &str, params: &Params) -> ServiceResult {
        self.normalize(self.transport.search(query, params).await)
    }

    pub async fn stats(&self) -> ServiceResult {
        self.normalize(self.transport.get_stats().await)
    }

    pub async fn activate_multiple(&self, ids: &[RowId]) -> ServiceResult {
        self.normalize(self.transport.activate_multiple(ids).await)
    }

    pub async fn deactivate_multiple(&self, ids: &[RowId]) -> ServiceResult {
        self.normalize(self.transport.deactivate_multiple(ids).await)
    }

    pub async fn soft_delete_multiple(&self, ids: &[RowId]) -> ServiceResult {
        self.normalize(self.transport.soft_delete_multiple(ids).await)
    }

    pub async fn restore_multiple(&self, ids: &[RowId]) -> ServiceResult {
        self.normalize(self.transport.restore_multiple(ids).await)
    }

    /// Dispatch the bulk verb matching a `BulkAction`.
    pub async fn bulk(&self, action: BulkAction, ids: &[RowId]) -> ServiceResult {
        match action {
            BulkAction::Activate => self.activate_multiple(ids).await,
            BulkAction::Deactivate => self.deactivate_multiple(ids).await,
            BulkAction::SoftDelete => self.soft_delete_multiple(ids).await,
            BulkAction::Restore => self.restore_multiple(ids).await,
        }
    }
}

impl std::fmt::Debug for CrudService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("entity", &self.entity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted transport: answers every request with a fixed outcome and
    /// records the paths it was asked for.
    struct MockTransport {
        outcome: Result<ApiResponse, TransportError>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn ok(status: u16, data: Value) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(ApiResponse { status, data }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn err(err: TransportError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(err),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn request(
            &self,
            method: Method,
            path: &str,
            _params: &Params,
            _body: Option<Value>,
        ) -> Result<ApiResponse, TransportError> {
            self.calls.lock().unwrap().push(format!("{method} {path}"));
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_success_passes_data_and_status_through() {
        let transport = MockTransport::ok(200, json!({"results": []}));
        let service = CrudService::new("moto", transport);
        let reply = service.list(&vec![]).await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.data, json!({"results": []}));
    }

    #[tokio::test]
    async fn test_get_by_404_names_entity_without_panicking() {
        let transport = MockTransport::err(TransportError::Status {
            status: 404,
            body: json!({"detail": "Not found."}),
        });
        let service = CrudService::new("moto", transport);

        let err = service.get(&RowId::new("7")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("moto"));
    }

    #[tokio::test]
    async fn test_create_400_yields_field_errors() {
        let transport = MockTransport::err(TransportError::Status {
            status: 400,
            body: json!({"nombre": ["required"]}),
        });
        let service = CrudService::new("moto", transport);

        let err = service.create(json!({"placa": "ABC-123"})).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.validation_errors().unwrap()["nombre"], vec!["required"]);
    }

    #[tokio::test]
    async fn test_network_failure_normalizes() {
        let transport = MockTransport::err(TransportError::Network("refused".into()));
        let service = CrudService::new("rol", transport);
        assert_eq!(
            service.delete(&RowId::new("1")).await.unwrap_err(),
            ServiceError::Network
        );
    }

    #[tokio::test]
    async fn test_bulk_dispatches_matching_endpoint() {
        let transport = MockTransport::ok(200, json!({"updated": 2}));
        let service = CrudService::new("moto", transport.clone());
        let ids = [RowId::new("7"), RowId::new("9")];

        service.bulk(BulkAction::Activate, &ids).await.unwrap();
        service.bulk(BulkAction::SoftDelete, &ids).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0], "POST activate-multiple/");
        assert_eq!(calls[1], "POST soft-delete-multiple/");
    }
}
