//! src/service/registry.rs
//! ============================================================================
//! # ServiceRegistry: One CrudService per Entity
//!
//! Built once at startup from an entity-key → transport map and read-only
//! thereafter. Per-entity specialization happens at build time: either hand
//! the builder a plain transport or a pre-assembled `CrudService` wrapping
//! extra behavior around the same transport.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::service::crud::CrudService;
use crate::service::transport::Transport;

#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    services: HashMap<String, Arc<CrudService>>,
}

impl ServiceRegistryBuilder {
    /// Register a standard CrudService for an entity.
    pub fn entity(mut self, key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let key: String = key.into();
        self.services
            .insert(key.clone(), Arc::new(CrudService::new(key, transport)));
        self
    }

    /// Register a pre-assembled service (extension point for entities that
    /// need verbs beyond the standard set).
    pub fn service(mut self, key: impl Into<String>, service: CrudService) -> Self {
        self.services.insert(key.into(), Arc::new(service));
        self
    }

    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            services: self.services,
        }
    }
}

/// Read-only map of entity key → service. Construction is synchronous and
/// side-effect-free.
#[derive(Debug)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<CrudService>>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    pub fn get(&self, key: &str) -> Result<Arc<CrudService>, AppError> {
        self.services
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::UnknownEntity(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }

    /// Registered entity keys, sorted for stable display.
    pub fn entities(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.services.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::transport::{ApiResponse, Params, TransportError};
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::Value;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn request(
            &self,
            _method: Method,
            _path: &str,
            _params: &Params,
            _body: Option<Value>,
        ) -> Result<ApiResponse, TransportError> {
            Ok(ApiResponse {
                status: 200,
                data: Value::Null,
            })
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = ServiceRegistry::builder()
            .entity("motos", Arc::new(NullTransport))
            .entity("roles", Arc::new(NullTransport))
            .build();

        assert!(registry.contains("motos"));
        assert_eq!(registry.get("roles").unwrap().entity(), "roles");
        assert_eq!(registry.entities(), vec!["motos", "roles"]);
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let registry = ServiceRegistry::builder().build();
        assert!(matches!(
            registry.get("recordatorios"),
            Err(AppError::UnknownEntity(_))
        ));
    }
}
