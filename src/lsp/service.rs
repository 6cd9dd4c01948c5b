//! LanguageBackend over any tower service speaking `tower_lsp::jsonrpc`
//!
//! The typical inner service is a `tower_lsp::LspService` running in-process,
//! but anything accepting jsonrpc requests works (a socket or stdio client
//! wrapped as a tower service, for instance).

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tower::buffer::Buffer;
use tower::util::BoxCloneService;
use tower::{BoxError, Service, ServiceExt};
use tower_lsp::jsonrpc::{Request, Response};
use tracing::{debug, info};

use crate::lsp::backend::LanguageBackend;
use crate::lsp::error::BackendError;

/// Maximum number of requests queued in front of the inner service
const BUFFER_BOUND: usize = 64;

type JsonRpcService = BoxCloneService<Request, Option<Response>, BoxError>;
type ServiceFactory = Box<dyn Fn() -> JsonRpcService + Send + Sync>;

pub struct ServiceBackend {
    service: Mutex<JsonRpcService>,
    factory: Option<ServiceFactory>,
    next_id: AtomicI64,
}

impl ServiceBackend {
    /// Wraps a single service instance. `restart` is unsupported.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Option<Response>> + Send + 'static,
        S::Error: Into<BoxError> + Send + Sync,
        S::Future: Send + 'static,
    {
        Self {
            service: Mutex::new(buffered(service)),
            factory: None,
            next_id: AtomicI64::new(1),
        }
    }

    /// Wraps services produced by `factory`; `restart` replaces the current one with a fresh instance.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_factory<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Service<Request, Response = Option<Response>> + Send + 'static,
        S::Error: Into<BoxError> + Send + Sync,
        S::Future: Send + 'static,
    {
        let service = buffered(factory());
        Self {
            service: Mutex::new(service),
            factory: Some(Box::new(move || buffered(factory()))),
            next_id: AtomicI64::new(1),
        }
    }

    fn current(&self) -> Result<JsonRpcService, BackendError> {
        self.service
            .lock()
            .map(|service| service.clone())
            .map_err(|_| BackendError::Closed("service lock poisoned".to_string()))
    }

    async fn call(&self, message: Request) -> Result<Option<Response>, BackendError> {
        let service = self.current()?;
        service
            .oneshot(message)
            .await
            .map_err(|e| BackendError::Closed(e.to_string()))
    }
}

fn buffered<S>(service: S) -> JsonRpcService
where
    S: Service<Request, Response = Option<Response>> + Send + 'static,
    S::Error: Into<BoxError> + Send + Sync,
    S::Future: Send + 'static,
{
    BoxCloneService::new(Buffer::new(service, BUFFER_BOUND))
}

#[async_trait]
impl LanguageBackend for ServiceBackend {
    async fn request(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("-> {} (id: {})", method, id);

        let message = Request::build(method.to_string())
            .params(params)
            .id(id)
            .finish();

        let Some(response) = self.call(message).await? else {
            return Err(BackendError::Closed(format!(
                "no response to {} (id: {})",
                method, id
            )));
        };

        let (_, result) = response.into_parts();
        result.map_err(|e| BackendError::Rpc {
            code: e.code.code(),
            message: e.message.into_owned(),
        })
    }

    async fn notify(&self, method: &str, params: Value) -> Result<(), BackendError> {
        debug!("-> {} (notification)", method);

        let message = Request::build(method.to_string()).params(params).finish();
        self.call(message).await?;
        Ok(())
    }

    async fn restart(&self) -> Result<(), BackendError> {
        let Some(factory) = &self.factory else {
            return Err(BackendError::Restart(
                "no service factory configured".to_string(),
            ));
        };

        let fresh = factory();
        let mut service = self
            .service
            .lock()
            .map_err(|_| BackendError::Restart("service lock poisoned".to_string()))?;
        *service = fresh;
        info!("Backend service replaced");
        Ok(())
    }
}
