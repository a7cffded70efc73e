//! Operation handler registry.

use crate::{error_codes, Operation, Request, Response};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Handler function type for bridge operations.
pub type HandlerFn =
    Box<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Maps each [`Operation`] to the privileged handler that serves it.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<Operation, HandlerFn>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an operation, replacing any previous one.
    pub async fn register<F, Fut>(&self, operation: Operation, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let boxed_handler: HandlerFn = Box::new(move |req| Box::pin(handler(req)));
        self.handlers.write().await.insert(operation, boxed_handler);
    }

    pub async fn is_registered(&self, operation: Operation) -> bool {
        self.handlers.read().await.contains_key(&operation)
    }

    /// Operations that still have no handler.
    pub async fn missing(&self) -> Vec<Operation> {
        let handlers = self.handlers.read().await;
        Operation::ALL
            .into_iter()
            .filter(|op| !handlers.contains_key(op))
            .collect()
    }

    /// Run the handler registered for `request.method`.
    ///
    /// The table lock is released before the handler future is awaited, so
    /// slow handlers never block each other or registration.
    pub async fn dispatch(&self, request: Request) -> Response {
        let request_id = request.id.clone();
        let operation = request.method;

        let pending = {
            let handlers = self.handlers.read().await;
            handlers.get(&operation).map(|handler| handler(request))
        };

        match pending {
            Some(future) => {
                debug!(operation = %operation, request_id = %request_id, "Dispatching");
                future.await
            }
            None => {
                warn!(operation = %operation, "No handler registered");
                Response::error(
                    &request_id,
                    error_codes::METHOD_NOT_FOUND,
                    &format!("Method not found: {}", operation),
                )
            }
        }
    }
}
