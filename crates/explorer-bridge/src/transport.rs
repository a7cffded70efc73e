use async_trait::async_trait;
use explorer_ipc::{HandlerRegistry, IpcClient, IpcResult, Request, Response};

/// Carries one request to the back end and brings back its response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, request: Request) -> IpcResult<Response>;
}

#[async_trait]
impl Transport for IpcClient {
    async fn invoke(&self, request: Request) -> IpcResult<Response> {
        self.call(request).await
    }
}

/// In-process transport that dispatches straight into a handler registry.
///
/// Used by the `invoke` CLI when no back end is running and by tests.
#[derive(Clone, Default)]
pub struct LocalTransport {
    registry: HandlerRegistry,
}

impl LocalTransport {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn invoke(&self, request: Request) -> IpcResult<Response> {
        Ok(self.registry.dispatch(request).await)
    }
}
