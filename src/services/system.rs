use futures::future;

use super::types::ServiceFuture;

pub trait SystemService: Send + Sync {
    fn healthcheck(&self) -> ServiceFuture<String>;
}

#[derive(Clone, Debug, Default)]
pub struct SystemServiceImpl;

impl SystemService for SystemServiceImpl {
    fn healthcheck(&self) -> ServiceFuture<String> {
        Box::pin(future::ok("Ok".to_string()))
    }
}
