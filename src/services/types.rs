use std::future::Future;
use std::pin::Pin;

use failure::Error as FailureError;

pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, FailureError>> + Send>>;
