//! Minimal HTTP plumbing: a controller trait, its error type and the
//! application wrapper which turns controller results into hyper responses.

pub mod errors;
pub mod request_util;

pub use self::errors::*;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::{Body, Request, Response};

use crate::sentry_integration::log_and_capture_error;

pub type ControllerFuture = Pin<Box<dyn Future<Output = Result<Response<Body>, ControllerError>> + Send>>;

pub trait Controller: Send + Sync {
    fn call(&self, request: Request<Body>) -> ControllerFuture;
}

#[derive(Clone)]
pub struct Application {
    controller: Arc<dyn Controller>,
}

impl Application {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match self.controller.call(request).await {
            Ok(response) => {
                debug!("{} {} -> {}", method, path, response.status());
                response
            }
            Err(e) => {
                if let ControllerError::InternalServerError(_) = &e {
                    log_and_capture_error(&e);
                } else {
                    warn!("{} {} failed: {}", method, path, e);
                }

                let message = e.to_message();
                let body = serde_json::to_string(&message).unwrap_or_else(|_| "{}".to_string());
                let mut response = request_util::response_with_body(body, "application/json");
                *response.status_mut() = e.code();
                response
            }
        }
    }
}
