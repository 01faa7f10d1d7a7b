use std::collections::HashMap;
use std::future::Future;

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::form_urlencoded;

use super::{ControllerError, ControllerFuture};

/// Reads the whole request body and deserializes it from JSON.
pub async fn parse_body<T>(body: Body) -> Result<T, ControllerError>
where
    T: DeserializeOwned,
{
    let bytes = hyper::body::to_bytes(body)
        .await
        .map_err(|e| ControllerError::UnprocessableEntity(e.into()))?;

    serde_json::from_slice(&bytes).map_err(|e| ControllerError::UnprocessableEntity(e.into()))
}

/// Decodes a raw `application/x-www-form-urlencoded` query into a key-value map, last key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

pub fn response_with_body(body: String, content_type: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Serializes the future's result as a JSON response.
pub fn serialize_future<T, F>(f: F) -> ControllerFuture
where
    F: Future<Output = Result<T, ControllerError>> + Send + 'static,
    T: Serialize + Send,
{
    Box::pin(async move {
        let value = f.await?;
        let body = serde_json::to_string(&value).map_err(|e| ControllerError::InternalServerError(e.into()))?;
        Ok(response_with_body(body, "application/json"))
    })
}

/// Sends the future's result as is, with the given content type.
pub fn text_future<F>(f: F, content_type: &'static str) -> ControllerFuture
where
    F: Future<Output = Result<String, ControllerError>> + Send + 'static,
{
    Box::pin(async move {
        let body = f.await?;
        Ok(response_with_body(body, content_type))
    })
}
