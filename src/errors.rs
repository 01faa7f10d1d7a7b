use failure::{Context, Error as FailureError};
use validator::ValidationErrors;

use crate::http::ControllerError;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error")]
    Validate(ValidationErrors),
}

#[derive(Debug, Fail)]
pub enum RepoError {
    #[fail(display = "Connection: {}", reason)]
    Connection { reason: String },
    #[fail(display = "Query: {}", reason)]
    Query { reason: String },
}

impl From<tokio_postgres::Error> for RepoError {
    fn from(v: tokio_postgres::Error) -> Self {
        RepoError::Query { reason: format!("{}", v) }
    }
}

impl From<bb8::RunError<tokio_postgres::Error>> for RepoError {
    fn from(v: bb8::RunError<tokio_postgres::Error>) -> Self {
        RepoError::Connection { reason: format!("{}", v) }
    }
}

/// Finds the first domain error in the cause chain, bare or wrapped as context.
pub fn find_error(e: &FailureError) -> Option<&Error> {
    e.iter_chain().find_map(|cause| {
        cause
            .downcast_ref::<Error>()
            .or_else(|| cause.downcast_ref::<Context<Error>>().map(|ctx| ctx.get_context()))
    })
}

impl From<FailureError> for ControllerError {
    fn from(e: FailureError) -> Self {
        match find_error(&e) {
            Some(Error::NotFound) => ControllerError::NotFound,
            Some(Error::Validate(errors)) => ControllerError::Validate(errors.clone()),
            Some(Error::Parse) => ControllerError::UnprocessableEntity(e),
            _ => ControllerError::InternalServerError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use failure::Fail;

    #[test]
    fn test_not_found_maps_through_context() {
        let e: FailureError = format_err!("order 42 is gone").context(Error::NotFound).into();

        match ControllerError::from(e) {
            ControllerError::NotFound => {}
            other => panic!("Invalid error: {}", other),
        }
    }

    #[test]
    fn test_repo_error_is_internal() {
        let e: FailureError = RepoError::Connection {
            reason: "refused".to_string(),
        }
        .context("Failed to fetch order documents")
        .into();

        match ControllerError::from(e) {
            ControllerError::InternalServerError(_) => {}
            other => panic!("Invalid error: {}", other),
        }
    }

    #[test]
    fn test_validation_errors_are_kept() {
        let mut errors = ValidationErrors::new();
        errors.add("phone", validator::ValidationError::new("phone"));
        let e: FailureError = Error::Validate(errors).into();

        match ControllerError::from(e) {
            ControllerError::Validate(errors) => assert!(errors.field_errors().contains_key("phone")),
            other => panic!("Invalid error: {}", other),
        }
    }
}
