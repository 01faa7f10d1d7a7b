use failure::Error as FailureError;
use hyper::StatusCode;
use serde_json::Value;
use validator::ValidationErrors;

#[derive(Debug, Fail)]
pub enum ControllerError {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Bad request: {}", _0)]
    BadRequest(FailureError),
    #[fail(display = "Validation failed")]
    Validate(ValidationErrors),
    #[fail(display = "Unprocessable entity: {}", _0)]
    UnprocessableEntity(FailureError),
    #[fail(display = "Internal server error: {}", _0)]
    InternalServerError(FailureError),
}

/// Error body sent to clients
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: u16,
    pub description: String,
    pub payload: Option<Value>,
}

impl ControllerError {
    pub fn code(&self) -> StatusCode {
        use self::ControllerError::*;

        match self {
            NotFound => StatusCode::NOT_FOUND,
            BadRequest(_) | Validate(_) => StatusCode::BAD_REQUEST,
            UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_message(&self) -> ErrorMessage {
        use self::ControllerError::*;

        let code = self.code();
        let (description, payload) = match self {
            NotFound => ("Not found".to_string(), None),
            Validate(errors) => ("Validation failed".to_string(), serde_json::to_value(errors).ok()),
            // Store failures stay in the logs
            InternalServerError(_) => ("Internal server error".to_string(), None),
            BadRequest(e) | UnprocessableEntity(e) => (e.to_string(), None),
        };

        ErrorMessage {
            code: code.as_u16(),
            description,
            payload,
        }
    }
}
