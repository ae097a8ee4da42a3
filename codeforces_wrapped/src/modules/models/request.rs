use crate::modules::error::AppError;
use axum::{
    async_trait,
    body::HttpBody,
    extract::{rejection::JsonRejection, FromRequest},
    BoxError, Json,
};
use http::Request;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const INVALID_USERNAME: &str = "Invalid username format";
pub const INVALID_BODY: &str = "Invalid request body";

/// Unicode letters and digits only.
static HANDLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").unwrap());

#[derive(Debug, Deserialize, Validate, PartialEq, Eq, Clone, Default)]
pub struct WrappedRequest {
    #[validate(required, length(min = 1), regex = "HANDLE_PATTERN")]
    pub username: Option<String>,
}

impl WrappedRequest {
    pub fn new(username: &str) -> Self {
        Self {
            username: Some(String::from(username)),
        }
    }

    /// Validate the request and hand out the handle.
    pub fn into_handle(self) -> Result<String, AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(String::from(rejection_message(&errors))))?;

        self.username
            .ok_or_else(|| AppError::Validation(String::from(USERNAME_REQUIRED)))
    }
}

fn rejection_message(errors: &ValidationErrors) -> &'static str {
    let missing = errors
        .field_errors()
        .get("username")
        .map(|errors| {
            errors
                .iter()
                .any(|error| error.code == "required" || error.code == "length")
        })
        .unwrap_or(false);

    if missing {
        USERNAME_REQUIRED
    } else {
        INVALID_USERNAME
    }
}

/// JSON body extractor yielding a validated Codeforces handle.
pub struct ValidatedHandle(pub String);

#[async_trait]
impl<S, B> FromRequest<S, B> for ValidatedHandle
where
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = AppError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<WrappedRequest>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::warn!("Parsing error: {}", rejection);
                match rejection {
                    JsonRejection::JsonDataError(_) => {
                        AppError::Validation(String::from(INVALID_USERNAME))
                    }
                    _ => AppError::Validation(String::from(INVALID_BODY)),
                }
            })?;

        Ok(ValidatedHandle(request.into_handle()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn message(request: WrappedRequest) -> String {
        match request.into_handle() {
            Err(AppError::Validation(message)) => message,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_valid_handles() {
        for handle in ["tourist", "Benq", "jiangly2", "ksun48", "Петя"] {
            assert_eq!(
                WrappedRequest::new(handle).into_handle().unwrap(),
                String::from(handle)
            );
        }
    }

    #[test]
    fn test_missing_username() {
        assert_eq!(message(WrappedRequest::default()), USERNAME_REQUIRED);
    }

    #[test]
    fn test_empty_username() {
        assert_eq!(message(WrappedRequest::new("")), USERNAME_REQUIRED);
    }

    #[test]
    fn test_non_alphanumeric_username() {
        for handle in ["tour ist", "tourist!", "a_b", "a-b", "a.b", "tourist\n"] {
            assert_eq!(message(WrappedRequest::new(handle)), INVALID_USERNAME);
        }
    }

    #[test]
    fn test_deserialize_request() {
        let request: WrappedRequest = serde_json::from_str(r#"{"username": "tourist"}"#).unwrap();
        assert_eq!(request, WrappedRequest::new("tourist"));

        let request: WrappedRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(request, WrappedRequest::default());
    }
}
