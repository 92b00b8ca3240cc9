use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;

/// Stable, machine-readable error codes returned in the `error.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Conflict,
    Duplicate,
    InvalidInput,
    #[serde(rename = "integrity_error")]
    Integrity,
    DbTimeout,
    #[serde(rename = "repo_error")]
    Repo,
    #[serde(rename = "internal_error")]
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::Duplicate => "duplicate",
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::Integrity => "integrity_error",
            ErrorCode::DbTimeout => "db_timeout",
            ErrorCode::Repo => "repo_error",
            ErrorCode::Internal => "internal_error",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::Duplicate | ErrorCode::Integrity => {
                StatusCode::CONFLICT
            }
            ErrorCode::DbTimeout => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Repo | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

/// Error returned by API handlers, rendered as `{ "error": { code, message, hint? } }`.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: &'static str) -> Self {
        Self {
            code,
            message,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn bad_request(message: &'static str, hint: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message).with_hint(hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                hint: self.hint.as_deref(),
            },
        };
        let mut response = (status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            status,
            format!(
                "{}: {}",
                self.code.as_str(),
                self.hint.as_deref().unwrap_or(self.message)
            ),
        )
        .attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[test]
    fn serialized_codes_match_wire_names() {
        for code in [
            ErrorCode::BadRequest,
            ErrorCode::NotFound,
            ErrorCode::Conflict,
            ErrorCode::Duplicate,
            ErrorCode::InvalidInput,
            ErrorCode::Integrity,
            ErrorCode::DbTimeout,
            ErrorCode::Repo,
            ErrorCode::Internal,
        ] {
            assert_eq!(serde_json::to_value(code).expect("code"), json!(code.as_str()));
        }
    }

    #[tokio::test]
    async fn hint_is_omitted_when_absent() {
        let (status, body) = body_of(ApiError::not_found("floor not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "error": { "code": "not_found", "message": "floor not found" } })
        );
    }

    #[tokio::test]
    async fn report_is_attached_for_logging() {
        let response = ApiError::new(ErrorCode::DbTimeout, "Database timeout")
            .with_hint("pool exhausted")
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.messages, vec!["db_timeout: pool exhausted".to_string()]);
    }
}
