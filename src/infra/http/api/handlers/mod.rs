//! API handlers organized by resource type.
//!
//! Service and repository errors convert into [`ApiError`] here so handlers
//! can use `?` directly.

mod floors;

pub use floors::*;

use crate::application::floors::FloorError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

use super::error::{ApiError, ErrorCode};

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { constraint } => {
                ApiError::new(ErrorCode::Duplicate, "Duplicate record").with_hint(constraint)
            }
            RepoError::NotFound => ApiError::not_found("resource not found"),
            RepoError::InvalidInput { message } => {
                ApiError::new(ErrorCode::InvalidInput, "Invalid input").with_hint(message)
            }
            RepoError::Integrity { message } => {
                ApiError::new(ErrorCode::Integrity, "Integrity constraint violated")
                    .with_hint(message)
            }
            RepoError::Timeout => ApiError::new(ErrorCode::DbTimeout, "Database timeout"),
            RepoError::Persistence(message) => {
                ApiError::new(ErrorCode::Repo, "Persistence error").with_hint(message)
            }
        }
    }
}

impl From<FloorError> for ApiError {
    fn from(err: FloorError) -> Self {
        match err {
            FloorError::Validation(DomainError::Validation { message }) => {
                ApiError::new(ErrorCode::InvalidInput, "Invalid floor").with_hint(message)
            }
            FloorError::NotFound { .. } => ApiError::not_found("floor not found"),
            FloorError::Conflict { floor_number } => {
                ApiError::new(ErrorCode::Conflict, "Floor number already exists")
                    .with_hint(format!("floor number `{floor_number}` is taken"))
            }
            FloorError::Fingerprint(err) => {
                ApiError::new(ErrorCode::Internal, "Query could not be processed")
                    .with_hint(err.to_string())
            }
            FloorError::Repo(repo) => repo.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn repo_errors_map_to_statuses() {
        let cases = [
            (
                RepoError::Duplicate {
                    constraint: "floors_floor_number_key".into(),
                },
                StatusCode::CONFLICT,
            ),
            (RepoError::NotFound, StatusCode::NOT_FOUND),
            (
                RepoError::InvalidInput {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (RepoError::Timeout, StatusCode::SERVICE_UNAVAILABLE),
            (
                RepoError::Persistence("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn floor_conflict_names_the_number() {
        let err = ApiError::from(FloorError::Conflict {
            floor_number: "3".into(),
        });
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn floor_errors_map_to_statuses() {
        let missing = ApiError::from(FloorError::NotFound { id: 9 });
        assert_eq!(missing.code(), ErrorCode::NotFound);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(FloorError::Validation(DomainError::validation("blank")));
        assert_eq!(invalid.code(), ErrorCode::InvalidInput);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
