//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::application::query::QueryDescriptor;
use crate::domain::floors::FloorRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Exact-match filters accepted by floor listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorFilter {
    pub floor_number: Option<String>,
}

impl FloorFilter {
    /// Blank values are treated as no filter.
    pub fn by_number(floor_number: Option<&str>) -> Self {
        let floor_number = floor_number
            .map(str::trim)
            .filter(|number| !number.is_empty())
            .map(str::to_string);
        Self { floor_number }
    }
}

pub type FloorQuery = QueryDescriptor<FloorFilter>;

#[derive(Debug, Clone)]
pub struct CreateFloorParams {
    pub floor_number: String,
}

#[derive(Debug, Clone)]
pub struct UpdateFloorParams {
    pub id: i32,
    pub floor_number: String,
}

#[async_trait]
pub trait FloorsRepo: Send + Sync {
    async fn list_floors(&self, query: &FloorQuery) -> Result<Vec<FloorRecord>, RepoError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<FloorRecord>, RepoError>;

    async fn exists_by_number(&self, floor_number: &str) -> Result<bool, RepoError>;

    async fn create_floor(&self, params: CreateFloorParams) -> Result<FloorRecord, RepoError>;

    /// Returns `None` when no floor has the given id.
    async fn update_floor(
        &self,
        params: UpdateFloorParams,
    ) -> Result<Option<FloorRecord>, RepoError>;

    /// Returns the removed floor, or `None` when no floor has the given id.
    async fn delete_floor(&self, id: i32) -> Result<Option<FloorRecord>, RepoError>;
}
