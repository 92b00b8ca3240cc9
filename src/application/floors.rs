//! Floor service: the cached read path and the mutation protocol for floors.
//!
//! Reads go through the cache-aside layer: single floors under `floor:<id>`,
//! listings under `floor:<fingerprint of the query>`. Every successful
//! mutation writes or removes the entity entry and then drops all floor
//! listings, so a client that just wrote sees its change on the next read.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{
    CreateFloorParams, FloorQuery, FloorsRepo, RepoError, UpdateFloorParams,
};
use crate::cache::{CacheAside, CacheKey, FingerprintError, ResourceKind};
use crate::domain::error::DomainError;
use crate::domain::floors::{FloorRecord, normalize_floor_number};

pub const FLOOR: ResourceKind = ResourceKind::new("floor");

#[derive(Debug, Error)]
pub enum FloorError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("floor `{id}` not found")]
    NotFound { id: i32 },
    #[error("floor number `{floor_number}` already exists")]
    Conflict { floor_number: String },
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct FloorCommand {
    pub floor_number: String,
}

#[derive(Clone)]
pub struct FloorService {
    repo: Arc<dyn FloorsRepo>,
    records: CacheAside<FloorRecord>,
    pages: CacheAside<Vec<FloorRecord>>,
}

impl FloorService {
    pub fn new(
        repo: Arc<dyn FloorsRepo>,
        records: CacheAside<FloorRecord>,
        pages: CacheAside<Vec<FloorRecord>>,
    ) -> Self {
        Self {
            repo,
            records,
            pages,
        }
    }

    /// Service that always reads from the repository.
    pub fn uncached(repo: Arc<dyn FloorsRepo>) -> Self {
        Self::new(repo, CacheAside::disabled(), CacheAside::disabled())
    }

    pub async fn list(&self, query: &FloorQuery) -> Result<Vec<FloorRecord>, FloorError> {
        let key = CacheKey::query(FLOOR, query)?;
        let fetched = self
            .pages
            .fetch_collection(&key, || async {
                self.repo.list_floors(query).await.map(Some)
            })
            .await?;
        Ok(fetched.into_option().unwrap_or_default())
    }

    pub async fn get(&self, id: i32) -> Result<FloorRecord, FloorError> {
        let key = CacheKey::entity(FLOOR, id);
        self.records
            .fetch_record(&key, || self.repo.find_by_id(id))
            .await?
            .into_option()
            .ok_or(FloorError::NotFound { id })
    }

    pub async fn create(&self, command: FloorCommand) -> Result<FloorRecord, FloorError> {
        let floor_number = normalize_floor_number(&command.floor_number)?;
        if self.repo.exists_by_number(&floor_number).await? {
            return Err(FloorError::Conflict { floor_number });
        }

        let record = self
            .repo
            .create_floor(CreateFloorParams {
                floor_number: floor_number.clone(),
            })
            .await
            .map_err(|err| conflict_or_repo(err, &floor_number))?;

        self.records
            .put_record(CacheKey::entity(FLOOR, record.id), record.clone())
            .await;
        self.pages.invalidate_collections(FLOOR).await;

        info!(
            target = "application::floors::FloorService::create",
            id = record.id,
            floor_number = %record.floor_number,
            "floor created"
        );
        Ok(record)
    }

    pub async fn update(&self, id: i32, command: FloorCommand) -> Result<FloorRecord, FloorError> {
        let floor_number = normalize_floor_number(&command.floor_number)?;
        let record = self
            .repo
            .update_floor(UpdateFloorParams {
                id,
                floor_number: floor_number.clone(),
            })
            .await
            .map_err(|err| conflict_or_repo(err, &floor_number))?
            .ok_or(FloorError::NotFound { id })?;

        self.records
            .put_record(CacheKey::entity(FLOOR, id), record.clone())
            .await;
        self.pages.invalidate_collections(FLOOR).await;

        info!(
            target = "application::floors::FloorService::update",
            id,
            floor_number = %record.floor_number,
            "floor updated"
        );
        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> Result<FloorRecord, FloorError> {
        let record = self
            .repo
            .delete_floor(id)
            .await?
            .ok_or(FloorError::NotFound { id })?;

        self.records.invalidate(&CacheKey::entity(FLOOR, id)).await;
        self.pages.invalidate_collections(FLOOR).await;

        info!(
            target = "application::floors::FloorService::delete",
            id, "floor deleted"
        );
        Ok(record)
    }
}

fn conflict_or_repo(err: RepoError, floor_number: &str) -> FloorError {
    match err {
        RepoError::Duplicate { .. } => FloorError::Conflict {
            floor_number: floor_number.to_string(),
        },
        other => FloorError::Repo(other),
    }
}
