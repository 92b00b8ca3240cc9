//! In-process floors repository.
//!
//! Used when no database is configured and by tests. Listing follows the same
//! rules as the Postgres adapter: exact-match filter, optional floor-number
//! ordering, then offset/limit paging.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::repos::{
    CreateFloorParams, FloorQuery, FloorsRepo, RepoError, UpdateFloorParams,
};
use crate::domain::floors::{FloorOrder, FloorRecord};

const FLOOR_NUMBER_CONSTRAINT: &str = "floors_floor_number_key";

#[derive(Default)]
struct FloorTable {
    last_id: i32,
    rows: BTreeMap<i32, FloorRecord>,
}

impl FloorTable {
    fn number_taken(&self, floor_number: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|row| row.floor_number == floor_number && Some(row.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryFloors {
    table: RwLock<FloorTable>,
}

impl InMemoryFloors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing floor numbers, assigning ids in order.
    pub fn with_floors<I, S>(floor_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = FloorTable::default();
        for floor_number in floor_numbers {
            table.last_id += 1;
            let id = table.last_id;
            table.rows.insert(
                id,
                FloorRecord {
                    id,
                    floor_number: floor_number.into(),
                },
            );
        }
        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl FloorsRepo for InMemoryFloors {
    async fn list_floors(&self, query: &FloorQuery) -> Result<Vec<FloorRecord>, RepoError> {
        let table = self.table.read().await;
        let mut floors: Vec<FloorRecord> = table
            .rows
            .values()
            .filter(|row| {
                query
                    .filters()
                    .floor_number
                    .as_deref()
                    .is_none_or(|number| row.floor_number == number)
            })
            .cloned()
            .collect();

        match FloorOrder::for_query(query.sort_field(), query.is_descending()) {
            FloorOrder::Id => {}
            FloorOrder::FloorNumberAsc => floors.sort_by(|a, b| a.floor_number.cmp(&b.floor_number)),
            FloorOrder::FloorNumberDesc => {
                floors.sort_by(|a, b| b.floor_number.cmp(&a.floor_number))
            }
        }

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        Ok(floors
            .into_iter()
            .skip(offset)
            .take(query.limit() as usize)
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<FloorRecord>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn exists_by_number(&self, floor_number: &str) -> Result<bool, RepoError> {
        Ok(self.table.read().await.number_taken(floor_number, None))
    }

    async fn create_floor(&self, params: CreateFloorParams) -> Result<FloorRecord, RepoError> {
        let mut table = self.table.write().await;
        if table.number_taken(&params.floor_number, None) {
            return Err(RepoError::Duplicate {
                constraint: FLOOR_NUMBER_CONSTRAINT.to_string(),
            });
        }

        table.last_id += 1;
        let record = FloorRecord {
            id: table.last_id,
            floor_number: params.floor_number,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_floor(
        &self,
        params: UpdateFloorParams,
    ) -> Result<Option<FloorRecord>, RepoError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&params.id) {
            return Ok(None);
        }
        if table.number_taken(&params.floor_number, Some(params.id)) {
            return Err(RepoError::Duplicate {
                constraint: FLOOR_NUMBER_CONSTRAINT.to_string(),
            });
        }

        let record = FloorRecord {
            id: params.id,
            floor_number: params.floor_number,
        };
        table.rows.insert(record.id, record.clone());
        Ok(Some(record))
    }

    async fn delete_floor(&self, id: i32) -> Result<Option<FloorRecord>, RepoError> {
        Ok(self.table.write().await.rows.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::FloorFilter;

    fn numbers(floors: &[FloorRecord]) -> Vec<&str> {
        floors.iter().map(|f| f.floor_number.as_str()).collect()
    }

    #[tokio::test]
    async fn list_defaults_to_id_order() {
        let repo = InMemoryFloors::with_floors(["3", "1", "2"]);
        let floors = repo.list_floors(&FloorQuery::default()).await.unwrap();
        assert_eq!(numbers(&floors), ["3", "1", "2"]);
    }

    #[tokio::test]
    async fn list_sorts_by_floor_number() {
        let repo = InMemoryFloors::with_floors(["3", "1", "2"]);
        let asc = FloorQuery::default().sort_by("FloorNumber");
        let desc = FloorQuery::default().sort_by("floor_number").descending(true);

        assert_eq!(numbers(&repo.list_floors(&asc).await.unwrap()), ["1", "2", "3"]);
        assert_eq!(numbers(&repo.list_floors(&desc).await.unwrap()), ["3", "2", "1"]);
    }

    #[tokio::test]
    async fn list_filters_by_exact_number() {
        let repo = InMemoryFloors::with_floors(["1", "10", "11"]);
        let query = FloorQuery::new(FloorFilter::by_number(Some("1")));
        assert_eq!(numbers(&repo.list_floors(&query).await.unwrap()), ["1"]);
    }

    #[tokio::test]
    async fn list_pages_with_offset() {
        let repo = InMemoryFloors::with_floors(["a", "b", "c", "d", "e"]);
        let query = FloorQuery::default()
            .page(2)
            .and_then(|q| q.page_size(2))
            .unwrap();
        assert_eq!(numbers(&repo.list_floors(&query).await.unwrap()), ["c", "d"]);

        let past_end = FloorQuery::default().page(9).unwrap();
        assert!(repo.list_floors(&past_end).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_number() {
        let repo = InMemoryFloors::with_floors(["1"]);
        let err = repo
            .create_floor(CreateFloorParams {
                floor_number: "1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = InMemoryFloors::new();
        let updated = repo
            .update_floor(UpdateFloorParams {
                id: 1,
                floor_number: "1".into(),
            })
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(repo.delete_floor(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_own_number() {
        let repo = InMemoryFloors::with_floors(["1"]);
        let updated = repo
            .update_floor(UpdateFloorParams {
                id: 1,
                floor_number: "1".into(),
            })
            .await
            .unwrap();
        assert_eq!(updated.map(|f| f.floor_number), Some("1".to_string()));
    }
}
