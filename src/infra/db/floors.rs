use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::application::repos::{
    CreateFloorParams, FloorQuery, FloorsRepo, RepoError, UpdateFloorParams,
};
use crate::domain::floors::{FloorOrder, FloorRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct FloorRow {
    id: i32,
    floor_number: String,
}

impl From<FloorRow> for FloorRecord {
    fn from(row: FloorRow) -> Self {
        Self {
            id: row.id,
            floor_number: row.floor_number,
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, order: FloorOrder) {
    match order {
        FloorOrder::Id => qb.push(" ORDER BY id ASC"),
        FloorOrder::FloorNumberAsc => qb.push(" ORDER BY floor_number COLLATE \"C\" ASC, id ASC"),
        FloorOrder::FloorNumberDesc => {
            qb.push(" ORDER BY floor_number COLLATE \"C\" DESC, id ASC")
        }
    };
}

#[async_trait]
impl FloorsRepo for PostgresRepositories {
    async fn list_floors(&self, query: &FloorQuery) -> Result<Vec<FloorRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, floor_number FROM floors WHERE 1=1");

        if let Some(floor_number) = query.filters().floor_number.as_ref() {
            qb.push(" AND floor_number = ");
            qb.push_bind(floor_number.clone());
        }

        push_order(
            &mut qb,
            FloorOrder::for_query(query.sort_field(), query.is_descending()),
        );

        let offset = i64::try_from(query.offset())
            .map_err(|_| RepoError::InvalidInput {
                message: "page offset exceeds supported range".to_string(),
            })?;
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(query.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<FloorRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(FloorRecord::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<FloorRecord>, RepoError> {
        let row = sqlx::query_as::<_, FloorRow>("SELECT id, floor_number FROM floors WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(FloorRecord::from))
    }

    async fn exists_by_number(&self, floor_number: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM floors WHERE floor_number = $1)",
        )
        .bind(floor_number)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_floor(&self, params: CreateFloorParams) -> Result<FloorRecord, RepoError> {
        let row = sqlx::query_as::<_, FloorRow>(
            "INSERT INTO floors (floor_number) VALUES ($1) RETURNING id, floor_number",
        )
        .bind(params.floor_number)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_floor(
        &self,
        params: UpdateFloorParams,
    ) -> Result<Option<FloorRecord>, RepoError> {
        let row = sqlx::query_as::<_, FloorRow>(
            r#"
            UPDATE floors
            SET floor_number = $2
            WHERE id = $1
            RETURNING id, floor_number
            "#,
        )
        .bind(params.id)
        .bind(params.floor_number)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(FloorRecord::from))
    }

    async fn delete_floor(&self, id: i32) -> Result<Option<FloorRecord>, RepoError> {
        let row = sqlx::query_as::<_, FloorRow>(
            "DELETE FROM floors WHERE id = $1 RETURNING id, floor_number",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(FloorRecord::from))
    }
}
