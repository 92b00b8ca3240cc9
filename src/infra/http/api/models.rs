use serde::{Deserialize, Serialize};

use crate::domain::floors::FloorRecord;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorDto {
    pub id: i32,
    pub floor_number: String,
}

impl From<FloorRecord> for FloorDto {
    fn from(record: FloorRecord) -> Self {
        Self {
            id: record.id,
            floor_number: record.floor_number,
        }
    }
}

/// Body of `POST /api/floor` and `PUT /api/floor/{id}`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorWriteRequest {
    pub floor_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorListQuery {
    pub sort_by: Option<String>,
    pub is_descending: Option<bool>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub floor_number: Option<String>,
}
