//! Floor records and the rules applied to their fields.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub const MAX_FLOOR_NUMBER_LEN: usize = 32;

/// A stored floor.
///
/// `floor_number` is a free-form label ("3", "B1", "Mezzanine") and is unique
/// across all floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorRecord {
    pub id: i32,
    pub floor_number: String,
}

/// Trim and validate a floor label.
pub fn normalize_floor_number(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("floor number must not be blank"));
    }
    if trimmed.chars().count() > MAX_FLOOR_NUMBER_LEN {
        return Err(DomainError::validation(format!(
            "floor number must be at most {MAX_FLOOR_NUMBER_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Ordering applied to floor listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorOrder {
    /// Insertion order.
    Id,
    FloorNumberAsc,
    FloorNumberDesc,
}

impl FloorOrder {
    /// Resolve the `sortBy` / `isDescending` pair. Only `FloorNumber` (any
    /// case) or `floor_number` sorts by number; anything else falls back to id
    /// order, where the direction flag is ignored.
    pub fn for_query(sort_by: Option<&str>, descending: bool) -> Self {
        let by_number = sort_by.is_some_and(|field| {
            field.eq_ignore_ascii_case("floornumber") || field.eq_ignore_ascii_case("floor_number")
        });
        match (by_number, descending) {
            (true, false) => FloorOrder::FloorNumberAsc,
            (true, true) => FloorOrder::FloorNumberDesc,
            (false, _) => FloorOrder::Id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_floor_number("  B1 ").unwrap(), "B1");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert!(matches!(
            normalize_floor_number("   "),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn normalize_rejects_overlong_labels() {
        let label = "9".repeat(MAX_FLOOR_NUMBER_LEN + 1);
        assert!(normalize_floor_number(&label).is_err());
        let label = "9".repeat(MAX_FLOOR_NUMBER_LEN);
        assert!(normalize_floor_number(&label).is_ok());
    }

    #[test]
    fn order_accepts_both_spellings() {
        assert_eq!(
            FloorOrder::for_query(Some("FloorNumber"), false),
            FloorOrder::FloorNumberAsc
        );
        assert_eq!(
            FloorOrder::for_query(Some("floor_number"), true),
            FloorOrder::FloorNumberDesc
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_id() {
        assert_eq!(FloorOrder::for_query(Some("name"), true), FloorOrder::Id);
        assert_eq!(FloorOrder::for_query(None, true), FloorOrder::Id);
    }

    #[test]
    fn stray_underscores_do_not_select_number_sort() {
        for field in ["f_l_o_o_r_number", "floornumber_", "_FloorNumber", "floor__number"] {
            assert_eq!(
                FloorOrder::for_query(Some(field), false),
                FloorOrder::Id,
                "{field}"
            );
        }
        assert_eq!(
            FloorOrder::for_query(Some("FLOOR_NUMBER"), false),
            FloorOrder::FloorNumberAsc
        );
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = FloorRecord {
            id: 7,
            floor_number: "7".into(),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({ "id": 7, "floorNumber": "7" })
        );
    }
}
