use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use super::error::FilterError;
use super::filter_where::quote;
use super::types::{SortDirection, SortSpec};
use crate::database::schema::EntitySchema;

const TIEBREAK_COLUMN: &str = "id";

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `[{colId, sort}, ...]`. Entries missing either key are skipped;
    /// a column outside the entity's sortable list is an error.
    pub fn validate_and_parse(sorting: Option<&Value>, schema: &EntitySchema) -> Result<Vec<SortSpec>, FilterError> {
        let entries = match sorting {
            None | Some(Value::Null) => return Ok(vec![]),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(FilterError::InvalidSorting("sorting must be an array".to_string())),
        };

        let mut specs = Vec::new();
        for entry in entries {
            let (Some(col_id), Some(sort)) = (
                entry.get("colId").and_then(Value::as_str),
                entry.get("sort").and_then(Value::as_str),
            ) else {
                continue;
            };
            let column = schema
                .sortable_column(col_id)
                .ok_or_else(|| FilterError::InvalidSortColumn(col_id.to_string()))?;
            let direction =
                SortDirection::parse(sort).ok_or_else(|| FilterError::InvalidSortDirection(sort.to_string()))?;
            specs.push(SortSpec { column, direction });
        }
        Ok(specs)
    }

    /// Fall back to the entity's default order and append `id DESC` so pages
    /// are stable across equal sort keys.
    pub fn with_defaults(mut specs: Vec<SortSpec>, schema: &EntitySchema) -> Vec<SortSpec> {
        if specs.is_empty() {
            let (column, direction) = schema.default_sort;
            specs.push(SortSpec { column, direction });
        }
        if !specs.iter().any(|s| s.column == TIEBREAK_COLUMN) {
            specs.push(SortSpec { column: TIEBREAK_COLUMN, direction: SortDirection::Desc });
        }
        specs
    }

    pub fn push(qb: &mut QueryBuilder<'static, Postgres>, specs: &[SortSpec], qualifier: &str) {
        if specs.is_empty() {
            return;
        }
        qb.push(" ORDER BY ");
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(format!("{}.{} {}", quote(qualifier), quote(spec.column), spec.direction.to_sql()));
        }
    }
}
