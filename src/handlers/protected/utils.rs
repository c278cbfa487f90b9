use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use crate::database::schema::EntitySchema;
use crate::database::QueryAssembler;
use crate::error::ApiError;
use crate::filter::{FilterCompiler, FilterParams};

/// Query string shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// JSON object of field → value, plus `offset`, `limit`, `sorting`, `search_attr`
    pub filters: Option<String>,
    /// JSON object of field → operator token
    pub filter_op: Option<String>,
    /// Legacy pagination, used only when `filters` carries none
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Compile the caller's filter into an organisation-scoped assembler. Every
/// validation failure surfaces here, before any query is issued.
pub fn listing<T>(schema: &'static EntitySchema, org_id: i64, query: &ListQuery) -> Result<QueryAssembler<T>, ApiError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let params = FilterParams::from_query(query.filters.as_deref(), query.filter_op.as_deref())?;
    let compiled = FilterCompiler::new(schema).compile(&params)?;

    let assembler = QueryAssembler::new(schema, org_id)
        .filter(&compiled)
        .controls(&compiled, query.offset.as_deref(), query.limit.as_deref())?;
    Ok(assembler)
}

/// Empty or whitespace-only query values count as absent
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
