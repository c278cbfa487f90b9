use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder, Row};
use std::time::Instant;

use crate::config::CONFIG;
use crate::database::manager::DatabaseError;
use crate::database::schema::EntitySchema;
use crate::filter::filter_where::quote;
use crate::filter::{ColumnRef, CompiledFilter, FilterError, FilterOrder, FilterWhere, Page, Predicate, SortSpec, SqlValue};

/// One page of rows plus the total matching the same predicate
#[derive(Debug)]
pub struct QueryResult<T> {
    pub rows: Vec<T>,
    pub total: i64,
    pub page: Page,
}

/// Assembles the data and count queries for a listing. The organisation
/// scope is fixed at construction; filter clauses and the visibility
/// restriction are conjoined onto it.
pub struct QueryAssembler<T> {
    schema: &'static EntitySchema,
    predicates: Vec<Predicate>,
    sort: Vec<SortSpec>,
    page: Page,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryAssembler<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(schema: &'static EntitySchema, org_id: i64) -> Self {
        let mut predicates =
            vec![Predicate::eq(ColumnRef::new(schema.table, schema.org_column), SqlValue::BigInt(org_id))];
        if let Some(flag) = schema.deleted_flag {
            predicates.push(Predicate::eq(ColumnRef::new(schema.table, flag), SqlValue::Bool(false)));
        }
        Self {
            schema,
            predicates,
            sort: FilterOrder::with_defaults(vec![], schema),
            page: Page { offset: 0, limit: CONFIG.filter.default_limit },
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn filter(mut self, compiled: &CompiledFilter) -> Self {
        self.predicates.push(compiled.predicate());
        self
    }

    /// Add one more conjunct to the shared predicate
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Visibility restriction; `None` leaves the rows unrestricted
    pub fn restrict(mut self, visibility: Option<Predicate>) -> Self {
        self.predicates.extend(visibility);
        self
    }

    /// Resolve the sorting and page window carried by the filter. The legacy
    /// `offset`/`limit` query parameters apply only when the filter lacks them.
    pub fn controls(
        self,
        compiled: &CompiledFilter,
        legacy_offset: Option<&str>,
        legacy_limit: Option<&str>,
    ) -> Result<Self, FilterError> {
        let sort = FilterOrder::validate_and_parse(compiled.controls.sorting.as_ref(), self.schema)?;
        let page = Page::resolve(
            compiled.controls.offset.as_ref(),
            compiled.controls.limit.as_ref(),
            legacy_offset,
            legacy_limit,
            CONFIG.filter.default_limit,
            CONFIG.filter.max_limit,
        )?;
        Ok(self.order(sort).page(page))
    }

    pub fn order(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = FilterOrder::with_defaults(sort, self.schema);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Shared WHERE predicate of the data and count queries
    pub fn predicate(&self) -> Predicate {
        Predicate::and(self.predicates.clone())
    }

    pub fn data_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.schema.listing.select);
        qb.push(" FROM ");
        qb.push(quote(self.schema.table));
        qb.push(self.schema.listing.joins);
        qb.push(" WHERE ");
        FilterWhere::push(&mut qb, &self.predicate());
        FilterOrder::push(&mut qb, &self.sort, self.schema.table);
        qb.push(" LIMIT ");
        qb.push_bind(self.page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.page.offset);
        qb
    }

    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) AS count FROM ");
        qb.push(quote(self.schema.table));
        qb.push(" WHERE ");
        FilterWhere::push(&mut qb, &self.predicate());
        qb
    }

    /// First row of the data query, skipping the count
    pub async fn fetch_optional(self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let mut data = self.page(Page { offset: 0, limit: 1 }).data_query();
        Ok(data.build_query_as::<T>().fetch_optional(pool).await?)
    }

    /// Run the page and the count concurrently
    pub async fn fetch_page(self, pool: &PgPool) -> Result<QueryResult<T>, DatabaseError> {
        let mut data = self.data_query();
        let mut count = self.count_query();

        if CONFIG.database.enable_query_logging {
            tracing::debug!(table = self.schema.table, sql = data.sql(), "listing query");
        }

        let started = Instant::now();
        let (rows, count_row) = tokio::try_join!(
            data.build_query_as::<T>().fetch_all(pool),
            count.build().fetch_one(pool),
        )?;
        let total: i64 = count_row.try_get("count")?;

        let elapsed = started.elapsed();
        if elapsed.as_millis() as u64 > CONFIG.database.slow_query_threshold_ms {
            tracing::warn!(
                "Slow listing on {}: {}ms (offset {}, limit {})",
                self.schema.table,
                elapsed.as_millis(),
                self.page.offset,
                self.page.limit
            );
        }

        Ok(QueryResult { rows, total, page: self.page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserType;
    use crate::database::schema::{ACCOUNTS, CUSTOMERS};
    use crate::filter::{FilterCompiler, FilterParams, SortDirection};
    use crate::policy::VisibilityPolicy;
    use serde_json::json;

    #[derive(sqlx::FromRow)]
    struct IdOnly {
        #[allow(dead_code)]
        id: i64,
    }

    fn compiled(filter: serde_json::Value, filter_op: serde_json::Value) -> CompiledFilter {
        let params = FilterParams { filter: filter.as_object().cloned(), filter_op: filter_op.as_object().cloned() };
        FilterCompiler::new(&ACCOUNTS).compile(&params).unwrap()
    }

    #[test]
    fn organisation_scope_is_always_present() {
        let assembler = QueryAssembler::<IdOnly>::new(&ACCOUNTS, 9);
        let count = assembler.count_query();
        assert_eq!(count.sql(), r#"SELECT COUNT(*) AS count FROM "accounts" WHERE "accounts"."org_id" = $1"#);
    }

    #[test]
    fn data_and_count_share_the_predicate() {
        let filter = compiled(json!({"account_type": "Customer"}), json!({"account_type": "eq"}));
        let visibility = VisibilityPolicy::accounts().restrict_for(&UserType::Member("sales".into()), Some(2), Some(9));
        let assembler = QueryAssembler::<IdOnly>::new(&ACCOUNTS, 9)
            .filter(&filter)
            .restrict(visibility)
            .order(vec![SortSpec { column: "name", direction: SortDirection::Asc }])
            .page(Page { offset: 20, limit: 10 });

        let data = assembler.data_query();
        let count = assembler.count_query();
        let mut shared = QueryBuilder::<Postgres>::new("");
        FilterWhere::push(&mut shared, &assembler.predicate());

        assert!(data.sql().contains(&format!(" WHERE {} ORDER BY", shared.sql())));
        assert!(count.sql().ends_with(&format!(" WHERE {}", shared.sql())));
        assert!(data.sql().contains(r#" ORDER BY "accounts"."name" ASC, "accounts"."id" DESC LIMIT $"#));
        assert!(data.sql().contains(r#"LEFT JOIN "organisations" "o""#));
        assert!(count.sql().contains(r#"("accounts"."org_id" = $1 AND "accounts"."account_type" = $2 AND ("#));
    }

    #[test]
    fn admin_listing_has_no_exists_clauses() {
        let visibility = VisibilityPolicy::accounts().restrict_for(&UserType::Admin, Some(1), Some(9));
        let assembler = QueryAssembler::<IdOnly>::new(&ACCOUNTS, 9).restrict(visibility);
        assert!(!assembler.count_query().sql().contains("EXISTS"));
    }

    #[test]
    fn controls_resolve_sorting_and_page() {
        let filter = compiled(
            json!({"offset": 30, "limit": 500, "sorting": [{"colId": "city", "sort": "asc"}]}),
            json!({}),
        );
        let assembler = QueryAssembler::<IdOnly>::new(&ACCOUNTS, 1).controls(&filter, Some("0"), Some("5")).unwrap();
        assert_eq!(assembler.page, Page { offset: 30, limit: CONFIG.filter.max_limit });
        assert!(assembler.data_query().sql().contains(r#"ORDER BY "accounts"."city" ASC, "accounts"."id" DESC"#));

        let bad = compiled(json!({"sorting": [{"colId": "password", "sort": "asc"}]}), json!({}));
        assert!(QueryAssembler::<IdOnly>::new(&ACCOUNTS, 1).controls(&bad, None, None).is_err());
    }

    #[test]
    fn soft_deleted_rows_are_excluded() {
        let assembler = QueryAssembler::<IdOnly>::new(&CUSTOMERS, 4);
        assert_eq!(
            assembler.count_query().sql(),
            r#"SELECT COUNT(*) AS count FROM "customers" WHERE ("customers"."org_id" = $1 AND "customers"."is_deleted" = $2)"#
        );
    }

    #[test]
    fn default_order_is_newest_first() {
        let assembler = QueryAssembler::<IdOnly>::new(&ACCOUNTS, 1);
        assert!(assembler
            .data_query()
            .sql()
            .contains(r#" ORDER BY "accounts"."created_at" DESC, "accounts"."id" DESC LIMIT $2 OFFSET $3"#));
    }
}
