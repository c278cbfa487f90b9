use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, AccountContact, AccountListing, AccountPayload, AccountSearchHit, AccountView, CustomerSummary,
};
use crate::database::query_builder::{QueryAssembler, QueryResult};
use crate::database::schema::ACCOUNTS;
use crate::filter::{ColumnRef, Predicate, SqlValue};

pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run a listing and attach each account's live customers
    pub async fn list(&self, assembler: QueryAssembler<AccountListing>) -> Result<QueryResult<AccountView>, DatabaseError> {
        let result = assembler.fetch_page(self.pool).await?;
        let ids: Vec<i64> = result.rows.iter().map(|row| row.account.id).collect();
        let mut customers = self.customers_by_account(&ids).await?;

        let rows = result
            .rows
            .into_iter()
            .map(|row| {
                let own = customers.remove(&row.account.id).unwrap_or_default();
                AccountView::new(row, own)
            })
            .collect();

        Ok(QueryResult { rows, total: result.total, page: result.page })
    }

    pub async fn find(&self, org_id: i64, id: i64) -> Result<AccountView, DatabaseError> {
        let row = QueryAssembler::<AccountListing>::new(&ACCOUNTS, org_id)
            .and(Predicate::eq(ColumnRef::new(ACCOUNTS.table, "id"), SqlValue::BigInt(id)))
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Account not found".to_string()))?;

        let mut customers = self.customers_by_account(&[id]).await?;
        Ok(AccountView::new(row, customers.remove(&id).unwrap_or_default()))
    }

    /// Live customers grouped by account id
    pub async fn customers_by_account(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<CustomerSummary>>, DatabaseError> {
        let mut grouped: HashMap<i64, Vec<CustomerSummary>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let customers = sqlx::query_as::<_, CustomerSummary>(
            "SELECT id, account_id, name, email, phone_number, address1, address2, address3 \
             FROM customers WHERE account_id = ANY($1) AND is_deleted = FALSE ORDER BY id",
        )
        .bind(ids.to_vec())
        .fetch_all(self.pool)
        .await?;

        for customer in customers {
            if let Some(account_id) = customer.account_id {
                grouped.entry(account_id).or_default().push(customer);
            }
        }
        Ok(grouped)
    }

    /// Name, email or phone containing `query`, case-insensitive, ordered by name
    pub async fn search(&self, org_id: i64, query: &str, limit: i64) -> Result<Vec<AccountSearchHit>, DatabaseError> {
        let pattern = format!("%{}%", crate::filter::filter::escape_search(query));
        let hits = sqlx::query_as::<_, AccountSearchHit>(
            "SELECT a.id, a.name, a.address, a.phone_number, a.email, a.city, a.state, a.country, a.postal_code, \
                    o.name AS organisation_name \
             FROM accounts a LEFT JOIN organisations o ON o.id = a.org_id \
             WHERE a.org_id = $1 AND (a.name ILIKE $2 OR a.email ILIKE $2 OR a.phone_number ILIKE $2) \
             ORDER BY a.name ASC, a.id DESC LIMIT $3",
        )
        .bind(org_id)
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        let mut customers = self.customers_by_account(&ids).await?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                let own = customers.remove(&hit.id).unwrap_or_default();
                hit.with_customers(own)
            })
            .collect())
    }

    pub async fn create(&self, org_id: i64, created_by: Option<i64>, payload: AccountPayload) -> Result<Account, DatabaseError> {
        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (name, industry, website, phone_number, email, address, city, state, country, \
                                   postal_code, source, account_type, org_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(payload.name)
        .bind(payload.industry)
        .bind(payload.website)
        .bind(payload.phone_number)
        .bind(payload.email)
        .bind(payload.address)
        .bind(payload.city)
        .bind(payload.state)
        .bind(payload.country)
        .bind(payload.postal_code)
        .bind(payload.source)
        .bind(payload.account_type)
        .bind(org_id)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        tracing::info!("Created account {} in organisation {}", account.id, org_id);
        Ok(account)
    }

    /// Apply the provided fields. With `owner` set, only an account created by
    /// that user matches.
    pub async fn update(
        &self,
        org_id: i64,
        id: i64,
        owner: Option<i64>,
        payload: AccountPayload,
    ) -> Result<Account, DatabaseError> {
        let fields = [
            ("name", payload.name),
            ("industry", payload.industry),
            ("website", payload.website),
            ("phone_number", payload.phone_number),
            ("email", payload.email),
            ("address", payload.address),
            ("city", payload.city),
            ("state", payload.state),
            ("country", payload.country),
            ("postal_code", payload.postal_code),
            ("source", payload.source),
            ("account_type", payload.account_type),
        ];

        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE accounts SET ");
        let mut set = qb.separated(", ");
        for (column, value) in fields {
            if let Some(value) = value {
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value);
            }
        }
        set.push("updated_at = now()");

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND org_id = ").push_bind(org_id);
        if let Some(user_id) = owner {
            qb.push(" AND created_by = ").push_bind(user_id);
        }
        qb.push(" RETURNING *");

        qb.build_query_as::<Account>()
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| {
                DatabaseError::NotFound("Account not found or you do not have permission to update it".to_string())
            })
    }

    /// Remove an account that nothing references. Runs in one transaction so
    /// a concurrent insert cannot slip in between the checks and the delete.
    pub async fn delete(&self, org_id: i64, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE id = $1 AND org_id = $2 FOR UPDATE")
            .bind(id)
            .bind(org_id)
            .fetch_optional(&mut *tx)
            .await?;
        if found.is_none() {
            return Err(DatabaseError::NotFound("Account not found".to_string()));
        }

        let (customers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers WHERE account_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if customers > 0 {
            return Err(DatabaseError::InUse(format!(
                "Cannot delete account. It has {} associated customer(s). Please remove or reassign the customers first.",
                customers
            )));
        }

        let (invoices,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE account_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if invoices > 0 {
            return Err(DatabaseError::InUse(format!(
                "Cannot delete account. It has {} associated invoice(s). Please remove or reassign the invoices first.",
                invoices
            )));
        }

        sqlx::query("DELETE FROM account_contacts WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM accounts WHERE id = $1").bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("Deleted account {} from organisation {}", id, org_id);
        Ok(())
    }

    /// The account row of the organisation, if any
    pub async fn find_plain(&self, org_id: i64, id: i64) -> Result<Account, DatabaseError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 AND org_id = $2")
            .bind(id)
            .bind(org_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Account not found".to_string()))
    }

    pub async fn contacts(&self, org_id: i64, id: i64) -> Result<(Account, Vec<AccountContact>), DatabaseError> {
        let account = self.find_plain(org_id, id).await?;
        let contacts = sqlx::query_as::<_, AccountContact>(
            "SELECT * FROM account_contacts WHERE account_id = $1 ORDER BY contact_type ASC, id ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok((account, contacts))
    }
}
