use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{AccountContact, NewAccountContact};

pub struct AccountContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountContactRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, org_id: i64, contact: NewAccountContact) -> Result<AccountContact, DatabaseError> {
        let created = sqlx::query_as::<_, AccountContact>(
            "INSERT INTO account_contacts (account_id, contact_type, name, email, phone, is_active) \
             SELECT a.id, $3, $4, $5, $6, $7 FROM accounts a WHERE a.id = $1 AND a.org_id = $2 \
             RETURNING *",
        )
        .bind(contact.account_id)
        .bind(org_id)
        .bind(contact.contact_type.as_deref().unwrap_or("S"))
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.is_active.as_deref().unwrap_or("N"))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Account not found".to_string()))?;

        tracing::info!("Added contact {} to account {}", created.id, created.account_id);
        Ok(created)
    }
}
