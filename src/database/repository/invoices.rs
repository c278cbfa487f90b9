use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Invoice, InvoiceItem, InvoiceWithItems, NewInvoice};

pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the invoice and its items together. The account must belong to
    /// the organisation; otherwise nothing is written.
    pub async fn create(&self, org_id: i64, invoice: NewInvoice) -> Result<InvoiceWithItems, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE id = $1 AND org_id = $2")
            .bind(invoice.account_id)
            .bind(org_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Err(DatabaseError::NotFound("Account not found".to_string()));
        }

        let created = sqlx::query_as::<_, Invoice>(
            "INSERT INTO invoices (org_id, account_id, invoice_type, ref_no, inv_date, inv_title, to_name, to_address, tax_rate) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(org_id)
        .bind(invoice.account_id)
        .bind(&invoice.invoice_type)
        .bind(&invoice.ref_no)
        .bind(invoice.inv_date)
        .bind(&invoice.inv_title)
        .bind(&invoice.to_name)
        .bind(&invoice.to_address)
        .bind(&invoice.tax_rate)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(invoice.items.len());
        for item in &invoice.items {
            let row = sqlx::query_as::<_, InvoiceItem>(
                "INSERT INTO invoice_items (invoice_id, item_desc, qty, rate) VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(created.id)
            .bind(&item.item_desc)
            .bind(item.qty)
            .bind(&item.rate)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;
        tracing::info!("Created invoice {} with {} item(s) for account {}", created.id, items.len(), created.account_id);

        Ok(InvoiceWithItems { invoice: created, items })
    }
}
