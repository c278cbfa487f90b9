use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::account::field_error;
use super::clean;
use crate::error::ApiError;

pub const INVOICE_TYPES: [&str; 3] = ["QT", "PI", "INV"];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub org_id: i64,
    pub account_id: i64,
    pub invoice_type: String,
    pub ref_no: Option<String>,
    pub inv_date: Option<NaiveDate>,
    pub inv_title: Option<String>,
    pub to_name: Option<String>,
    pub to_address: Option<String>,
    pub tax_rate: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub account_name: Option<String>,
    pub item_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub item_desc: String,
    pub qty: i64,
    pub rate: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewInvoiceItem {
    #[validate(length(min = 1, max = 1000, message = "Item description is required"))]
    pub item_desc: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub qty: i64,
    pub rate: BigDecimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewInvoice {
    pub account_id: i64,
    #[serde(rename = "type")]
    pub invoice_type: String,
    #[validate(length(max = 50))]
    pub ref_no: Option<String>,
    pub inv_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub inv_title: Option<String>,
    #[validate(length(max = 255))]
    pub to_name: Option<String>,
    pub to_address: Option<String>,
    pub tax_rate: Option<BigDecimal>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewInvoiceItem>,
}

impl NewInvoice {
    pub fn prepare(mut self) -> Result<Self, ApiError> {
        self.ref_no = clean(self.ref_no);
        self.inv_title = clean(self.inv_title);
        self.to_name = clean(self.to_name);
        self.to_address = clean(self.to_address);
        self.invoice_type = self.invoice_type.trim().to_ascii_uppercase();
        for item in &mut self.items {
            item.item_desc = item.item_desc.trim().to_string();
        }

        if self.account_id <= 0 {
            return Err(field_error("account_id", "Account ID must be a positive number"));
        }
        if !INVOICE_TYPES.contains(&self.invoice_type.as_str()) {
            return Err(field_error("type", "Invoice type must be one of QT, PI, INV"));
        }
        if let Some(rate) = &self.tax_rate {
            if rate < &BigDecimal::zero() || rate > &BigDecimal::from(100i64) {
                return Err(field_error("tax_rate", "Tax rate must be between 0 and 100"));
            }
        }
        if self.items.iter().any(|item| item.rate < BigDecimal::zero()) {
            return Err(field_error("items", "Item rate cannot be negative"));
        }
        self.validate()?;
        Ok(self)
    }
}
