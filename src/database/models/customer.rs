use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub org_id: i64,
    pub account_id: Option<i64>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub category: Option<String>,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub account_name: Option<String>,
}

/// Customer as embedded under an account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerSummary {
    pub id: i64,
    #[serde(skip)]
    pub account_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
}
