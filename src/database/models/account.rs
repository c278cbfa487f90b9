use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::customer::CustomerSummary;
use super::{clean, is_valid_phone, join_address};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub source: Option<String>,
    pub account_type: Option<String>,
    pub org_id: i64,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn full_address(&self) -> String {
        join_address(&[
            self.address.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
            self.postal_code.as_deref(),
        ])
    }
}

/// Row shape of the listing query: the account plus joined and counted columns
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub account: Account,
    pub organisation_name: Option<String>,
    pub creator_first_name: Option<String>,
    pub creator_last_name: Option<String>,
    pub customer_count: i64,
    pub invoice_count: i64,
}

/// Account as returned to clients, with derived fields attached
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub listing: AccountListing,
    pub full_address: String,
    pub customers: Vec<CustomerSummary>,
}

impl AccountView {
    pub fn new(listing: AccountListing, customers: Vec<CustomerSummary>) -> Self {
        let full_address = listing.account.full_address();
        Self { listing, full_address, customers }
    }
}

/// Quick lookup result for the account picker
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountSearchHit {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub organisation_name: Option<String>,
    #[sqlx(skip)]
    pub full_address: String,
    #[sqlx(skip)]
    pub customers: Vec<CustomerSummary>,
}

impl AccountSearchHit {
    pub fn with_customers(mut self, customers: Vec<CustomerSummary>) -> Self {
        self.full_address = join_address(&[
            self.address.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
            self.postal_code.as_deref(),
        ]);
        self.customers = customers;
        self
    }
}

/// Create and update body. `org_id` and `created_by` come from the caller's
/// token, never from here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AccountPayload {
    #[validate(length(min = 1, max = 255, message = "Account name cannot exceed 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[validate(length(max = 255), url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100), email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub source: Option<String>,
    #[validate(length(max = 100))]
    pub account_type: Option<String>,
}

impl AccountPayload {
    pub fn normalized(self) -> Self {
        Self {
            name: clean(self.name),
            industry: clean(self.industry),
            website: clean(self.website),
            phone_number: clean(self.phone_number),
            email: clean(self.email),
            address: clean(self.address),
            city: clean(self.city),
            state: clean(self.state),
            country: clean(self.country),
            postal_code: clean(self.postal_code),
            source: clean(self.source),
            account_type: clean(self.account_type),
        }
    }

    /// Normalize then validate. Creation additionally requires a name.
    pub fn prepare(self, creating: bool) -> Result<Self, ApiError> {
        let payload = self.normalized();
        if creating && payload.name.is_none() {
            return Err(field_error("name", "Account name is required"));
        }
        if !creating && payload.is_empty() {
            return Err(ApiError::validation_error("At least one field must be provided", None));
        }
        payload.validate()?;
        if let Some(phone) = &payload.phone_number {
            if !is_valid_phone(phone) {
                return Err(field_error(
                    "phone_number",
                    "Phone number must contain only digits, +, -, spaces, and parentheses",
                ));
            }
        }
        Ok(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.industry.is_none()
            && self.website.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.postal_code.is_none()
            && self.source.is_none()
            && self.account_type.is_none()
    }
}

pub(crate) fn field_error(field: &str, message: &str) -> ApiError {
    let mut field_errors = std::collections::HashMap::new();
    field_errors.insert(field.to_string(), message.to_string());
    ApiError::validation_error(message, Some(field_errors))
}
