use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::account::field_error;
use super::{clean, is_valid_phone};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountContact {
    pub id: i64,
    pub account_id: i64,
    /// `P` primary, `S` secondary
    pub contact_type: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `Y` or `N`
    pub is_active: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccountContact {
    pub account_id: i64,
    pub contact_type: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Contact name is required"))]
    pub name: String,
    #[validate(length(max = 100), email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub is_active: Option<String>,
}

impl NewAccountContact {
    pub fn prepare(mut self) -> Result<Self, ApiError> {
        self.name = self.name.trim().to_string();
        self.email = clean(self.email);
        self.phone = clean(self.phone);
        self.contact_type = Some(clean(self.contact_type).map(|s| s.to_ascii_uppercase()).unwrap_or_else(|| "S".into()));
        self.is_active = Some(clean(self.is_active).map(|s| s.to_ascii_uppercase()).unwrap_or_else(|| "N".into()));

        if self.account_id <= 0 {
            return Err(field_error("account_id", "Account ID must be a positive number"));
        }
        if !matches!(self.contact_type.as_deref(), Some("P" | "S")) {
            return Err(field_error("contact_type", "Contact type must be P or S"));
        }
        if !matches!(self.is_active.as_deref(), Some("Y" | "N")) {
            return Err(field_error("is_active", "is_active must be Y or N"));
        }
        self.validate()?;
        if let Some(phone) = &self.phone {
            if !is_valid_phone(phone) {
                return Err(field_error("phone", "Phone number must contain only digits, +, -, spaces, and parentheses"));
            }
        }
        Ok(self)
    }
}
