pub mod account;
pub mod account_contact;
pub mod customer;
pub mod invoice;

pub use account::{Account, AccountListing, AccountPayload, AccountSearchHit, AccountView};
pub use account_contact::{AccountContact, NewAccountContact};
pub use customer::{CustomerListing, CustomerSummary};
pub use invoice::{Invoice, InvoiceItem, InvoiceListing, InvoiceWithItems, NewInvoice, NewInvoiceItem};

/// Trim, turning blank strings into `None`
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Digits, `+`, `-`, spaces and parentheses only
pub(crate) fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

/// Non-empty parts joined with ", "
pub(crate) fn join_address(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
