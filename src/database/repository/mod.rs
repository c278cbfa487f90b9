//! Persistence for the CRM entities. Listings go through `QueryAssembler`;
//! the write paths are plain statements scoped by organisation.

pub mod account_contacts;
pub mod accounts;
pub mod invoices;

pub use account_contacts::AccountContactRepository;
pub use accounts::AccountRepository;
pub use invoices::InvoiceRepository;
