// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Every handler receives the `AuthUser` inserted by `jwt_auth_middleware`
// and works inside the caller's organisation.
pub mod account_contacts;
pub mod accounts;
pub mod customers;
pub mod invoices;
pub mod utils;
