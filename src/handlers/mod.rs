// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (JWT auth, organisation scoped)
pub mod protected;
pub mod public;
