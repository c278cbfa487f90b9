pub mod accounts;
pub mod migrate;
pub mod token;
