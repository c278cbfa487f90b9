pub mod types;
pub mod predicate;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod filter_page;
pub mod error;

pub use error::FilterError;
pub use filter::{CompiledFilter, FilterCompiler};
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
pub use predicate::{ColumnRef, Predicate, SqlValue};
pub use types::*;
