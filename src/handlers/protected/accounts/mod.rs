pub mod contacts;
pub mod create;
pub mod list;
pub mod record;
pub mod search;

pub use contacts::get as contacts_get;
pub use create::post as create_post;
pub use list::get as list_get;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;
pub use search::get as search_get;
