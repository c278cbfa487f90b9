pub mod visibility;

pub use visibility::VisibilityPolicy;
