mod core;
mod types;

pub use self::core::Document;
pub use self::types::{CREATED_AT_FIELD, ID_FIELD, Metadata};
