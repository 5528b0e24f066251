//! Utility modules: JSON/BSON conversion, numeric helpers.
pub mod json;
pub mod num;
