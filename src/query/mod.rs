mod eval;
mod exec;
mod parse;
mod types;

pub use eval::{compare_bson, compare_docs, compare_values, eval_filter, project_fields};
pub use exec::{count_docs, find_docs};
pub use parse::{OPERATOR_MARKER, parse_filter_document, parse_filter_json};
pub use types::{CmpOp, Filter, FindOptions, Order, Projection, SortSpec};
