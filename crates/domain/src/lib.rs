pub mod errors;
pub mod fields;
pub mod patch;
pub mod todo;

pub use errors::*;
pub use fields::{parse_json, Schema};
pub use patch::*;
pub use todo::*;
