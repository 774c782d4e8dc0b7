//! Wire types for the telehealth backend.
//!
//! Every response is decoded into one of these structures; required fields
//! missing from a payload fail decoding instead of surfacing later.

pub mod appointment;
pub mod certificate;
pub mod diagnosis;
pub mod enums;
pub mod prescription;
pub mod receipt;
pub mod user;

pub use appointment::*;
pub use certificate::*;
pub use diagnosis::*;
pub use enums::*;
pub use prescription::*;
pub use receipt::*;
pub use user::*;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}

/// Drop `id` from every object that also carries `_id`.
///
/// Backends that serialize Mongo virtuals send both keys with the same value.
/// The models accept either key through an alias, but not both at once, so
/// `_id` wins and the duplicate goes. Nested objects and arrays are included.
pub fn collapse_duplicate_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("_id") {
                map.remove("id");
            }
            map.values_mut().for_each(collapse_duplicate_ids);
        }
        Value::Array(items) => items.iter_mut().for_each(collapse_duplicate_ids),
        _ => {}
    }
}
