//! # JSON
//!
//! Hand-written JSON value model, parser and writer. Every document that
//! crosses the host boundary goes through this module.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  host text ──► parser ──► JsonValue ──► domain (catalog / cart)         │
//! │                                                                         │
//! │  domain ──► ToJson ──► JsonValue ──► writer ──► host text               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod limits;
mod parser;
mod value;
mod writer;

pub use limits::{JsonLimits, DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};
pub use parser::{parse, parse_with_limits, Parser};
pub use value::{JsonNumber, JsonObject, JsonValue};
pub use writer::{to_json_string, write_string, write_value};

pub use crate::error::JsonError;

/// Types with a fixed JSON wire shape.
pub trait ToJson {
    /// Build the value tree, with object keys in wire order.
    fn to_json_value(&self) -> JsonValue;

    /// Serialize straight to text.
    fn to_json(&self) -> String {
        to_json_string(&self.to_json_value())
    }
}
