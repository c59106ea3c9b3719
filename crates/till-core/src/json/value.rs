//! JSON value types.
//!
//! `JsonValue` is the in-memory form of every document crossing the host
//! boundary, in both directions.

use indexmap::map::Entry;
use indexmap::IndexMap;

/// A parsed or constructed JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    /// JSON null literal
    #[default]
    Null,
    /// JSON boolean (true/false)
    Bool(bool),
    /// JSON number, kept as its source lexeme
    Number(JsonNumber),
    /// JSON string (always well-formed UTF-8)
    String(String),
    /// JSON array of values
    Array(Vec<JsonValue>),
    /// JSON object, insertion ordered, first key wins
    Object(JsonObject),
}

impl JsonValue {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(JsonNumber::from(value))
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(values: Vec<JsonValue>) -> Self {
        JsonValue::Array(values)
    }
}

impl From<JsonObject> for JsonValue {
    fn from(object: JsonObject) -> Self {
        JsonValue::Object(object)
    }
}

// =============================================================================
// Number
// =============================================================================

/// A JSON number.
///
/// The validated source lexeme is kept verbatim so integers of any size
/// survive a parse/write cycle and so callers can tell `5` from `5.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonNumber {
    lexeme: String,
    integer_shaped: bool,
}

impl JsonNumber {
    /// Built by the parser from a lexeme it has already validated.
    pub(crate) fn from_lexeme(lexeme: &str, integer_shaped: bool) -> Self {
        JsonNumber {
            lexeme: lexeme.to_string(),
            integer_shaped,
        }
    }

    /// True iff the literal had neither a fractional part nor an exponent.
    ///
    /// `100` is integer-shaped; `100.0` and `1e2` are not, even though they
    /// denote the same value.
    pub fn is_integer_shaped(&self) -> bool {
        self.integer_shaped
    }

    /// The number exactly as written.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// True if the literal starts with a minus sign (including `-0`).
    pub fn is_sign_negative(&self) -> bool {
        self.lexeme.starts_with('-')
    }

    /// Integer value, if the literal is integer-shaped and fits in an i64.
    pub fn as_i64(&self) -> Option<i64> {
        if !self.integer_shaped {
            return None;
        }
        self.lexeme.parse().ok()
    }

    /// Approximate floating-point value.
    pub fn as_f64(&self) -> Option<f64> {
        self.lexeme.parse().ok()
    }
}

impl From<i64> for JsonNumber {
    fn from(value: i64) -> Self {
        JsonNumber {
            lexeme: value.to_string(),
            integer_shaped: true,
        }
    }
}

// =============================================================================
// Object
// =============================================================================

/// A JSON object.
///
/// Keys iterate in insertion order. When a key is inserted twice the first
/// value is kept and the later one is dropped, which is also how the parser
/// treats `{"a":1,"a":2}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    entries: IndexMap<String, JsonValue>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns `true` if the value was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Builder form of [`JsonObject::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
