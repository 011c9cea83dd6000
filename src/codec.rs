//! Numeric codec for identifiers on the wire
//!
//! JSON numbers cannot carry integers past 2^53 without losing precision, so
//! identifiers travel as strings: the decimal digits followed by a single
//! `n` marker (`"1671056616571n"`). The codec is safe to apply blindly over a
//! whole JSON tree: strings that do not match `^[0-9]+n$` pass through
//! untouched.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::core::error::CodecError;

/// Trailing marker that tags a string as an encoded integer
pub const MARKER: char = 'n';

// ASCII digits only; `\d` would also accept other Unicode digit classes.
static WIRE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+n$").expect("static regex"));

/// Result of decoding a single string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// The string was a tagged integer
    Int(BigUint),
    /// Any other string, returned unchanged
    Text(&'a str),
}

/// Encode an integer as `<digits>n`
pub fn encode(n: &BigUint) -> String {
    let mut out = n.to_str_radix(10);
    out.push(MARKER);
    out
}

/// Decode a string, passing through anything that is not `<digits>n`
pub fn decode(s: &str) -> Decoded<'_> {
    if !is_wire_int(s) {
        return Decoded::Text(s);
    }
    let digits = &s.as_bytes()[..s.len() - 1];
    match BigUint::parse_bytes(digits, 10) {
        Some(n) => Decoded::Int(n),
        None => Decoded::Text(s),
    }
}

/// Decode a string that must be a tagged integer
pub fn decode_int(s: &str) -> Result<BigUint, CodecError> {
    match decode(s) {
        Decoded::Int(n) => Ok(n),
        Decoded::Text(_) => Err(CodecError::Malformed(s.to_string())),
    }
}

/// Whether `s` has the `<digits>n` shape
pub fn is_wire_int(s: &str) -> bool {
    WIRE_INT.is_match(s)
}

/// JSON tree with a dedicated arbitrary-precision integer kind
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// Plain JSON number
    Number(Number),
    /// String that did not decode as an integer
    String(String),
    /// Tagged arbitrary-precision integer, with the text it was decoded from
    BigInt {
        /// Decoded value
        value: BigUint,
        /// Source string, marker included
        raw: String,
    },
    /// JSON array
    Array(Vec<TaggedValue>),
    /// JSON object
    Object(BTreeMap<String, TaggedValue>),
}

impl TaggedValue {
    /// Integer node whose source text is its canonical encoding
    pub fn big_int(value: BigUint) -> Self {
        let raw = encode(&value);
        TaggedValue::BigInt { value, raw }
    }

    /// Object view, if this is an object
    pub fn as_object(&self) -> Option<&BTreeMap<String, TaggedValue>> {
        match self {
            TaggedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Field lookup on objects; `None` for anything else
    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short kind name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TaggedValue::Null => "null",
            TaggedValue::Bool(_) => "boolean",
            TaggedValue::Number(_) => "number",
            TaggedValue::String(_) => "string",
            TaggedValue::BigInt { .. } => "bigint",
            TaggedValue::Array(_) => "array",
            TaggedValue::Object(_) => "object",
        }
    }
}

/// Decode every string in a parsed JSON tree
pub fn revive(value: Value) -> TaggedValue {
    match value {
        Value::Null => TaggedValue::Null,
        Value::Bool(b) => TaggedValue::Bool(b),
        Value::Number(n) => TaggedValue::Number(n),
        Value::String(s) => match decode(&s) {
            Decoded::Int(value) => TaggedValue::BigInt { value, raw: s },
            Decoded::Text(_) => TaggedValue::String(s),
        },
        Value::Array(items) => TaggedValue::Array(items.into_iter().map(revive).collect()),
        Value::Object(map) => {
            TaggedValue::Object(map.into_iter().map(|(k, v)| (k, revive(v))).collect())
        }
    }
}

/// Encode every integer in a tree back into plain JSON
pub fn replace(value: TaggedValue) -> Value {
    match value {
        TaggedValue::Null => Value::Null,
        TaggedValue::Bool(b) => Value::Bool(b),
        TaggedValue::Number(n) => Value::Number(n),
        TaggedValue::String(s) => Value::String(s),
        TaggedValue::BigInt { value, .. } => Value::String(encode(&value)),
        TaggedValue::Array(items) => Value::Array(items.into_iter().map(replace).collect()),
        TaggedValue::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, replace(v))).collect::<Map<_, _>>())
        }
    }
}
