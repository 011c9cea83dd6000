//! Application identifiers.
//!
//! A [`TodoId`] is a non-negative integer of arbitrary precision. On the wire
//! it is always the tagged string form produced by the numeric codec, so it
//! survives JSON clients whose numbers are doubles.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::core::error::CodecError;

/// Identifier of a todo entity
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoId(BigUint);

impl TodoId {
    /// Wrap an arbitrary-precision value
    pub fn new(value: BigUint) -> Self {
        TodoId(value)
    }

    /// Borrow the underlying integer
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Tagged wire form, e.g. `"42n"`
    pub fn to_wire(&self) -> String {
        codec::encode(&self.0)
    }
}

impl From<u64> for TodoId {
    fn from(value: u64) -> Self {
        TodoId(BigUint::from(value))
    }
}

impl From<BigUint> for TodoId {
    fn from(value: BigUint) -> Self {
        TodoId(value)
    }
}

/// Plain decimal digits, for logs and messages
impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the tagged wire form only
impl FromStr for TodoId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::decode_int(s).map(TodoId)
    }
}

impl Serialize for TodoId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TodoId::from_str(&s).map_err(serde::de::Error::custom)
    }
}
