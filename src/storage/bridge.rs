//! Identifier bridge
//!
//! Application ids are arbitrary-precision integers; the document store keys
//! documents by a 96-bit `ObjectId`. An application id maps onto the storage
//! id whose 24-hex-digit canonical form is the id's hex rendering left-padded
//! with zeros, i.e. its big-endian bytes left-padded to 12. Over ids below
//! 2^96 the mapping is a bijection and preserves order.

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use num_bigint::BigUint;

use crate::core::error::{BridgeError, Error, Result, StorageError};
use crate::types::{Todo, TodoId};

/// Hex digits in a storage id
pub const STORAGE_ID_HEX_DIGITS: usize = 24;

const STORAGE_ID_BYTES: usize = STORAGE_ID_HEX_DIGITS / 2;

/// Map an application id onto its storage id
pub fn to_storage_id(id: &TodoId) -> std::result::Result<ObjectId, BridgeError> {
    let value = id.as_biguint();
    let hex_digits = value.bits().div_ceil(4) as usize;
    if hex_digits > STORAGE_ID_HEX_DIGITS {
        return Err(BridgeError::OutOfRange {
            id: id.to_string(),
            hex_digits,
            max: STORAGE_ID_HEX_DIGITS,
        });
    }

    let be = value.to_bytes_be();
    let mut bytes = [0u8; STORAGE_ID_BYTES];
    // Zero encodes as a single 0x00 byte
    bytes[STORAGE_ID_BYTES - be.len()..].copy_from_slice(&be);
    Ok(ObjectId::from_bytes(bytes))
}

/// Map a storage id back onto the application id
pub fn from_storage_id(id: &ObjectId) -> TodoId {
    TodoId::new(BigUint::from_bytes_be(&id.bytes()))
}

/// Build the stored form of a todo
pub fn todo_to_document(todo: &Todo) -> std::result::Result<Document, BridgeError> {
    let id = to_storage_id(&todo.id)?;
    Ok(doc! {
        "_id": id,
        "title": todo.title.as_str(),
        "description": todo.description.as_str(),
        "duetime": todo.duetime,
        "isDone": todo.is_done,
    })
}

/// Rebuild a todo from its stored form
///
/// A document without `_id` cannot come out of a working store; it is
/// reported as [`Error::MissingIdentifier`] and never patched over.
pub fn todo_from_document(document: Document) -> Result<Todo> {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(oid)) => from_storage_id(oid),
        Some(other) => {
            return Err(corrupt(format!("_id has type {:?}", other.element_type())));
        }
        None => {
            tracing::error!(?document, "stored todo has no _id");
            return Err(Error::MissingIdentifier(format!("{:?}", document)));
        }
    };

    let title = match document.get("title") {
        Some(Bson::String(title)) => title.clone(),
        _ => return Err(corrupt(format!("todo {} has no string title", id))),
    };

    let description = match document.get("description") {
        Some(Bson::String(text)) => text.clone(),
        None | Some(Bson::Null) => String::new(),
        Some(_) => return Err(corrupt(format!("todo {} has a non-string description", id))),
    };

    let duetime = match document.get("duetime") {
        Some(Bson::Int64(ms)) => Some(*ms),
        Some(Bson::Int32(ms)) => Some(i64::from(*ms)),
        None | Some(Bson::Null) => None,
        Some(_) => return Err(corrupt(format!("todo {} has a non-integer duetime", id))),
    };

    let is_done = match document.get("isDone") {
        Some(Bson::Boolean(done)) => *done,
        None => false,
        Some(_) => return Err(corrupt(format!("todo {} has a non-boolean isDone", id))),
    };

    Ok(Todo {
        id,
        title,
        description,
        duetime,
        is_done,
    })
}

fn corrupt(msg: String) -> Error {
    tracing::error!("{}", msg);
    Error::Storage(StorageError::Corruption(msg))
}
