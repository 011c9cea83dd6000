//! Entity normalizer
//!
//! Turns a loosely typed request body (already passed through the codec, so
//! tagged ids are integers) into a [`TodoDraft`] with every default filled
//! in. Every problem found is reported at once, one message per field.

use crate::codec::TaggedValue;
use crate::core::error::{Error, Result};
use crate::types::{TodoDraft, TodoId};

/// Validate a request body and fill in defaults
pub fn normalize(body: &TaggedValue) -> Result<TodoDraft> {
    if body.as_object().is_none() {
        return Err(Error::validation(format!(
            "request body must be a JSON object, got {}",
            body.kind()
        )));
    }

    let mut problems = Vec::new();

    let id = match body.get("_id") {
        None | Some(TaggedValue::Null) => None,
        Some(TaggedValue::BigInt { value, .. }) => Some(TodoId::new(value.clone())),
        Some(TaggedValue::Number(n)) => match n.as_u64() {
            Some(n) => Some(TodoId::from(n)),
            None => {
                problems.push(format!("_id must be a non-negative integer, got {}", n));
                None
            }
        },
        Some(other) => {
            problems.push(format!("_id must be an integer, got {}", other.kind()));
            None
        }
    };

    let title = match body.get("title").map(text_field) {
        None | Some(Some(None)) => {
            problems.push("title is required".to_string());
            String::new()
        }
        Some(Some(Some(title))) if title.is_empty() => {
            problems.push("title must not be empty".to_string());
            title
        }
        Some(Some(Some(title))) => title,
        Some(None) => {
            problems.push("title must be a string".to_string());
            String::new()
        }
    };

    let description = match body.get("description").map(text_field) {
        None | Some(Some(None)) => String::new(),
        Some(Some(Some(text))) => text,
        Some(None) => {
            problems.push("description must be a string".to_string());
            String::new()
        }
    };

    let duetime = match body.get("duetime") {
        None | Some(TaggedValue::Null) => None,
        Some(TaggedValue::Number(n)) => match n.as_i64() {
            Some(ms) if ms > 0 => Some(ms),
            _ => {
                problems.push(format!("duetime must be a positive integer, got {}", n));
                None
            }
        },
        Some(TaggedValue::BigInt { value, .. }) => match i64::try_from(value) {
            Ok(ms) if ms > 0 => Some(ms),
            _ => {
                problems.push(format!("duetime out of range: {}", value));
                None
            }
        },
        Some(other) => {
            problems.push(format!("duetime must be an integer or null, got {}", other.kind()));
            None
        }
    };

    let is_done = match body.get("isDone") {
        None => false,
        Some(TaggedValue::Bool(done)) => *done,
        Some(other) => {
            problems.push(format!("isDone must be a boolean, got {}", other.kind()));
            false
        }
    };

    if !problems.is_empty() {
        tracing::warn!("Rejected todo body: {}", problems.join("; "));
        return Err(Error::Validation(problems));
    }

    Ok(TodoDraft {
        id,
        title,
        description,
        duetime,
        is_done,
    })
}

/// `Some(Some(text))` for text, `Some(None)` for null, `None` for anything else.
///
/// A string that looked like `<digits>n` was revived into an integer; its
/// source text is used verbatim.
fn text_field(value: &TaggedValue) -> Option<Option<String>> {
    match value {
        TaggedValue::String(s) => Some(Some(s.clone())),
        TaggedValue::BigInt { raw, .. } => Some(Some(raw.clone())),
        TaggedValue::Null => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::revive;
    use serde_json::json;

    fn normalize_json(body: serde_json::Value) -> Result<TodoDraft> {
        normalize(&revive(body))
    }

    #[test]
    fn test_defaults() {
        let draft = normalize_json(json!({"title": "X"})).unwrap();
        assert_eq!(
            draft,
            TodoDraft {
                id: None,
                title: "X".into(),
                description: String::new(),
                duetime: None,
                is_done: false,
            }
        );
    }

    #[test]
    fn test_full_body() {
        let draft = normalize_json(json!({
            "_id": "1671087245763n",
            "title": "Einen Kuchen backen",
            "description": "Schokolade",
            "duetime": 1673654400000i64,
            "isDone": true
        }))
        .unwrap();
        assert_eq!(draft.id, Some(TodoId::from(1671087245763)));
        assert_eq!(draft.description, "Schokolade");
        assert_eq!(draft.duetime, Some(1673654400000));
        assert!(draft.is_done);
    }

    #[test]
    fn test_native_integer_id_is_lifted() {
        let draft = normalize_json(json!({"_id": 42, "title": "X"})).unwrap();
        assert_eq!(draft.id, Some(TodoId::from(42)));
    }

    #[test]
    fn test_zero_id_is_kept() {
        // A falsy-looking id is still an id
        let draft = normalize_json(json!({"_id": 0, "title": "X"})).unwrap();
        assert_eq!(draft.id, Some(TodoId::from(0)));

        let draft = normalize_json(json!({"_id": "0n", "title": "X"})).unwrap();
        assert_eq!(draft.id, Some(TodoId::from(0)));
    }

    #[test]
    fn test_null_id_and_duetime_mean_absent() {
        let draft = normalize_json(json!({"_id": null, "title": "X", "duetime": null})).unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.duetime, None);
    }

    #[test]
    fn test_missing_title_is_an_error() {
        match normalize_json(json!({"description": "no title"})) {
            Err(Error::Validation(problems)) => assert_eq!(problems, vec!["title is required"]),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(normalize_json(json!({"title": ""})).is_err());
        assert!(normalize_json(json!({"title": null})).is_err());
    }

    #[test]
    fn test_every_problem_is_reported() {
        match normalize_json(json!({
            "_id": -3,
            "title": 7,
            "description": false,
            "duetime": 0,
            "isDone": "yes"
        })) {
            Err(Error::Validation(problems)) => assert_eq!(problems.len(), 5, "{:?}", problems),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_or_string_duetime_is_rejected() {
        assert!(normalize_json(json!({"title": "X", "duetime": 1.5})).is_err());
        assert!(normalize_json(json!({"title": "X", "duetime": "2023-01-14"})).is_err());
    }

    #[test]
    fn test_tag_shaped_title_survives() {
        let draft = normalize_json(json!({"title": "42n"})).unwrap();
        assert_eq!(draft.title, "42n");

        let draft = normalize_json(json!({"title": "007n", "description": "0042n"})).unwrap();
        assert_eq!(draft.title, "007n");
        assert_eq!(draft.description, "0042n");
    }

    #[test]
    fn test_non_object_body() {
        assert!(normalize_json(json!(["title"])).is_err());
    }
}
