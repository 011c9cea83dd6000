//! Todo entity types

use serde::{Deserialize, Serialize};

use super::ids::TodoId;

/// A stored todo; always carries its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier, immutable once assigned
    #[serde(rename = "_id")]
    pub id: TodoId,
    /// Non-empty title
    pub title: String,
    /// Free text, empty by default
    #[serde(default)]
    pub description: String,
    /// Due time in ms since the Unix epoch, positive when present
    #[serde(default)]
    pub duetime: Option<i64>,
    /// Completion flag
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
}

/// A validated todo that may not have an identifier yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    /// Present on updates, absent on creation
    pub id: Option<TodoId>,
    /// Non-empty title
    pub title: String,
    /// Free text
    pub description: String,
    /// Due time in ms since the Unix epoch
    pub duetime: Option<i64>,
    /// Completion flag
    pub is_done: bool,
}

impl TodoDraft {
    /// Draft with defaults for everything but the title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            duetime: None,
            is_done: false,
        }
    }

    /// Turn the draft into an entity under the given id
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            duetime: self.duetime,
            is_done: self.is_done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let todo = TodoDraft::titled("Buy milk").into_todo(TodoId::from(7));
        assert_eq!(
            serde_json::to_value(&todo).unwrap(),
            json!({"_id": "7n", "title": "Buy milk", "description": "", "duetime": null, "isDone": false})
        );
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let todo: Todo = serde_json::from_value(json!({"_id": "3n", "title": "x"})).unwrap();
        assert_eq!(todo, TodoDraft::titled("x").into_todo(TodoId::from(3)));
    }
}
