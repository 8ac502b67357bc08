//! Kindred test utilities.
//!
//! Builders for board-row fixtures shaped like the `row_to_json` output of
//! the board page query, plus JSON assertion helpers.

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Create a group board row with default values.
pub fn group_row(name: &str) -> BoardRow {
    BoardRow::new(json!({
        "id": Uuid::now_v7(),
        "name": name,
        "description": "A test group",
        "frequency": "weekly",
        "meeting_time": null,
        "location": null,
        "is_online": false,
        "is_private": false,
        "capacity": null,
        "member_count": 0,
    }))
}

/// Create a share board row with default values.
pub fn share_row(title: &str) -> BoardRow {
    BoardRow::new(json!({
        "id": Uuid::now_v7(),
        "title": title,
        "description": "A test item",
        "location": null,
        "share_type": "BORROW",
        "duration": "2 weeks",
        "image_key": null,
        "claimed": false,
    }))
}

/// Create a need board row with default values.
pub fn need_row(description: &str) -> BoardRow {
    BoardRow::new(json!({
        "id": Uuid::now_v7(),
        "description": description,
        "response": null,
        "fulfilled": false,
    }))
}

/// Create a prayer board row with default values.
pub fn prayer_row(description: &str) -> BoardRow {
    BoardRow::new(json!({
        "id": Uuid::now_v7(),
        "description": description,
        "answered": false,
    }))
}

/// A board row builder producing `row_to_json`-shaped values.
#[derive(Debug, Clone)]
pub struct BoardRow {
    fields: JsonValue,
}

impl BoardRow {
    fn new(fields: JsonValue) -> Self {
        Self { fields }
            .with_field("created", json!(1_700_000_000))
            .with_field("category", json!("General"))
            .with_field("author_id", json!(Uuid::now_v7()))
            .with_field("author_name", json!("Test User"))
            .with_field("author_username", json!("testuser"))
            .with_field("author_avatar", JsonValue::Null)
    }

    /// Set a custom ID.
    pub fn with_id(self, id: Uuid) -> Self {
        self.with_field("id", json!(id))
    }

    /// Set the author fields.
    pub fn with_author(self, id: Uuid, name: &str, username: &str) -> Self {
        self.with_field("author_id", json!(id))
            .with_field("author_name", json!(name))
            .with_field("author_username", json!(username))
    }

    /// Set the category name.
    pub fn with_category(self, name: &str) -> Self {
        self.with_field("category", json!(name))
    }

    /// Set the creation timestamp.
    pub fn created_at(self, created: i64) -> Self {
        self.with_field("created", json!(created))
    }

    /// Set or override any field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Finish building the row.
    pub fn build(self) -> JsonValue {
        self.fields
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{}', got: {}",
            key,
            value
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_row_builder() {
        let row = group_row("Hikers")
            .with_category("Outdoors")
            .with_field("capacity", json!(10))
            .build();

        assert_eq!(row["name"], "Hikers");
        assert_eq!(row["category"], "Outdoors");
        assert_eq!(row["capacity"], 10);
        assert::has_key(&row, "author_username");
    }

    #[test]
    fn share_row_defaults_to_borrow() {
        let row = share_row("Ladder").build();
        assert_eq!(row["share_type"], "BORROW");
        assert_eq!(row["claimed"], false);
    }

    #[test]
    fn rows_carry_author_and_created() {
        let author = Uuid::now_v7();
        let row = need_row("yard help")
            .with_author(author, "Dana", "dana")
            .created_at(42)
            .build();

        assert_eq!(row["author_id"], json!(author));
        assert_eq!(row["author_name"], "Dana");
        assert_eq!(row["created"], 42);
    }
}
