//! The closed set of collections carrying sensitive text fields.
//!
//! Sensitive fields are a compile-time-checked enumeration rather than bare
//! strings matched against arbitrary records: a typo in a field name fails
//! to compile instead of silently skipping a field at migration time.

use serde::{Deserialize, Serialize};

/// A typed accessor for one field of a record's JSON document.
///
/// Wraps a JSON pointer (e.g. `"/content"`). Instances are declared once as
/// constants in [`fields`] and referenced from [`Collection::sensitive_fields`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(pointer: &'static str) -> Self {
        Self(pointer)
    }

    /// The underlying JSON pointer.
    pub fn pointer(&self) -> &'static str {
        self.0
    }

    /// Reads the field from a record's JSON document.
    pub fn get<'a>(&self, data: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        data.pointer(self.0)
    }

    /// Reads the field as a string, if present and a string.
    pub fn get_str<'a>(&self, data: &'a serde_json::Value) -> Option<&'a str> {
        data.pointer(self.0).and_then(|v| v.as_str())
    }

    /// Replaces the field's value. Returns false if the path does not exist
    /// in the document (nothing is written).
    pub fn set(&self, data: &mut serde_json::Value, value: String) -> bool {
        match data.pointer_mut(self.0) {
            Some(slot) => {
                *slot = serde_json::Value::String(value);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Field accessors for every sensitive text field in the datastore.
pub mod fields {
    use super::FieldPath;

    pub const MESSAGE_CONTENT: FieldPath = FieldPath::new("/content");
    pub const REMINDER_MESSAGE: FieldPath = FieldPath::new("/message");
    pub const NOTE_TITLE: FieldPath = FieldPath::new("/title");
    pub const NOTE_BODY: FieldPath = FieldPath::new("/body");

    pub const USER_ID: FieldPath = FieldPath::new("/user_id");
}

/// Every collection holding sensitive text fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Messages,
    Reminders,
    Notes,
}

impl Collection {
    /// All collections, in migration order.
    pub const ALL: [Collection; 3] = [
        Collection::Messages,
        Collection::Reminders,
        Collection::Notes,
    ];

    /// Stable name used as the key in stored documents and in logs.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Messages => "messages",
            Collection::Reminders => "reminders",
            Collection::Notes => "notes",
        }
    }

    /// Inverse of [`Collection::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// The text fields of this collection that must be encrypted at rest.
    pub fn sensitive_fields(self) -> &'static [FieldPath] {
        match self {
            Collection::Messages => &[fields::MESSAGE_CONTENT],
            Collection::Reminders => &[fields::REMINDER_MESSAGE],
            Collection::Notes => &[fields::NOTE_TITLE, fields::NOTE_BODY],
        }
    }

    /// The field identifying the owning user, for migration logging.
    pub fn user_id_field(self) -> FieldPath {
        fields::USER_ID
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A record as seen by the migration tool: an id plus an arbitrary JSON
/// document whose structure the collection's [`FieldPath`]s describe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub data: serde_json::Value,
}
