use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::{Map, Value};

use crate::schema::change_descriptions;

/// A change description row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = change_descriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeDescription {
    pub id: i64,
    pub review_request_id: i64,
    pub text: String,
    /// Set when the owning draft was published.
    pub public: bool,
    pub timestamp: Timestamp,
    /// JSON object of per-field change records.
    pub fields_changed: Value,
}

impl From<ChangeDescription> for draftboard_core::types::ChangeDescription {
    fn from(row: ChangeDescription) -> Self {
        let fields_changed = match row.fields_changed {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Self {
            id: Some(row.id),
            text: row.text,
            public: row.public,
            timestamp: row.timestamp.into(),
            fields_changed,
        }
    }
}

/// Data for creating a new change description.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = change_descriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChangeDescription {
    pub review_request_id: i64,
    pub text: String,
    pub public: bool,
    pub timestamp: Timestamp,
    pub fields_changed: Value,
}

impl NewChangeDescription {
    /// Prepares `changedesc` for insertion under `review_request_id`.
    pub fn new(review_request_id: i64, changedesc: &draftboard_core::types::ChangeDescription) -> Self {
        Self {
            review_request_id,
            text: changedesc.text.clone(),
            public: changedesc.public,
            timestamp: changedesc.timestamp.into(),
            fields_changed: Value::Object(changedesc.fields_changed.clone()),
        }
    }
}

/// Data for updating an existing change description.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = change_descriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateChangeDescription {
    pub text: String,
    pub public: bool,
    pub timestamp: Timestamp,
    pub fields_changed: Value,
}

impl From<&draftboard_core::types::ChangeDescription> for UpdateChangeDescription {
    fn from(changedesc: &draftboard_core::types::ChangeDescription) -> Self {
        Self {
            text: changedesc.text.clone(),
            public: changedesc.public,
            timestamp: changedesc.timestamp.into(),
            fields_changed: Value::Object(changedesc.fields_changed.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn non_object_fields_changed_reads_as_empty() {
        let row = ChangeDescription {
            id: 3,
            review_request_id: 1,
            text: "Rebased".into(),
            public: true,
            timestamp: jiff::Timestamp::UNIX_EPOCH.into(),
            fields_changed: json!(null),
        };

        let changedesc = draftboard_core::types::ChangeDescription::from(row);
        assert_eq!(changedesc.id, Some(3));
        assert!(changedesc.fields_changed.is_empty());
    }
}
