use crate::validation::{Schema, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A value that knows how to flatten itself into a JSON mapping of its
/// persisted columns. Used by the response envelope for entities.
pub trait Project {
    fn project(&self) -> Map<String, Value>;
}

/// The single persisted domain entity. Mirrors one row of the `records` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Record {
    /// Surrogate key assigned by the store on insert.
    pub id: i64,
    pub field1: String,
    pub field2: bool,
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at` on insert, refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

impl Project for Record {
    fn project(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::from(self.id));
        map.insert("field1".to_string(), Value::from(self.field1.clone()));
        map.insert("field2".to_string(), Value::from(self.field2));
        map.insert("created_at".to_string(), Value::from(self.created_at.to_rfc3339()));
        map.insert("updated_at".to_string(), Value::from(self.updated_at.to_rfc3339()));
        map
    }
}

/// The unsaved shape of a record: what `create` inserts and `update` copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub field1: String,
    #[serde(default)]
    pub field2: bool,
}

impl NewRecord {
    /// Builds a record with `field2` left at its default of `false`.
    pub fn new(field1: impl Into<String>) -> Self {
        Self {
            field1: field1.into(),
            field2: false,
        }
    }

    pub fn with_field2(mut self, field2: bool) -> Self {
        self.field2 = field2;
        self
    }
}

/// The body accepted by the create route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    pub field1: String,
    pub field2: bool,
}

impl From<RecordRequest> for NewRecord {
    fn from(request: RecordRequest) -> Self {
        Self {
            field1: request.field1,
            field2: request.field2,
        }
    }
}

impl Schema for RecordRequest {
    /// `field1` must be a non-empty string and `field2` a boolean. Unknown keys
    /// are ignored. Every problem is reported, not only the first.
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Some(object) = value.as_object() else {
            errors.push(
                Vec::new(),
                "Input should be a valid dictionary or object to extract fields from",
            );
            return Err(errors);
        };

        let field1 = match object.get("field1") {
            None => {
                errors.push(vec!["field1".into()], "Field required");
                None
            }
            Some(Value::String(s)) if s.is_empty() => {
                errors.push(vec!["field1".into()], "String should have at least 1 character");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                errors.push(vec!["field1".into()], "Input should be a valid string");
                None
            }
        };

        let field2 = match object.get("field2") {
            None => {
                errors.push(vec!["field2".into()], "Field required");
                None
            }
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                errors.push(vec!["field2".into()], "Input should be a valid boolean");
                None
            }
        };

        match (field1, field2) {
            (Some(field1), Some(field2)) if errors.is_empty() => Ok(Self { field1, field2 }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn projection_has_exactly_the_record_columns() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        let record = Record {
            id: 7,
            field1: "Test 1".to_string(),
            field2: true,
            created_at: at,
            updated_at: at,
        };

        let projected = Value::Object(record.project());
        assert_eq!(
            projected,
            json!({
                "id": 7,
                "field1": "Test 1",
                "field2": true,
                "created_at": "2024-05-01T06:00:00+00:00",
                "updated_at": "2024-05-01T06:00:00+00:00",
            })
        );
    }

    #[test]
    fn new_record_defaults_field2_to_false() {
        let record = NewRecord::new("Test Job");
        assert!(!record.field2);
        assert!(record.with_field2(true).field2);
    }

    #[test]
    fn request_accepts_extra_fields() {
        let body = json!({"field1": "a", "field2": false, "extra": [1, 2]});
        let request = RecordRequest::from_json(&body).unwrap();
        assert_eq!(request, RecordRequest { field1: "a".into(), field2: false });
    }

    #[test]
    fn request_reports_every_invalid_field() {
        let body = json!({"field2": "yes"});
        let errors = RecordRequest::from_json(&body).unwrap_err();
        let collected: Vec<_> = errors
            .iter()
            .map(|e| (e.loc.join("."), e.msg.as_str()))
            .collect();
        assert_eq!(
            collected,
            vec![
                ("field1".to_string(), "Field required"),
                ("field2".to_string(), "Input should be a valid boolean"),
            ]
        );
    }

    #[test]
    fn request_rejects_empty_field1() {
        let body = json!({"field1": "", "field2": true});
        let errors = RecordRequest::from_json(&body).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().loc, vec!["field1".to_string()]);
    }

    #[test]
    fn request_rejects_non_object_bodies() {
        let errors = RecordRequest::from_json(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().next().unwrap().loc.is_empty());
    }
}
