use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// One angle measurement as persisted.
///
/// `fields` holds whatever the client submitted, in submission order; the
/// owner and timestamp are always server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub owner_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Keys the server owns; client values for these are dropped.
pub const SERVER_FIELDS: [&str; 2] = ["ownerEmail", "timestamp"];

impl MeasurementRecord {
    pub fn stamped(fields: Map<String, Value>, owner_email: &str, now: OffsetDateTime) -> Self {
        // Rebuild rather than `remove`, which swaps the last key into the hole.
        let fields = fields
            .into_iter()
            .filter(|(key, _)| !SERVER_FIELDS.contains(&key.as_str()))
            .collect();
        Self {
            fields,
            owner_email: owner_email.to_string(),
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn stamping_overrides_forged_fields() {
        let Value::Object(fields) = json!({
            "angle": 42.5,
            "ownerEmail": "mallory@x.com",
            "timestamp": "1999-01-01T00:00:00Z",
            "side": "left"
        }) else {
            unreachable!()
        };
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let rec = MeasurementRecord::stamped(fields, "alice@x.com", now);

        assert_eq!(rec.owner_email, "alice@x.com");
        assert_eq!(rec.timestamp, now);
        assert!(!rec.fields.contains_key("ownerEmail"));
        assert!(!rec.fields.contains_key("timestamp"));
    }

    #[test]
    fn stripping_forged_fields_keeps_client_order() {
        let Value::Object(fields) = json!({
            "angle": 1,
            "ownerEmail": "mallory@x.com",
            "side": "left",
            "timestamp": "1999-01-01T00:00:00Z",
            "note": "n"
        }) else {
            unreachable!()
        };
        let rec =
            MeasurementRecord::stamped(fields, "alice@x.com", datetime!(2024-05-01 12:00:00 UTC));

        let keys: Vec<&str> = rec.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["angle", "side", "note"]);
    }

    #[test]
    fn serialized_form_keeps_field_order() {
        let Value::Object(fields) = json!({ "zeta": 1, "alpha": 2, "mid": 3 }) else {
            unreachable!()
        };
        let rec =
            MeasurementRecord::stamped(fields, "alice@x.com", datetime!(2024-05-01 12:00:00 UTC));

        let text = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            text,
            r#"{"zeta":1,"alpha":2,"mid":3,"ownerEmail":"alice@x.com","timestamp":"2024-05-01T12:00:00Z"}"#
        );

        let back: MeasurementRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rec);
    }
}
