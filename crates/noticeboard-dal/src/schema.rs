//! Accepted input shapes for announcement create and update requests.
//!
//! Unknown fields are rejected. Length limits match column sizes in the
//! `announcement` table and are counted in characters.

use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_OWNER_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 120;
pub const MAX_DESCRIPTION_LENGTH: usize = 250;

/// Declared order of input fields, problems are reported in this order.
pub trait FieldOrder {
    const FIELDS: &'static [&'static str];
}

const ANNOUNCEMENT_FIELDS: &[&str] = &["owner", "title", "description"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAnnouncement {
    #[garde(length(chars, min = 1, max = 100))]
    pub owner: String,
    #[garde(length(chars, min = 1, max = 120))]
    pub title: String,
    #[garde(length(chars, min = 1, max = 250))]
    pub description: String,
}

impl FieldOrder for CreateAnnouncement {
    const FIELDS: &'static [&'static str] = ANNOUNCEMENT_FIELDS;
}

/// Partial update: `None` means the field was not sent and stays untouched.
///
/// An explicit `null` is not accepted as absence, it fails as a type error.
/// Empty strings are valid values.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateAnnouncement {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[garde(length(chars, max = 100))]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[garde(length(chars, max = 120))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[garde(length(chars, max = 250))]
    pub description: Option<String>,
}

impl FieldOrder for UpdateAnnouncement {
    const FIELDS: &'static [&'static str] = ANNOUNCEMENT_FIELDS;
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_distinguishes_absent_and_empty() {
        let absent: UpdateAnnouncement = serde_json::from_value(json!({"title": "New"})).unwrap();
        assert_eq!(absent.title.as_deref(), Some("New"));
        assert!(absent.owner.is_none());
        assert!(absent.description.is_none());
        assert!(absent.validate().is_ok());

        let empty: UpdateAnnouncement = serde_json::from_value(json!({"owner": ""})).unwrap();
        assert_eq!(empty.owner.as_deref(), Some(""));
        assert!(empty.validate().is_ok());

        let too_long = UpdateAnnouncement {
            owner: Some("o".repeat(MAX_OWNER_LENGTH + 1)),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_update_rejects_null() {
        let res = serde_json::from_value::<UpdateAnnouncement>(json!({"owner": null}));
        assert!(res.is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let res = serde_json::from_value::<CreateAnnouncement>(
            json!({"owner": "o", "title": "t", "description": "d", "id": 7}),
        );
        let err = res.unwrap_err().to_string();
        assert!(err.starts_with("unknown field `id`"), "{err}");

        let res = serde_json::from_value::<UpdateAnnouncement>(json!({"color": "red"}));
        assert!(res.is_err());
    }

    #[test]
    fn test_create_lengths() {
        let ok = CreateAnnouncement {
            owner: "a".repeat(MAX_OWNER_LENGTH),
            title: "ž".repeat(MAX_TITLE_LENGTH),
            description: "d".repeat(MAX_DESCRIPTION_LENGTH),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateAnnouncement {
            title: "t".repeat(MAX_TITLE_LENGTH + 1),
            ..ok
        };
        let report = too_long.validate().unwrap_err();
        let (path, _) = report.iter().next().unwrap();
        assert_eq!(path.to_string(), "title");
    }
}
