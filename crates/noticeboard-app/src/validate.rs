//! JSON body extraction with validation.
//!
//! The body is parsed, deserialized into the target type and checked with
//! [`garde`]. Only the first problem is reported, as [`FieldError`]; problems
//! are ordered by the field declaration order of the target type
//! ([`FieldOrder`]), unknown fields come last.

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use garde::{Report, Validate};
use serde::de::DeserializeOwned;
use noticeboard_dal::schema::FieldOrder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Body is not valid JSON
    JsonInvalid,
    /// Body is valid JSON, but not an object
    ModelType,
    Missing,
    ExtraForbidden,
    TypeError,
    /// Value has the right type but breaks a constraint (length)
    ValueError,
}

/// Description of the single field, which failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub loc: Vec<String>,
    pub msg: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.loc.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.loc.join("."), self.msg)
        }
    }
}

impl FieldError {
    fn new(kind: ErrorKind, loc: Vec<String>, msg: impl Into<String>) -> Self {
        FieldError {
            kind,
            loc,
            msg: msg.into(),
        }
    }

    /// Errors of the garde report, in the order of report, which is not
    /// the declaration order
    pub fn from_report(report: &Report) -> Vec<Self> {
        report
            .iter()
            .map(|(path, error)| {
                FieldError::new(
                    ErrorKind::ValueError,
                    split_path(&path.to_string()),
                    error.to_string(),
                )
            })
            .collect()
    }

    /// Position of the error's field in `fields`, unknown fields rank last
    fn rank(&self, fields: &[&str]) -> usize {
        self.loc
            .first()
            .and_then(|name| fields.iter().position(|field| *field == name.as_str()))
            .unwrap_or(fields.len())
    }

    pub fn from_deserialization(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let mut loc = split_path(&error.path().to_string());
        let inner = error.into_inner();
        let msg = inner.to_string();

        if let Some(field) = quoted_name(&msg, "missing field ") {
            push_field(&mut loc, field);
            FieldError::new(ErrorKind::Missing, loc, "Field required")
        } else if let Some(field) = quoted_name(&msg, "unknown field ") {
            push_field(&mut loc, field);
            FieldError::new(ErrorKind::ExtraForbidden, loc, "Extra inputs are not permitted")
        } else {
            FieldError::new(ErrorKind::TypeError, loc, msg)
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    if path == "." || path.is_empty() {
        Vec::new()
    } else {
        path.split('.').map(str::to_string).collect()
    }
}

fn push_field(loc: &mut Vec<String>, field: &str) {
    if loc.last().map(String::as_str) != Some(field) {
        loc.push(field.to_string());
    }
}

/// Extracts `name` from serde messages like "missing field `name`"
fn quoted_name<'a>(msg: &'a str, prefix: &str) -> Option<&'a str> {
    msg.strip_prefix(prefix)?
        .strip_prefix('`')?
        .split('`')
        .next()
}

/// Deserializes `fields` into `T`, collecting one error per offending key.
///
/// serde stops at the first problem and visits keys in map order, so a key,
/// which failed, is dropped and deserialization is repeated. A required field
/// reported missing only because it was dropped ends the loop: fields missing
/// after it rank behind its own error anyway.
fn deserialize_fields<T>(mut fields: Map<String, Value>) -> (Option<T>, Vec<FieldError>)
where
    T: DeserializeOwned,
{
    let mut errors = Vec::new();
    let mut dropped: Vec<String> = Vec::new();
    loop {
        match serde_path_to_error::deserialize::<_, T>(Value::Object(fields.clone())) {
            Ok(payload) => return (Some(payload), errors),
            Err(e) => {
                let error = FieldError::from_deserialization(e);
                let field = error.loc.first().cloned().unwrap_or_default();
                if error.kind == ErrorKind::Missing {
                    if !dropped.contains(&field) {
                        errors.push(error);
                    }
                    return (None, errors);
                }
                errors.push(error);
                if fields.remove(&field).is_none() {
                    return (None, errors);
                }
                dropped.push(field);
            }
        }
    }
}

/// Validates `T` against the request body.
pub fn validate_json<T>(value: Value) -> Result<T, FieldError>
where
    T: DeserializeOwned + Validate<Context = ()> + FieldOrder,
{
    let Value::Object(fields) = value else {
        return Err(FieldError::new(
            ErrorKind::ModelType,
            Vec::new(),
            "Input should be a valid dictionary or object",
        ));
    };
    let (payload, mut errors) = deserialize_fields::<T>(fields);
    if let Some(Err(report)) = payload.as_ref().map(|payload| payload.validate()) {
        errors.extend(FieldError::from_report(&report));
    }
    match errors.into_iter().min_by_key(|error| error.rank(T::FIELDS)) {
        Some(error) => Err(error),
        None => payload.ok_or_else(|| {
            FieldError::new(ErrorKind::ModelType, Vec::new(), "Invalid input")
        }),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<T> Deref for ValidJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        match value {
            JsonRejection::MissingJsonContentType(e) => ApiError::UnsupportedMediaType(e.body_text()),
            other => ApiError::InvalidRequest(FieldError::new(
                ErrorKind::JsonInvalid,
                Vec::new(),
                other.body_text(),
            )),
        }
    }
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate<Context = ()> + FieldOrder,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        let payload = validate_json(value)?;
        Ok(ValidJson(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noticeboard_dal::schema::{CreateAnnouncement, UpdateAnnouncement};
    use serde_json::json;

    #[test]
    fn test_missing_field() {
        let err = validate_json::<CreateAnnouncement>(json!({"owner": "o", "description": "d"}))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Missing);
        assert_eq!(err.loc, vec!["title".to_string()]);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"type": "missing", "loc": ["title"], "msg": "Field required"})
        );
    }

    #[test]
    fn test_wrong_type() {
        let err = validate_json::<CreateAnnouncement>(
            json!({"owner": "o", "title": 42, "description": "d"}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.loc, vec!["title".to_string()]);

        let err = validate_json::<UpdateAnnouncement>(json!({"owner": null})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.loc, vec!["owner".to_string()]);
    }

    #[test]
    fn test_extra_field() {
        let err = validate_json::<UpdateAnnouncement>(json!({"title": "t", "priority": 1}))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExtraForbidden);
        assert_eq!(err.loc, vec!["priority".to_string()]);
    }

    #[test]
    fn test_not_object() {
        let err = validate_json::<CreateAnnouncement>(json!(["o", "t", "d"])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelType);
        assert!(err.loc.is_empty());
    }

    #[test]
    fn test_only_first_error_reported() {
        let err = validate_json::<CreateAnnouncement>(
            json!({"owner": "", "title": "", "description": ""}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        assert_eq!(err.loc, vec!["owner".to_string()]);
    }

    #[test]
    fn test_missing_field_before_extra_field() {
        let err = validate_json::<CreateAnnouncement>(
            json!({"owner": "o", "description": "d", "extra": 1}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Missing);
        assert_eq!(err.loc, vec!["title".to_string()]);

        let err = validate_json::<CreateAnnouncement>(
            json!({"owner": "o", "title": "t", "description": 3, "color": "red"}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.loc, vec!["description".to_string()]);
    }

    #[test]
    fn test_errors_of_different_kinds_follow_field_order() {
        let err = validate_json::<UpdateAnnouncement>(
            json!({"owner": "o".repeat(101), "title": 5}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        assert_eq!(err.loc, vec!["owner".to_string()]);

        let err = validate_json::<UpdateAnnouncement>(
            json!({"description": "d".repeat(251), "title": null}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.loc, vec!["title".to_string()]);

        let err = validate_json::<CreateAnnouncement>(
            json!({"owner": "o", "title": "t".repeat(121), "description": ""}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
        assert_eq!(err.loc, vec!["title".to_string()]);
    }

    #[test]
    fn test_update_accepts_empty_string() {
        let payload = validate_json::<UpdateAnnouncement>(json!({"title": ""})).unwrap();
        assert_eq!(payload.title.as_deref(), Some(""));
        assert!(payload.owner.is_none());
    }

    #[test]
    fn test_valid() {
        let payload = validate_json::<UpdateAnnouncement>(json!({"description": "new"})).unwrap();
        assert_eq!(payload.description.as_deref(), Some("new"));
        assert!(payload.title.is_none());
    }
}
