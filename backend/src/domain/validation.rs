//! Field-by-field validation of untyped request input.
//!
//! Each parser walks every field it knows about and collects all violations
//! before failing, so a client sees the full list in one response. Unknown
//! fields are ignored.

use serde::Serialize;
use serde_json::{Map, Number, Value, json};

use super::user::{EmailAddress, NewUser, Score, UserChanges, UserId, UserName};
use super::{Error, UserValidationError};

/// Field used for violations that concern the whole request body.
pub const BODY_FIELD: &str = "body";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field or parameter, as the client spelled it.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-empty list of violations gathered from one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Record a violation.
    pub fn push(&mut self, field: impl Into<String>, message: impl ToString) {
        self.0.push(FieldViolation::new(field, message.to_string()));
    }

    /// Violations in the order they were found.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep the value on success, record the error under `field` otherwise.
    fn check<T>(&mut self, field: &str, result: Result<T, UserValidationError>) -> Option<T> {
        result.map_err(|err| self.push(field, err)).ok()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::invalid_request("Validation Error").with_details(json!({ "errors": value.0 }))
    }
}

/// Parse a creation body.
///
/// `name` and `email` are required strings, `score` an optional integer.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_api::domain::validation::parse_new_user;
///
/// let errors = parse_new_user(&json!({ "name": 7, "score": 101 })).unwrap_err();
/// let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
/// assert_eq!(fields, ["name", "email", "score"]);
/// ```
pub fn parse_new_user(body: &Value) -> Result<NewUser, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let name = match object.get("name") {
        None => {
            errors.push("name", "Name is required");
            None
        }
        Some(value) => name_field(value, &mut errors),
    };
    let email = match object.get("email") {
        None => {
            errors.push("email", "Email is required");
            None
        }
        Some(value) => email_field(value, &mut errors),
    };
    let score = object
        .get("score")
        .and_then(|value| score_field(value, &mut errors));

    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(NewUser { name, email, score }),
        _ => Err(errors),
    }
}

/// Parse a partial update body.
///
/// Every field is optional but at least one must be present. An explicit
/// `null` is a type violation rather than "not provided".
pub fn parse_user_changes(body: &Value) -> Result<UserChanges, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(object) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let name = object
        .get("name")
        .and_then(|value| name_field(value, &mut errors));
    let email = object
        .get("email")
        .and_then(|value| email_field(value, &mut errors));
    let score = object
        .get("score")
        .and_then(|value| score_field(value, &mut errors));

    if !errors.is_empty() {
        return Err(errors);
    }
    UserChanges::try_new(name, email, score).map_err(|err| {
        errors.push(BODY_FIELD, err);
        errors
    })
}

/// Parse a path identifier.
pub fn parse_user_id(raw: &str) -> Result<UserId, ValidationErrors> {
    UserId::new(raw).map_err(|err| {
        let mut errors = ValidationErrors::default();
        errors.push("id", err);
        errors
    })
}

fn as_object<'a>(
    body: &'a Value,
    errors: &mut ValidationErrors,
) -> Option<&'a Map<String, Value>> {
    let object = body.as_object();
    if object.is_none() {
        errors.push(BODY_FIELD, "Request body must be a JSON object");
    }
    object
}

fn name_field(value: &Value, errors: &mut ValidationErrors) -> Option<UserName> {
    let Some(raw) = value.as_str() else {
        errors.push("name", "Name must be a string");
        return None;
    };
    errors.check("name", UserName::new(raw))
}

fn email_field(value: &Value, errors: &mut ValidationErrors) -> Option<EmailAddress> {
    let Some(raw) = value.as_str() else {
        errors.push("email", "Email must be a string");
        return None;
    };
    errors.check("email", EmailAddress::new(raw))
}

fn score_field(value: &Value, errors: &mut ValidationErrors) -> Option<Score> {
    let Some(raw) = (match value {
        Value::Number(number) => integral(number),
        _ => None,
    }) else {
        errors.push("score", "Score must be an integer");
        return None;
    };
    errors.check("score", Score::new(raw))
}

/// Integral JSON numbers, including float spellings such as `100.0` or `1e2`.
///
/// Magnitudes beyond `i64` saturate so they surface as range errors.
fn integral(number: &Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    if number.is_u64() {
        return Some(i64::MAX);
    }
    let value = number.as_f64().filter(|v| v.is_finite() && v.fract() == 0.0)?;
    let saturated = if value.is_sign_negative() { i64::MIN } else { i64::MAX };
    Some(format!("{value:.0}").parse().unwrap_or(saturated))
}
