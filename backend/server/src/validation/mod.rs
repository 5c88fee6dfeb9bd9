//! # Validation
//!
//! Request payloads arrive as untyped JSON and are checked field by field
//! before anything is deserialized into a typed input. Every rule runs and
//! every failure is reported, so a client can fix a whole form in one round
//! trip.
//!
//! ## Ordering
//!
//! Fields are visited in a fixed order per entity. The same payload always
//! yields the same error list.
//!
//! ## Create vs update
//!
//! [`Mode::Create`] requires every field. [`Mode::Update`] lets any field be
//! left out (or `null`), but a field that is present goes through exactly the
//! same rule.
//!
//! ## Paths
//!
//! Nested fields are named the way a client would index them:
//! `colors[1].sizes[3].quantity`.
use catalog::Vocabulary;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::Error as _};
use serde_json::{Map, Value};

use crate::error::{AppError, ValidationError};

pub mod admin;
pub mod product;
pub mod query;
pub mod section;

pub const REQUIRED: &str = "required";
pub const INVALID_TYPE: &str = "invalid_type";
pub const TOO_LONG: &str = "too_long";
pub const TOO_SHORT: &str = "too_short";
pub const OUT_OF_RANGE: &str = "out_of_range";
pub const INVALID_ENUM: &str = "invalid_enum";
pub const INVALID_DATE: &str = "invalid_date";
pub const INVALID_EMAIL: &str = "invalid_email";
pub const DUPLICATE: &str = "duplicate";
pub const MISSING_SIZE: &str = "missing_size";
pub const EMPTY: &str = "empty";
pub const SAME_PASSWORD: &str = "same_password";
pub const INCORRECT_PASSWORD: &str = "incorrect_password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|at| at.date_naive()))
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date {raw}")))
}

pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date {raw}"))),
        None => Ok(None),
    }
}

/// Turns a checked payload into its typed input, or the collected errors into a 400.
pub fn validated<T: DeserializeOwned>(
    payload: Value,
    errors: Vec<ValidationError>,
) -> Result<T, AppError> {
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    serde_json::from_value(payload)
        .map_err(|e| AppError::invalid("body", INVALID_TYPE, format!("Invalid payload: {e}")))
}

/// Collects errors for the top-level fields of one payload.
pub struct Validator<'a> {
    fields: Option<&'a Map<String, Value>>,
    mode: Mode,
    errors: Vec<ValidationError>,
}

impl<'a> Validator<'a> {
    pub fn new(payload: &'a Value, mode: Mode) -> Self {
        let mut errors = Vec::new();
        let fields = payload.as_object();

        if fields.is_none() {
            errors.push(ValidationError::new(
                "body",
                INVALID_TYPE,
                "Request body must be a JSON object",
            ));
        }

        Self {
            fields,
            mode,
            errors,
        }
    }

    pub fn is_object(&self) -> bool {
        self.fields.is_some()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn finish(self) -> Vec<ValidationError> {
        self.errors
    }

    /// The field's value, treating `null` as absent.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields?.get(name).filter(|value| !value.is_null())
    }

    pub fn present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn value(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.get(name);

        if value.is_none() && self.mode == Mode::Create && self.fields.is_some() {
            self.errors.push(ValidationError::new(
                name,
                REQUIRED,
                format!("{name} is required"),
            ));
        }

        value
    }

    pub fn string(&mut self, name: &str, max_len: usize) -> Option<&'a str> {
        let value = self.value(name)?;
        check_string(&mut self.errors, name, value, max_len)
    }

    pub fn boolean(&mut self, name: &str) -> Option<bool> {
        let value = self.value(name)?;
        check_bool(&mut self.errors, name, value)
    }

    pub fn number(&mut self, name: &str, min: f64, max: f64, inclusive_min: bool) -> Option<f64> {
        let value = self.value(name)?;
        check_number(&mut self.errors, name, value, min, max, inclusive_min)
    }

    pub fn date(&mut self, name: &str) -> Option<NaiveDate> {
        let value = self.value(name)?;
        check_date(&mut self.errors, name, value)
    }

    pub fn enumeration<T: Vocabulary>(&mut self, name: &str) -> Option<T> {
        let value = self.value(name)?;
        check_enum(&mut self.errors, name, value)
    }

    pub fn array(&mut self, name: &str) -> Option<&'a Vec<Value>> {
        let value = self.value(name)?;
        check_array(&mut self.errors, name, value)
    }

    pub fn errors_mut(&mut self) -> &mut Vec<ValidationError> {
        &mut self.errors
    }
}

pub fn check_string<'v>(
    errors: &mut Vec<ValidationError>,
    path: &str,
    value: &'v Value,
    max_len: usize,
) -> Option<&'v str> {
    let Some(text) = value.as_str() else {
        errors.push(ValidationError::new(
            path,
            INVALID_TYPE,
            format!("{path} must be a string"),
        ));
        return None;
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::new(
            path,
            REQUIRED,
            format!("{path} cannot be empty"),
        ));
        return None;
    }
    if trimmed.chars().count() > max_len {
        errors.push(ValidationError::new(
            path,
            TOO_LONG,
            format!("{path} must be at most {max_len} characters"),
        ));
        return None;
    }

    Some(trimmed)
}

pub fn check_bool(errors: &mut Vec<ValidationError>, path: &str, value: &Value) -> Option<bool> {
    let flag = value.as_bool();

    if flag.is_none() {
        errors.push(ValidationError::new(
            path,
            INVALID_TYPE,
            format!("{path} must be true or false"),
        ));
    }

    flag
}

pub fn check_number(
    errors: &mut Vec<ValidationError>,
    path: &str,
    value: &Value,
    min: f64,
    max: f64,
    inclusive_min: bool,
) -> Option<f64> {
    let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
        errors.push(ValidationError::new(
            path,
            INVALID_TYPE,
            format!("{path} must be a number"),
        ));
        return None;
    };

    let above_min = if inclusive_min {
        number >= min
    } else {
        number > min
    };

    if !above_min || number > max {
        let lower = if inclusive_min {
            format!("at least {min}")
        } else {
            format!("greater than {min}")
        };
        let message = if max.is_finite() {
            format!("{path} must be {lower} and at most {max}")
        } else {
            format!("{path} must be {lower}")
        };
        errors.push(ValidationError::new(path, OUT_OF_RANGE, message));
        return None;
    }

    Some(number)
}

pub fn check_quantity(errors: &mut Vec<ValidationError>, path: &str, value: &Value) -> Option<u32> {
    if let Some(quantity) = value.as_u64() {
        if let Ok(quantity) = u32::try_from(quantity) {
            return Some(quantity);
        }
    }

    let error = match value.as_f64() {
        Some(n) if n < 0.0 => ValidationError::new(
            path,
            OUT_OF_RANGE,
            format!("{path} cannot be negative"),
        ),
        // Only JSON integers count; `3.0` would not deserialize into the count.
        Some(_) if value.as_u64().is_some() => ValidationError::new(
            path,
            OUT_OF_RANGE,
            format!("{path} is too large"),
        ),
        _ => ValidationError::new(
            path,
            INVALID_TYPE,
            format!("{path} must be a whole number"),
        ),
    };
    errors.push(error);

    None
}

pub fn check_date(
    errors: &mut Vec<ValidationError>,
    path: &str,
    value: &Value,
) -> Option<NaiveDate> {
    let date = value.as_str().and_then(parse_date);

    if date.is_none() {
        errors.push(ValidationError::new(
            path,
            INVALID_DATE,
            format!("{path} must be a valid date (YYYY-MM-DD)"),
        ));
    }

    date
}

pub fn check_enum<T: Vocabulary>(
    errors: &mut Vec<ValidationError>,
    path: &str,
    value: &Value,
) -> Option<T> {
    // Exact match only: the typed inputs deserialize the same raw string.
    let parsed = value.as_str().and_then(T::parse);

    if parsed.is_none() {
        errors.push(ValidationError::new(
            path,
            INVALID_ENUM,
            format!("{path} must be one of: {}", T::names().join(", ")),
        ));
    }

    parsed
}

pub fn check_array<'v>(
    errors: &mut Vec<ValidationError>,
    path: &str,
    value: &'v Value,
) -> Option<&'v Vec<Value>> {
    let items = value.as_array();

    if items.is_none() {
        errors.push(ValidationError::new(
            path,
            INVALID_TYPE,
            format!("{path} must be an array"),
        ));
    }

    items
}

#[cfg(test)]
mod tests {
    use catalog::products::Availability;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2026-03-01"), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(
            parse_date("2026-03-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_required_only_on_create() {
        let payload = json!({ "name": null });

        let mut create = Validator::new(&payload, Mode::Create);
        assert!(create.string("name", 10).is_none());
        assert_eq!(create.finish()[0].code, REQUIRED);

        let mut update = Validator::new(&payload, Mode::Update);
        assert!(update.string("name", 10).is_none());
        assert!(update.finish().is_empty());
    }

    #[test]
    fn test_non_object_body() {
        let payload = json!([1, 2, 3]);
        let mut validator = Validator::new(&payload, Mode::Create);
        validator.string("name", 10);
        let errors = validator.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }

    #[test]
    fn test_number_bounds() {
        let mut errors = Vec::new();
        assert_eq!(
            check_number(&mut errors, "price", &json!(0), 0.0, f64::INFINITY, false),
            None
        );
        assert_eq!(
            check_number(&mut errors, "wool", &json!(100), 0.0, 100.0, true),
            Some(100.0)
        );
        assert_eq!(
            check_number(&mut errors, "wool", &json!("50"), 0.0, 100.0, true),
            None
        );
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![OUT_OF_RANGE, INVALID_TYPE]);
    }

    #[test]
    fn test_quantity() {
        let mut errors = Vec::new();
        assert_eq!(check_quantity(&mut errors, "q", &json!(0)), Some(0));
        assert_eq!(check_quantity(&mut errors, "q", &json!(-1)), None);
        assert_eq!(check_quantity(&mut errors, "q", &json!(1.5)), None);
        assert_eq!(check_quantity(&mut errors, "q", &json!(3.0)), None);
        assert_eq!(
            check_quantity(&mut errors, "q", &json!(u64::from(u32::MAX) + 1)),
            None
        );
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![OUT_OF_RANGE, INVALID_TYPE, INVALID_TYPE, OUT_OF_RANGE]
        );
        assert_eq!(errors[2].message, "q must be a whole number");
        assert_eq!(errors[3].message, "q is too large");
    }

    #[test]
    fn test_enum_values_match_exactly() {
        let mut errors = Vec::new();
        assert_eq!(
            check_enum::<Availability>(&mut errors, "availability", &json!("in_stock")),
            Some(Availability::InStock)
        );
        assert_eq!(
            check_enum::<Availability>(&mut errors, "availability", &json!(" in_stock ")),
            None
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, INVALID_ENUM);

        // Whatever passes the check must also deserialize.
        let payload = json!({ "availability": "in_stock" });
        let accepted = Validator::new(&payload, Mode::Create)
            .enumeration::<Availability>("availability");
        assert_eq!(accepted, Some(Availability::InStock));
        assert!(serde_json::from_value::<Availability>(payload["availability"].clone()).is_ok());
    }

    #[test]
    fn test_string_trimming() {
        let mut errors = Vec::new();
        assert_eq!(
            check_string(&mut errors, "name", &json!("  Ada  "), 10),
            Some("Ada")
        );
        assert_eq!(check_string(&mut errors, "name", &json!("   "), 10), None);
        assert_eq!(
            check_string(&mut errors, "name", &json!("abcdefghijk"), 10),
            None
        );
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![REQUIRED, TOO_LONG]);
    }
}
