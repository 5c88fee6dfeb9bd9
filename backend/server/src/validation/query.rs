//! Query string filters for the listing endpoints.
//!
//! Unknown parameters are ignored. Empty values count as absent.
use std::collections::HashMap;

use catalog::{
    Vocabulary,
    admins::{AdminStatus, Role},
    notifications::NotificationKind,
    products::ColorName,
    traffic::Month,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use super::{INVALID_DATE, INVALID_ENUM, INVALID_TYPE, OUT_OF_RANGE};
use crate::{
    error::{AppError, ValidationError},
    store::{AdminQuery, NotificationQuery, Pagination, ProductQuery},
};

pub const MAX_LIMIT: u64 = 100;
/// Highest page whose offset still fits the driver's signed skip.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

type Params = HashMap<String, String>;

fn param<'p>(params: &'p Params, name: &str) -> Option<&'p str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn finish<T>(query: T, errors: Vec<ValidationError>) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(query)
    } else {
        Err(AppError::Validation(errors))
    }
}

fn search(params: &Params) -> Option<String> {
    param(params, "search").map(str::to_string)
}

fn positive(
    params: &Params,
    name: &str,
    default: u64,
    max: u64,
    errors: &mut Vec<ValidationError>,
) -> u64 {
    let Some(raw) = param(params, name) else {
        return default;
    };

    match raw.parse::<u64>() {
        Ok(value) if (1..=max).contains(&value) => value,
        Ok(_) => {
            errors.push(ValidationError::new(
                name,
                OUT_OF_RANGE,
                format!("{name} must be between 1 and {max}"),
            ));
            default
        }
        Err(_) => {
            errors.push(ValidationError::new(
                name,
                INVALID_TYPE,
                format!("{name} must be a positive whole number"),
            ));
            default
        }
    }
}

pub fn pagination(params: &Params, errors: &mut Vec<ValidationError>) -> Pagination {
    let defaults = Pagination::default();

    Pagination {
        page: positive(params, "page", defaults.page, MAX_PAGE, errors),
        limit: positive(params, "limit", defaults.limit, MAX_LIMIT, errors),
    }
}

fn enumeration<T: Vocabulary>(
    params: &Params,
    name: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    let raw = param(params, name)?;
    let parsed = T::parse(raw);

    if parsed.is_none() {
        errors.push(ValidationError::new(
            name,
            INVALID_ENUM,
            format!("{name} must be one of: {}", T::names().join(", ")),
        ));
    }

    parsed
}

fn boolean(params: &Params, name: &str, errors: &mut Vec<ValidationError>) -> Option<bool> {
    match param(params, name)? {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            errors.push(ValidationError::new(
                name,
                INVALID_TYPE,
                format!("{name} must be true or false"),
            ));
            None
        }
    }
}

/// A bound of an inclusive date range. A bare date covers its whole day, so
/// `to=2026-03-01` still matches records from the evening of March 1st.
fn bound(
    params: &Params,
    name: &str,
    end_of_day: bool,
    errors: &mut Vec<ValidationError>,
) -> Option<DateTime<Utc>> {
    let raw = param(params, name)?;

    let parsed = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => {
            let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
            Some(if end_of_day {
                start + TimeDelta::days(1) - TimeDelta::milliseconds(1)
            } else {
                start
            })
        }
        Err(_) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
    };

    if parsed.is_none() {
        errors.push(ValidationError::new(
            name,
            INVALID_DATE,
            format!("{name} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp"),
        ));
    }

    parsed
}

pub fn product_query(params: &Params) -> Result<ProductQuery, AppError> {
    let mut errors = Vec::new();

    let query = ProductQuery {
        search: search(params),
        availability: enumeration(params, "availability", &mut errors),
        color: enumeration::<ColorName>(params, "color", &mut errors),
        pagination: pagination(params, &mut errors),
    };

    finish(query, errors)
}

pub fn admin_query(params: &Params) -> Result<AdminQuery, AppError> {
    let mut errors = Vec::new();

    let query = AdminQuery {
        search: search(params),
        role: enumeration::<Role>(params, "role", &mut errors),
        status: enumeration::<AdminStatus>(params, "status", &mut errors),
        pagination: pagination(params, &mut errors),
    };

    finish(query, errors)
}

/// Filters shared by the notification feed and the activity log.
pub fn notification_query(params: &Params) -> Result<NotificationQuery, AppError> {
    let mut errors = Vec::new();

    let query = NotificationQuery {
        kind: enumeration::<NotificationKind>(params, "type", &mut errors),
        read: boolean(params, "read", &mut errors),
        from: bound(params, "from", false, &mut errors),
        to: bound(params, "to", true, &mut errors),
        search: search(params),
        sender_id: param(params, "senderId").map(str::to_string),
        pagination: pagination(params, &mut errors),
    };

    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            errors.push(ValidationError::new(
                "to",
                OUT_OF_RANGE,
                "to must not be earlier than from",
            ));
        }
    }

    finish(query, errors)
}

pub fn page_query(params: &Params) -> Result<Pagination, AppError> {
    let mut errors = Vec::new();
    let pagination = pagination(params, &mut errors);
    finish(pagination, errors)
}

/// The `month` parameter, defaulting to the month containing `now`.
pub fn traffic_month(params: &Params, now: DateTime<Utc>) -> Result<Month, AppError> {
    match param(params, "month") {
        None => Ok(Month::containing(now)),
        Some(raw) => Month::parse(raw).ok_or_else(|| {
            AppError::invalid("month", INVALID_DATE, "month must be formatted as YYYY-MM")
        }),
    }
}
