use std::sync::LazyLock;

use catalog::admins::{AdminStatus, Role};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{
    EMPTY, INVALID_EMAIL, INVALID_TYPE, Mode, REQUIRED, SAME_PASSWORD, TOO_LONG, TOO_SHORT,
    Validator, validated,
};
use crate::error::{AppError, ValidationError};

pub const EMAIL_MAX: usize = 254;
pub const FULL_NAME_MAX: usize = 100;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

fn email(validator: &mut Validator, name: &str) {
    if let Some(address) = validator.string(name, EMAIL_MAX) {
        if !EMAIL.is_match(address) {
            validator.errors_mut().push(ValidationError::new(
                name,
                INVALID_EMAIL,
                format!("{name} must be a valid email address"),
            ));
        }
    }
}

/// Passwords are checked as submitted; surrounding whitespace is significant.
fn password<'a>(validator: &mut Validator<'a>, name: &str, bounded: bool) -> Option<&'a str> {
    let Some(value) = validator.get(name) else {
        validator.errors_mut().push(ValidationError::new(
            name,
            REQUIRED,
            format!("{name} is required"),
        ));
        return None;
    };

    let Some(secret) = value.as_str() else {
        validator.errors_mut().push(ValidationError::new(
            name,
            INVALID_TYPE,
            format!("{name} must be a string"),
        ));
        return None;
    };

    let length = secret.chars().count();
    let error = if length == 0 {
        Some(ValidationError::new(
            name,
            REQUIRED,
            format!("{name} cannot be empty"),
        ))
    } else if bounded && length < PASSWORD_MIN {
        Some(ValidationError::new(
            name,
            TOO_SHORT,
            format!("{name} must be at least {PASSWORD_MIN} characters"),
        ))
    } else if bounded && length > PASSWORD_MAX {
        Some(ValidationError::new(
            name,
            TOO_LONG,
            format!("{name} must be at most {PASSWORD_MAX} characters"),
        ))
    } else {
        None
    };

    match error {
        Some(error) => {
            validator.errors_mut().push(error);
            None
        }
        None => Some(secret),
    }
}

pub fn validate_login(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Create);

    validator.string("email", EMAIL_MAX);
    if validator.is_object() {
        password(&mut validator, "password", false);
    }

    validator.finish()
}

pub fn validate_signup(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Create);

    email(&mut validator, "email");
    if validator.is_object() {
        password(&mut validator, "password", true);
    }
    validator.string("fullName", FULL_NAME_MAX);
    if validator.present("role") {
        validator.enumeration::<Role>("role");
    }

    validator.finish()
}

pub fn validate_profile_update(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Create);
    validator.string("fullName", FULL_NAME_MAX);
    validator.finish()
}

pub fn validate_password_change(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Create);
    if !validator.is_object() {
        return validator.finish();
    }

    let current = password(&mut validator, "currentPassword", false);
    let new = password(&mut validator, "newPassword", true);

    if let (Some(current), Some(new)) = (current, new) {
        if current == new {
            validator.push(ValidationError::new(
                "newPassword",
                SAME_PASSWORD,
                "newPassword must differ from currentPassword",
            ));
        }
    }

    validator.finish()
}

/// Role and status changes made by a manager. At least one must be given.
pub fn validate_admin_update(payload: &Value) -> Vec<ValidationError> {
    let mut validator = Validator::new(payload, Mode::Update);

    let role = validator.present("role");
    let status = validator.present("status");
    validator.enumeration::<Role>("role");
    validator.enumeration::<AdminStatus>("status");

    if validator.is_object() && !role && !status {
        validator.push(ValidationError::new(
            "body",
            EMPTY,
            "Provide a role or a status to change",
        ));
    }

    validator.finish()
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Login {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_login(&payload);
        let mut login: Self = validated(payload, errors)?;
        login.email = login.email.trim().to_lowercase();
        Ok(login)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<Role>,
}

impl Signup {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_signup(&payload);
        let mut signup: Self = validated(payload, errors)?;
        signup.email = signup.email.trim().to_lowercase();
        signup.full_name = signup.full_name.trim().to_string();
        Ok(signup)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
}

impl ProfileUpdate {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_profile_update(&payload);
        let mut update: Self = validated(payload, errors)?;
        update.full_name = update.full_name.trim().to_string();
        Ok(update)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordChange {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_password_change(&payload);
        validated(payload, errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdate {
    pub role: Option<Role>,
    pub status: Option<AdminStatus>,
}

impl AdminUpdate {
    pub fn parse(payload: Value) -> Result<Self, AppError> {
        let errors = validate_admin_update(&payload);
        validated(payload, errors)
    }
}
