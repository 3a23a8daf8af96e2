//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` [`Error`] whose details name the
//! offending field and a stable machine-readable code.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::json;
use tracing::warn;

use crate::domain::{
    Error, LoginValidationError, RegistrationValidationError, SavedItemValidationError,
    UserValidationError,
};

/// Largest JSON body accepted by the API.
pub(crate) const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    EmptyValue,
    TooLong,
    InvalidFormat,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::EmptyValue => "empty_value",
            Self::TooLong => "too_long",
            Self::InvalidFormat => "invalid_format",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

/// Unwrap a required payload field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => FieldName::new("email"),
        LoginValidationError::EmptyPassword => FieldName::new("password"),
    };
    field_error(field, ValidationCode::EmptyValue, err.to_string())
}

fn map_user_validation_error(err: &UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => {
            (FieldName::new("id"), ValidationCode::InvalidFormat)
        }
        UserValidationError::EmptyUsername => {
            (FieldName::new("username"), ValidationCode::EmptyValue)
        }
        UserValidationError::UsernameTooLong { .. } => {
            (FieldName::new("username"), ValidationCode::TooLong)
        }
        UserValidationError::EmptyEmail => (FieldName::new("email"), ValidationCode::EmptyValue),
        UserValidationError::EmailTooLong { .. } => {
            (FieldName::new("email"), ValidationCode::TooLong)
        }
        UserValidationError::InvalidEmail => {
            (FieldName::new("email"), ValidationCode::InvalidFormat)
        }
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::User(inner) => map_user_validation_error(&inner),
        other @ RegistrationValidationError::EmptyPassword => field_error(
            FieldName::new("password"),
            ValidationCode::EmptyValue,
            other.to_string(),
        ),
    }
}

pub(crate) fn map_saved_item_validation_error(err: SavedItemValidationError) -> Error {
    let code = match err {
        SavedItemValidationError::EmptyKey => ValidationCode::EmptyValue,
        SavedItemValidationError::KeyTooLong { .. } => ValidationCode::TooLong,
    };
    field_error(FieldName::new("key"), code, err.to_string())
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected malformed JSON body");
    let message = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "request body is too large".to_owned()
        }
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid JSON body: {inner}"),
        _ => "invalid JSON body".to_owned(),
    };
    Error::invalid_request(message).into()
}

/// JSON extractor configuration mapping body errors to `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(json_error_handler)
}
