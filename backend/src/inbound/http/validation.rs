//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{BIO_MAX_CHARS, EMOJI_MAX_CHARS, Error, MESSAGE_MAX_CHARS, PublicId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    EmptyValue,
    TooLong,
    InvalidEmoji,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EmptyValue => "empty_value",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidEmoji => "invalid_emoji",
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

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const TEXT_FIELD: FieldName = FieldName::new("text");
pub(crate) const BIO_FIELD: FieldName = FieldName::new("bio");
pub(crate) const EMOJI_FIELD: FieldName = FieldName::new("emoji");

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn too_long_error(field: FieldName, max: usize) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be at most {max} characters")).with_details(
        json!({
            "field": name,
            "code": ErrorCode::TooLong.as_str(),
            "max": max,
        }),
    )
}

/// Message text must be non-blank and at most [`MESSAGE_MAX_CHARS`] long.
pub(crate) fn validate_message_text(text: &str) -> Result<&str, Error> {
    if text.trim().is_empty() {
        let name = TEXT_FIELD.as_str();
        return Err(field_error(
            TEXT_FIELD,
            ErrorCode::EmptyValue,
            format!("{name} must not be empty"),
        ));
    }
    if text.chars().count() > MESSAGE_MAX_CHARS {
        return Err(too_long_error(TEXT_FIELD, MESSAGE_MAX_CHARS));
    }
    Ok(text)
}

/// Bios are trimmed; an empty bio clears it.
pub(crate) fn validate_bio(bio: &str) -> Result<&str, Error> {
    let trimmed = bio.trim();
    if trimmed.chars().count() > BIO_MAX_CHARS {
        return Err(too_long_error(BIO_FIELD, BIO_MAX_CHARS));
    }
    Ok(trimmed)
}

/// Reactions are short and contain no whitespace.
pub(crate) fn validate_emoji(emoji: &str) -> Result<&str, Error> {
    let count = emoji.chars().count();
    if count == 0 || count > EMOJI_MAX_CHARS || emoji.chars().any(char::is_whitespace) {
        let name = EMOJI_FIELD.as_str();
        return Err(field_error(
            EMOJI_FIELD,
            ErrorCode::InvalidEmoji,
            format!("{name} must be 1 to {EMOJI_MAX_CHARS} characters without spaces"),
        ));
    }
    Ok(emoji)
}

/// Ids that cannot name a user are reported the same way as unknown ones.
pub(crate) fn parse_public_id(raw: &str) -> Result<PublicId, Error> {
    raw.parse().map_err(|_| Error::not_found("user not found"))
}
