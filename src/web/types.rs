//! Request and response structs of the `web` module and their implementations.
//! Includes structs that need to be validated, their parsing implementations and tests for those

use derive_more::Deref;
use rand::{rng, RngCore};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

use crate::{database::subscribers::ExportedSubscriber, utils};

/// Longest email we store, counted after HTML escaping.
pub const MAX_EMAIL_LEN: usize = 255;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable Subscriber
/// The raw `POST /api/subscribe` body, the email may be missing or invalid.
#[derive(Debug, Deserialize)]
pub struct DeserSubscriber {
    #[serde(default)]
    pub email: Option<String>,
}

/// Validated Subscriber Email
/// Trimmed, lowercased, syntactically valid and HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        let value = value.to_lowercase();
        if !value.validate_email() {
            return Err(DataParsingError::EmailInvalid);
        }

        let escaped = htmlescape::encode_minimal(&value);
        if escaped.graphemes(true).count() > MAX_EMAIL_LEN {
            return Err(DataParsingError::EmailTooLong);
        }

        Ok(ValidEmail(escaped))
    }
}

impl TryFrom<DeserSubscriber> for ValidEmail {
    type Error = DataParsingError;

    fn try_from(deser_sub: DeserSubscriber) -> Result<Self, Self::Error> {
        let email = deser_sub.email.ok_or(DataParsingError::EmailMissing)?;
        ValidEmail::parse(email)
    }
}

/// A random 86 character-long case-sensitive Base64-URL encoded token.
/// Used for both the unsubscribe and the confirmation token.
#[derive(Debug, Clone, Deref)]
pub struct Token(String);

impl Token {
    const RAW_LEN: usize = 64;

    /// Generates an array of 64 random bytes and encodes it to Base64-URL without padding
    pub fn generate() -> Self {
        let mut rand_bytes = [0u8; Self::RAW_LEN];
        rng().fill_bytes(&mut rand_bytes);
        let token = utils::b64u_encode(rand_bytes);

        Self(token)
    }

    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        let decoded = utils::b64u_decode(value);
        if decoded.is_err() || decoded.is_ok_and(|v| v.len() != Self::RAW_LEN) {
            return Err(DataParsingError::TokenInvalid(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// `{ success, message }` body returned by the subscribe endpoint.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: &'static str,
}

impl MessageBody {
    pub fn success(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataBody<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ExportBody {
    pub success: bool,
    pub data: Vec<ExportedSubscriber>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("Email is required")]
    EmailMissing,
    #[error("Please provide a valid email address")]
    EmailInvalid,
    #[error("Email must be at most 255 characters")]
    EmailTooLong,

    #[error("invalid token: {0}")]
    TokenInvalid(String),
}
