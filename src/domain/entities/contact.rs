use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{ContactError, FieldName};

pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Raw submission as posted by the browser. Absent fields decode as empty
/// strings so they fail the same rule an empty value would.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 60))]
    pub name: String,

    #[validate(length(max = 254), regex(path = *EMAIL_REGEX))]
    pub email: String,

    #[validate(length(min = 1, max = 120))]
    pub service: String,

    #[validate(length(min = 10, max = 4000))]
    pub message: String,

    #[serde(rename = "recaptchaToken")]
    pub recaptcha_token: String,
}

/// A submission that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

impl ContactForm {
    /// Decodes a request body. Anything that is not a JSON object with
    /// string (or absent) fields is a `BadRequestBody`.
    pub fn from_slice(body: &[u8]) -> Result<Self, ContactError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn captcha_token(&self) -> Result<&str, ContactError> {
        let token = self.recaptcha_token.trim();
        if token.is_empty() {
            return Err(ContactError::MissingCaptchaToken);
        }
        Ok(token)
    }

    /// Applies the field rules and reports the first failing field in
    /// name, email, service, message order.
    pub fn into_submission(self) -> Result<Submission, ContactError> {
        if let Err(errors) = self.validate() {
            let failed = errors.errors();
            let field = [
                ("name", FieldName::Name),
                ("email", FieldName::Email),
                ("service", FieldName::Service),
                ("message", FieldName::Message),
            ]
            .into_iter()
            .find(|(key, _)| failed.contains_key(*key))
            .map(|(_, field)| field)
            .unwrap_or(FieldName::Name);

            return Err(ContactError::InvalidField(field));
        }

        Ok(Submission {
            name: self.name,
            email: self.email,
            service: self.service,
            message: self.message,
        })
    }
}

impl Submission {
    /// Counter key for the per-email limit: lower-cased and URL-encoded so
    /// it is safe as a store key.
    pub fn rate_limit_key(&self) -> String {
        let email_norm = self.email.trim().to_lowercase();
        format!("rl:{}", urlencoding::encode(&email_norm))
    }
}

/// Reply from the CAPTCHA verification service.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CaptchaVerification {
    pub success: bool,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub challenge_ts: Option<String>,

    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
}
