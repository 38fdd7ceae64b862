use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;

/// Fields of a contact submission that carry validation rules.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    #[display("name")]
    Name,

    #[display("email")]
    Email,

    #[display("service")]
    Service,

    #[display("message")]
    Message,
}

/// Terminal rejections of the contact pipeline. The `Display` text is the
/// stable `error` string sent to the client.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[display("Bad JSON")]
    BadRequestBody,

    #[display("Missing captcha token")]
    MissingCaptchaToken,

    #[display("Captcha failed")]
    CaptchaFailed,

    #[display("Captcha host mismatch")]
    CaptchaHostMismatch,

    #[display("Invalid {_0}")]
    InvalidField(FieldName),

    #[display("Too many submissions, try later")]
    RateLimited,

    #[display("Upstream send failed")]
    UpstreamRelayFailed,

    #[display("Method not allowed")]
    MethodNotAllowed,

    #[display("Service temporarily unavailable")]
    RateLimitUnavailable,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ErrorBody {
                ok: false,
                error: self.to_string(),
            })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::BadRequestBody
            | ContactError::MissingCaptchaToken
            | ContactError::CaptchaFailed
            | ContactError::CaptchaHostMismatch
            | ContactError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ContactError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ContactError::UpstreamRelayFailed => StatusCode::BAD_GATEWAY,
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::RateLimitUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<serde_json::Error> for ContactError {
    fn from(_: serde_json::Error) -> Self {
        ContactError::BadRequestBody
    }
}

#[derive(Debug, Display)]
pub enum CaptchaError {
    #[display("Captcha verification timed out")]
    Timeout,

    #[display("Captcha verification request failed: {_0}")]
    Transport(String),

    #[display("Captcha verification returned status {_0}")]
    Status(u16),

    #[display("Captcha verification reply could not be decoded: {_0}")]
    Decode(String),
}

impl std::error::Error for CaptchaError {}

impl From<reqwest::Error> for CaptchaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CaptchaError::Timeout
        } else if err.is_decode() {
            CaptchaError::Decode(err.to_string())
        } else {
            CaptchaError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Display)]
pub enum RelayError {
    #[display("Relay dispatch timed out")]
    Timeout,

    #[display("Relay request failed: {_0}")]
    Transport(String),

    #[display("Relay returned status {_0}")]
    Status(u16),

    #[display("Relay reported failure: {_0}")]
    Rejected(String),
}

impl std::error::Error for RelayError {}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display("Redis connection failed: {_0}")]
    RedisConnection(String),

    #[display("Redis operation failed: {_0}")]
    RedisOperation(String),
}

impl std::error::Error for StoreError {}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::RedisConnection(err.to_string())
    }
}

impl From<deadpool_redis::CreatePoolError> for StoreError {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        StoreError::RedisConnection(err.to_string())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::RedisOperation(err.to_string())
    }
}
