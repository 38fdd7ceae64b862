use actix_web::{
    http::header::{self, HeaderValue, InvalidHeaderValue},
    HttpRequest, HttpResponse,
};

use crate::settings::AppConfig;

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "content-type";

/// Advisory CORS header shaping for the contact endpoint. Requests from
/// unlisted origins are still served; they just receive the default origin.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    default_origin: HeaderValue,
    allow_localhost: bool,
}

impl CorsPolicy {
    pub fn new(
        allowed_origins: Vec<String>,
        allow_localhost: bool,
    ) -> Result<Self, InvalidHeaderValue> {
        let default_origin = allowed_origins
            .first()
            .map(String::as_str)
            .unwrap_or("null");

        Ok(CorsPolicy {
            default_origin: HeaderValue::from_str(default_origin)?,
            allowed_origins,
            allow_localhost,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, InvalidHeaderValue> {
        Self::new(config.cors_origins(), config.localhost_origins_allowed())
    }

    /// Origin value to echo in `Access-Control-Allow-Origin`.
    pub fn resolve_origin(&self, req: &HttpRequest) -> HeaderValue {
        req.headers()
            .get(header::ORIGIN)
            .filter(|value| value.to_str().is_ok_and(|origin| self.is_allowed(origin)))
            .cloned()
            .unwrap_or_else(|| self.default_origin.clone())
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.allowed_origins.iter().any(|allowed| allowed == "*" || allowed == origin) {
            return true;
        }
        self.allow_localhost
            && (origin.starts_with("http://localhost:") || origin.starts_with("http://127.0.0.1:"))
    }

    /// Adds the CORS headers to a finished response.
    pub fn apply(&self, req: &HttpRequest, mut response: HttpResponse) -> HttpResponse {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.resolve_origin(req));
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        response
    }
}
