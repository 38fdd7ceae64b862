use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Echo `http://localhost:*` / `http://127.0.0.1:*` origins. Defaults to
    /// on outside production.
    #[serde(default)]
    pub allow_localhost_origins: Option<bool>,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default)]
    pub recaptcha_secret: String,

    #[serde(default = "default_recaptcha_verify_url")]
    pub recaptcha_verify_url: Url,

    /// Hostnames a verified token may claim. Empty disables the check.
    #[serde(default)]
    pub captcha_hostnames: Vec<String>,

    #[serde(default = "default_relay_url")]
    pub relay_url: Url,

    #[serde(default = "default_relay_subject")]
    pub relay_subject: String,

    #[serde(default = "default_relay_template")]
    pub relay_template: String,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_rate_limit_window", deserialize_with = "deserialize_duration")]
    pub rate_limit_window: Duration,

    #[serde(default = "default_outbound_timeout", deserialize_with = "deserialize_duration")]
    pub outbound_timeout: Duration,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Relay".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8080".to_string()]
}
fn default_recaptcha_verify_url() -> Url {
    Url::parse("https://www.google.com/recaptcha/api/siteverify").expect("static URL is valid")
}
// Placeholder so the field always deserializes; `validate` rejects it.
fn default_relay_url() -> Url {
    Url::parse("http://relay.invalid/").expect("static URL is valid")
}
fn default_relay_subject() -> String {
    "New Contact Form Submission".to_string()
}
fn default_relay_template() -> String {
    "table".to_string()
}
fn default_rate_limit_max() -> u32 {
    5
}
fn default_rate_limit_window() -> Duration {
    Duration::from_secs(60 * 60)
}
fn default_outbound_timeout() -> Duration {
    Duration::from_secs(5)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name.to_string().to_lowercase())).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins")
                    .with_list_parse_key("captcha_hostnames"),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Unprefixed names are accepted too
        config.recaptcha_secret = fill_or_env(config.recaptcha_secret, "RECAPTCHA_SECRET")?;
        if config.allowed_origins == default_allowed_origins() {
            if let Ok(origin) = env::var("ALLOWED_ORIGIN") {
                config.allowed_origins = vec![origin];
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.recaptcha_secret.trim().is_empty() {
            errors.push("RECAPTCHA_SECRET cannot be empty");
        }
        if self.relay_url == default_relay_url() {
            errors.push("RELAY_URL must be set");
        }
        if self.rate_limit_max == 0 {
            errors.push("RATE_LIMIT_MAX must be at least 1");
        }
        if self.rate_limit_window.is_zero() {
            errors.push("RATE_LIMIT_WINDOW must be positive");
        }
        if self.outbound_timeout.is_zero() {
            errors.push("OUTBOUND_TIMEOUT must be positive");
        }
        if self.cors_origins().is_empty() {
            errors.push("ALLOWED_ORIGINS must list at least one origin");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        split_list(&self.allowed_origins)
    }

    pub fn localhost_origins_allowed(&self) -> bool {
        self.allow_localhost_origins.unwrap_or(!self.is_production())
    }

    pub fn captcha_hosts(&self) -> Vec<String> {
        split_list(&self.captcha_hostnames)
            .into_iter()
            .map(|host| host.to_lowercase())
            .collect()
    }
}

fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("redis_url", &self.redis_url.as_deref().map(str::redact))
            .field("allowed_origins", &self.allowed_origins)
            .field("allow_localhost_origins", &self.localhost_origins_allowed())
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("recaptcha_secret", &self.recaptcha_secret.redact())
            .field("recaptcha_verify_url", &self.recaptcha_verify_url.as_str())
            .field("captcha_hostnames", &self.captcha_hostnames)
            .field("relay_url", &self.relay_url.as_str())
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window", &humantime::format_duration(self.rate_limit_window).to_string())
            .field("outbound_timeout", &humantime::format_duration(self.outbound_timeout).to_string())
            .finish()
    }
}
