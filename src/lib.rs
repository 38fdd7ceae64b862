mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{captcha, db, relay, utils, web};

use captcha::recaptcha::RecaptchaVerifier;
use relay::formsubmit::FormSubmitRelay;
use shared_repos::SharedRateLimitRepo;
use use_cases::contact::{ContactHandler, ContactPolicy};
use web::cors::CorsPolicy;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub cors: CorsPolicy,
    pub trust_x_forwarded_for: bool,
}

pub type AppContactHandler = ContactHandler<RecaptchaVerifier, FormSubmitRelay, SharedRateLimitRepo>;

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        redis_pool: Option<deadpool_redis::Pool>,
    ) -> anyhow::Result<Self> {
        // Uptime counts from startup, not from the first health check.
        once_cell::sync::Lazy::force(&constants::START_TIME);

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let captcha = RecaptchaVerifier::new(client.clone(), config);
        let relay = FormSubmitRelay::new(client, config);
        let rate_limit_repo = SharedRateLimitRepo::new(redis_pool);

        let policy = ContactPolicy::from(config);

        Ok(AppState {
            contact_handler: ContactHandler::new(captcha, relay, rate_limit_repo, policy),
            cors: CorsPolicy::from_config(config)?,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
        })
    }
}
