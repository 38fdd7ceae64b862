use std::{collections::HashSet, time::Duration};

use crate::{
    entities::contact::{ContactForm, ContactResponse, Submission},
    errors::ContactError,
    repositories::{captcha::CaptchaVerifier, rate_limit::RateLimitRepository, relay::MailRelay},
    settings::AppConfig,
};

/// Tunables of the submission pipeline.
#[derive(Debug, Clone)]
pub struct ContactPolicy {
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    /// Lower-cased. Empty means any hostname claim is accepted.
    pub captcha_hostnames: HashSet<String>,
}

impl ContactPolicy {
    pub fn hostname_allowed(&self, hostname: &str) -> bool {
        self.captcha_hostnames.is_empty()
            || self.captcha_hostnames.contains(&hostname.to_lowercase())
    }
}

impl Default for ContactPolicy {
    fn default() -> Self {
        ContactPolicy {
            rate_limit_max: 5,
            rate_limit_window: Duration::from_secs(60 * 60),
            captcha_hostnames: HashSet::new(),
        }
    }
}

impl From<&AppConfig> for ContactPolicy {
    fn from(config: &AppConfig) -> Self {
        ContactPolicy {
            rate_limit_max: config.rate_limit_max,
            rate_limit_window: config.rate_limit_window,
            captcha_hostnames: config.captcha_hosts().into_iter().collect(),
        }
    }
}

pub struct ContactHandler<V, M, S>
where
    V: CaptchaVerifier,
    M: MailRelay,
    S: RateLimitRepository,
{
    pub captcha: V,
    pub relay: M,
    pub rate_limit_repo: S,
    pub policy: ContactPolicy,
}

impl<V, M, S> ContactHandler<V, M, S>
where
    V: CaptchaVerifier,
    M: MailRelay,
    S: RateLimitRepository,
{
    pub fn new(captcha: V, relay: M, rate_limit_repo: S, policy: ContactPolicy) -> Self {
        ContactHandler {
            captcha,
            relay,
            rate_limit_repo,
            policy,
        }
    }

    /// Runs a decoded form through captcha verification, field validation,
    /// the per-email limit and relay dispatch, stopping at the first failure.
    pub async fn submit(
        &self,
        form: ContactForm,
        remote_ip: &str,
    ) -> Result<ContactResponse, ContactError> {
        let token = form.captcha_token()?;

        self.verify_captcha(token, remote_ip).await?;

        let submission = form.into_submission()?;

        self.check_rate_limit(&submission).await?;

        self.relay.dispatch(&submission).await.map_err(|e| {
            tracing::error!("Relay dispatch failed: {}", e);
            ContactError::UpstreamRelayFailed
        })?;

        tracing::info!("Contact submission relayed");
        Ok(ContactResponse { ok: true })
    }

    async fn verify_captcha(&self, token: &str, remote_ip: &str) -> Result<(), ContactError> {
        let verification = self.captcha.verify(token, remote_ip).await.map_err(|e| {
            tracing::warn!("Captcha verification unavailable: {}", e);
            ContactError::CaptchaFailed
        })?;

        if !verification.success {
            tracing::info!(error_codes = ?verification.error_codes, "Captcha rejected");
            return Err(ContactError::CaptchaFailed);
        }

        if let Some(hostname) = verification.hostname.as_deref() {
            if !self.policy.hostname_allowed(hostname) {
                tracing::warn!("Captcha solved on unexpected host: {}", hostname);
                return Err(ContactError::CaptchaHostMismatch);
            }
        }

        Ok(())
    }

    /// Read-then-write admission check. Not atomic: concurrent requests for
    /// one email can both pass with the same count.
    async fn check_rate_limit(&self, submission: &Submission) -> Result<(), ContactError> {
        let key = submission.rate_limit_key();

        let count = self.rate_limit_repo.get_count(&key).await.map_err(|e| {
            tracing::error!("Rate limit lookup failed: {}", e);
            ContactError::RateLimitUnavailable
        })?
        .unwrap_or(0);

        if count >= self.policy.rate_limit_max {
            tracing::info!(count, "Contact submission throttled");
            return Err(ContactError::RateLimited);
        }

        self.rate_limit_repo
            .put_count(&key, count + 1, self.policy.rate_limit_window)
            .await
            .map_err(|e| {
                tracing::error!("Rate limit update failed: {}", e);
                ContactError::RateLimitUnavailable
            })
    }
}
