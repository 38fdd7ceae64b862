use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    entities::contact::CaptchaVerification,
    errors::CaptchaError,
    repositories::captcha::CaptchaVerifier,
    settings::AppConfig,
};

/// Verifies tokens against a reCAPTCHA-compatible `siteverify` endpoint.
#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    verify_url: Url,
    secret: Zeroizing<String>,
    timeout: Duration,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        RecaptchaVerifier {
            client,
            verify_url: config.recaptcha_verify_url.clone(),
            secret: Zeroizing::new(config.recaptcha_secret.clone()),
            timeout: config.outbound_timeout,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: &str) -> Result<CaptchaVerification, CaptchaError> {
        let params = [
            ("secret", self.secret.as_str()),
            ("response", token),
            ("remoteip", remote_ip),
        ];

        let response = self.client
            .post(self.verify_url.clone())
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptchaError::Status(status.as_u16()));
        }

        Ok(response.json::<CaptchaVerification>().await?)
    }
}

impl std::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("verify_url", &self.verify_url.as_str())
            .field("secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
