use async_trait::async_trait;

use crate::{entities::contact::CaptchaVerification, errors::CaptchaError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Verifies a client-solved challenge token. `remote_ip` is a hint and
    /// may be empty.
    async fn verify(&self, token: &str, remote_ip: &str) -> Result<CaptchaVerification, CaptchaError>;
}
