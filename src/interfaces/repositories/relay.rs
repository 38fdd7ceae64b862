use async_trait::async_trait;

use crate::{entities::contact::Submission, errors::RelayError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Hands a validated submission to the delivery service. No retries.
    async fn dispatch(&self, submission: &Submission) -> Result<(), RelayError>;
}
