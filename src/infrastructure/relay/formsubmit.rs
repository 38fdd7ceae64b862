use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{
    entities::contact::Submission,
    errors::RelayError,
    repositories::relay::MailRelay,
    settings::AppConfig,
};

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    name: &'a str,
    email: &'a str,
    service: &'a str,
    message: &'a str,
    #[serde(rename = "_subject")]
    subject: &'a str,
    #[serde(rename = "_template")]
    template: &'a str,
}

/// Posts submissions to a FormSubmit-style JSON endpoint.
#[derive(Debug, Clone)]
pub struct FormSubmitRelay {
    client: Client,
    url: Url,
    subject: String,
    template: String,
    timeout: Duration,
}

impl FormSubmitRelay {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        FormSubmitRelay {
            client,
            url: config.relay_url.clone(),
            subject: config.relay_subject.clone(),
            template: config.relay_template.clone(),
            timeout: config.outbound_timeout,
        }
    }
}

#[async_trait]
impl MailRelay for FormSubmitRelay {
    async fn dispatch(&self, submission: &Submission) -> Result<(), RelayError> {
        let payload = RelayPayload {
            name: &submission.name,
            email: &submission.email,
            service: &submission.service,
            message: &submission.message,
            subject: &self.subject,
            template: &self.template,
        };

        let response = self.client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Relay body unreadable after status {}: {}", status, e);
                return Ok(());
            }
        };

        if body_signals_success(&body) {
            Ok(())
        } else {
            Err(RelayError::Rejected(String::from_utf8_lossy(&body).chars().take(200).collect()))
        }
    }
}

/// Body check for a relay reply whose status was already 2xx. Empty or
/// non-JSON bodies pass; a JSON body must carry `success: true` (or the
/// string `"true"`, which FormSubmit sends).
pub fn body_signals_success(body: &[u8]) -> bool {
    if body.iter().all(u8::is_ascii_whitespace) {
        return true;
    }

    match serde_json::from_slice::<Value>(body) {
        Err(_) => true,
        Ok(Value::Object(map)) => match map.get("success") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        },
        Ok(_) => false,
    }
}
