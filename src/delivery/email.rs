use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DeliveryError, EmailSender, check_status};

#[derive(Deserialize, Debug, Clone)]
pub struct EmailSettings {
    pub base_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Sends plain text email through an HTTP mail API (`POST /emails`).
pub struct HttpEmailSender {
    client: Client,
    settings: EmailSettings,
}

impl HttpEmailSender {
    pub fn new(settings: EmailSettings) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, to_address: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let request = SendEmailRequest {
            from: &self.settings.from_address,
            to: vec![to_address],
            subject,
            text: body,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.settings.base_url.trim_end_matches('/')))
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_default();
        log::info!("Email sent to {to_address} [message_id = {id}]");

        Ok(())
    }
}
