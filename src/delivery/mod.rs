mod call;
mod email;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use call::{TwilioCallSender, TwilioSettings};
pub use email::{EmailSettings, HttpEmailSender};

pub const REMINDER_SUBJECT: &str = "Medicine Reminder";
pub const TEST_SUBJECT: &str = "Test Reminder";
pub const TEST_EMAIL_MESSAGE: &str = "This is a test email from Medicine Reminder system.";
pub const TEST_CALL_MESSAGE: &str = "This is a test call from Medicine Reminder system.";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    async fn send(&self, to_address: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait CallSender: Send + Sync + 'static {
    async fn place_call(&self, to_phone: &str, spoken_message: &str) -> Result<(), DeliveryError>;
}

pub async fn send_test_email(sender: &dyn EmailSender, to_address: &str) -> Result<(), DeliveryError> {
    log::info!("Sending test email to {to_address}");
    sender.send(to_address, TEST_SUBJECT, TEST_EMAIL_MESSAGE).await
}

pub async fn place_test_call(sender: &dyn CallSender, to_phone: &str) -> Result<(), DeliveryError> {
    log::info!("Placing test call to {to_phone}");
    sender.place_call(to_phone, TEST_CALL_MESSAGE).await
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Rejected { status, body })
}
