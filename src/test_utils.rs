use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    delivery::{CallSender, DeliveryError, EmailSender},
    models::{
        reminder::ReminderEvent,
        user::{ReminderType, User, UserId},
    },
};

pub fn user(id: UserId, name: &str) -> User {
    user_with_type(id, name, ReminderType::Both)
}

pub fn user_with_type(id: UserId, name: &str, reminder_type: ReminderType) -> User {
    User {
        id,
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: format!("+1000000{id:04}"),
        reminder_type,
    }
}

pub fn event(user: &User, medicine: &str) -> ReminderEvent {
    ReminderEvent::new(user.clone(), medicine.to_owned())
}

fn rejected() -> DeliveryError {
    DeliveryError::Rejected {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "provider down".to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingEmailSender {
    pub sent: Arc<Mutex<Vec<SentEmail>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingEmailSender {
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.failing.store(true, Ordering::Relaxed);
        sender
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to_address: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to_address.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });

        if self.failing.load(Ordering::Relaxed) {
            return Err(rejected());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCall {
    pub to: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct RecordingCallSender {
    pub placed: Arc<Mutex<Vec<PlacedCall>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingCallSender {
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.failing.store(true, Ordering::Relaxed);
        sender
    }

    pub fn placed(&self) -> Vec<PlacedCall> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallSender for RecordingCallSender {
    async fn place_call(&self, to_phone: &str, spoken_message: &str) -> Result<(), DeliveryError> {
        self.placed.lock().unwrap().push(PlacedCall {
            to: to_phone.to_owned(),
            message: spoken_message.to_owned(),
        });

        if self.failing.load(Ordering::Relaxed) {
            return Err(rejected());
        }
        Ok(())
    }
}
