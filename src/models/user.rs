use std::{fmt, str::FromStr};

use thiserror::Error;

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderType {
    Email,
    Call,
    #[default]
    Both,
}

impl ReminderType {
    pub fn wants_email(&self) -> bool {
        matches!(self, ReminderType::Email | ReminderType::Both)
    }

    pub fn wants_call(&self) -> bool {
        matches!(self, ReminderType::Call | ReminderType::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Email => "email",
            ReminderType::Call => "call",
            ReminderType::Both => "both",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown reminder type {0:?}")]
pub struct UnknownReminderType(pub String);

impl FromStr for ReminderType {
    type Err = UnknownReminderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(ReminderType::Email),
            "call" => Ok(ReminderType::Call),
            "both" => Ok(ReminderType::Both),
            _ => Err(UnknownReminderType(s.to_owned())),
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reminder_type: ReminderType,
}
