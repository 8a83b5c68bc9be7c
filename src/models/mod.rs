pub mod prescription;
pub mod reminder;
pub mod user;
