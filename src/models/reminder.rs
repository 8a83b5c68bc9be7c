use super::{prescription::Prescription, user::User};

/// One dose due for one user. Lives only between a scan and the batch that
/// delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEvent {
    pub user: User,
    pub medicine: String,
}

impl ReminderEvent {
    pub fn new(user: User, medicine: String) -> Self {
        Self { user, medicine }
    }

    pub fn for_prescription(prescription: &Prescription) -> Self {
        Self::new(prescription.user.clone(), prescription.description())
    }
}
