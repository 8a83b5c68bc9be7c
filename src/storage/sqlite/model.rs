use crate::models::{
    prescription::Prescription,
    user::{ReminderType, User},
};

#[derive(sqlx::FromRow)]
pub struct PrescriptionStorageModel {
    pub id: i64,
    pub medicine_name: String,
    pub dosage: String,
    pub timings: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub user_reminder_type: Option<String>,
}

impl From<PrescriptionStorageModel> for Prescription {
    fn from(value: PrescriptionStorageModel) -> Self {
        let reminder_type = parse_reminder_type(value.user_id, value.user_reminder_type.as_deref());

        Self {
            id: value.id,
            medicine_name: value.medicine_name,
            dosage: value.dosage,
            timings: value.timings,
            user: User {
                id: value.user_id,
                name: value.user_name,
                email: value.user_email,
                phone: value.user_phone,
                reminder_type,
            },
        }
    }
}

fn parse_reminder_type(user_id: i64, raw: Option<&str>) -> ReminderType {
    match raw.map(str::parse::<ReminderType>) {
        None => ReminderType::default(),
        Some(Ok(reminder_type)) => reminder_type,
        Some(Err(error)) => {
            log::warn!("{error} for user {user_id}, defaulting to both");
            ReminderType::default()
        }
    }
}
