use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{
    prescription::{Prescription, PrescriptionId},
    user::{ReminderType, User, UserId},
};

use super::{PrescriptionStore, StoreError};

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reminder_type: ReminderType,
}

pub struct NewPrescription {
    pub user_id: UserId,
    pub medicine_name: String,
    pub dosage: String,
    pub timings: String,
}

#[derive(Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    prescriptions: BTreeMap<PrescriptionId, NewPrescription>,
    next_user_id: UserId,
    next_prescription_id: PrescriptionId,
}

#[derive(Default)]
pub struct InMemoryPrescriptionStore {
    store: RwLock<Store>,
}

impl InMemoryPrescriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: NewUser) -> User {
        let mut store = self.store.write().await;
        store.next_user_id += 1;
        let user = User {
            id: store.next_user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            reminder_type: user.reminder_type,
        };
        store.users.insert(user.id, user.clone());

        user
    }

    pub async fn insert_prescription(&self, prescription: NewPrescription) -> PrescriptionId {
        let mut store = self.store.write().await;
        store.next_prescription_id += 1;
        let id = store.next_prescription_id;
        store.prescriptions.insert(id, prescription);

        log::debug!("Stored prescription {id}");
        id
    }
}

#[async_trait]
impl PrescriptionStore for InMemoryPrescriptionStore {
    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, StoreError> {
        let store = self.store.read().await;

        store
            .prescriptions
            .iter()
            .map(|(id, p)| -> Result<Prescription, StoreError> {
                let user = store
                    .users
                    .get(&p.user_id)
                    .cloned()
                    .ok_or(StoreError::DanglingUser {
                        prescription_id: *id,
                        user_id: p.user_id,
                    })?;

                Ok(Prescription {
                    id: *id,
                    medicine_name: p.medicine_name.clone(),
                    dosage: p.dosage.clone(),
                    timings: p.timings.clone(),
                    user,
                })
            })
            .collect()
    }
}
