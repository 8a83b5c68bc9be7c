use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    prescription::{Prescription, PrescriptionId},
    user::UserId,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Prescription {prescription_id} references unknown user {user_id}")]
    DanglingUser {
        prescription_id: PrescriptionId,
        user_id: UserId,
    },
}

/// Read side of the prescription data the scanner works from.
#[async_trait]
pub trait PrescriptionStore: Send + Sync {
    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, StoreError>;
}
