mod model;

use async_trait::async_trait;
use model::PrescriptionStorageModel;
use sqlx::SqlitePool;

use crate::models::prescription::Prescription;

use super::{PrescriptionStore, StoreError};

const CREATE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    reminder_type TEXT DEFAULT 'both'
)";

const CREATE_PRESCRIPTIONS: &str = "
CREATE TABLE IF NOT EXISTS prescriptions (
    id INTEGER PRIMARY KEY,
    medicine_name TEXT NOT NULL,
    dosage TEXT NOT NULL,
    timings TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id)
)";

const LIST_PRESCRIPTIONS: &str = "
SELECT p.id AS id,
       p.medicine_name AS medicine_name,
       p.dosage AS dosage,
       p.timings AS timings,
       u.id AS user_id,
       u.name AS user_name,
       u.email AS user_email,
       u.phone AS user_phone,
       u.reminder_type AS user_reminder_type
FROM prescriptions p
JOIN users u ON u.id = p.user_id
ORDER BY p.id";

pub struct SqlitePrescriptionStore {
    pool: SqlitePool,
}

impl SqlitePrescriptionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(url).await?;
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        sqlx::query(CREATE_PRESCRIPTIONS).execute(&self.pool).await?;

        Ok(())
    }
}

#[async_trait]
impl PrescriptionStore for SqlitePrescriptionStore {
    async fn list_prescriptions(&self) -> Result<Vec<Prescription>, StoreError> {
        // Held only for this query, returned to the pool on drop.
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, PrescriptionStorageModel>(LIST_PRESCRIPTIONS)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::models::user::ReminderType;

    use super::*;

    async fn store() -> SqlitePrescriptionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqlitePrescriptionStore::new(pool);
        store.ensure_schema().await.unwrap();
        store
    }

    async fn exec(store: &SqlitePrescriptionStore, sql: &str) {
        sqlx::query(sql).execute(&store.pool).await.unwrap();
    }

    #[tokio::test]
    async fn joins_prescriptions_with_their_users() {
        let store = store().await;
        exec(
            &store,
            "INSERT INTO users (id, name, email, phone, reminder_type)
             VALUES (1, 'Alice', 'alice@example.com', '+10000000001', 'email')",
        )
        .await;
        exec(
            &store,
            "INSERT INTO prescriptions (id, medicine_name, dosage, timings, user_id)
             VALUES (1, 'Paracetamol', '500mg', '09:00,14:00', 1),
                    (2, 'Vitamin D', '1000IU', '08:00', 1)",
        )
        .await;

        let prescriptions = store.list_prescriptions().await.unwrap();

        assert_eq!(prescriptions.len(), 2);
        assert_eq!(prescriptions[0].description(), "Paracetamol (500mg)");
        assert_eq!(prescriptions[0].timings, "09:00,14:00");
        assert_eq!(prescriptions[1].description(), "Vitamin D (1000IU)");
        assert_eq!(prescriptions[0].user.name, "Alice");
        assert_eq!(prescriptions[0].user.reminder_type, ReminderType::Email);
    }

    #[tokio::test]
    async fn missing_or_unknown_reminder_type_falls_back_to_both() {
        let store = store().await;
        exec(
            &store,
            "INSERT INTO users (id, name, email, phone, reminder_type)
             VALUES (1, 'Bob', 'bob@example.com', '+10000000002', NULL),
                    (2, 'Carol', 'carol@example.com', '+10000000003', 'pager')",
        )
        .await;
        exec(
            &store,
            "INSERT INTO prescriptions (medicine_name, dosage, timings, user_id)
             VALUES ('Aspirin', '75mg', '08:00', 1),
                    ('Metformin', '850mg', '19:00', 2)",
        )
        .await;

        let prescriptions = store.list_prescriptions().await.unwrap();

        assert!(
            prescriptions
                .iter()
                .all(|p| p.user.reminder_type == ReminderType::Both)
        );
    }
}
