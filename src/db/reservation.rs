use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ReservationStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub room_id: i64,
    pub user_email: String,
    pub starts_at: String,
    pub ends_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub room_id: i64,
    pub user_email: String,
    pub starts_at: String,
    pub ends_at: String,
}

const RESERVATION_COLUMNS: &str = "id, room_id, user_email, starts_at, ends_at, created_at";

impl ReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewReservation) -> Result<Reservation, sqlx::Error> {
        sqlx::query_as(&format!(
            "INSERT INTO reservations (room_id, user_email, starts_at, ends_at) VALUES (?, ?, ?, ?) RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(new.room_id)
        .bind(&new.user_email)
        .bind(&new.starts_at)
        .bind(&new.ends_at)
        .fetch_one(&self.pool)
        .await
    }

    /// List every reservation, earliest first.
    pub async fn list(&self) -> Result<Vec<Reservation>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {} FROM reservations ORDER BY starts_at, id",
            RESERVATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_by_room(&self, room_id: i64) -> Result<Vec<Reservation>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE room_id = ? ORDER BY starts_at, id",
            RESERVATION_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
    }
}
