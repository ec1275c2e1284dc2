use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

/// Store for meeting rooms.
#[derive(Clone)]
pub struct RoomStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable room fields, used for both create and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomInput {
    pub name: String,
    pub capacity: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

const ROOM_COLUMNS: &str = "id, name, capacity, location, description, created_at, updated_at";

impl RoomStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &RoomInput) -> Result<Room, sqlx::Error> {
        sqlx::query_as(&format!(
            "INSERT INTO rooms (name, capacity, location, description) VALUES (?, ?, ?, ?) RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.capacity)
        .bind(&input.location)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List all rooms ordered by ID.
    pub async fn list(&self) -> Result<Vec<Room>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {} FROM rooms ORDER BY id", ROOM_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    /// Replace all writable fields. Returns `None` if the room does not exist.
    pub async fn update(&self, id: i64, input: &RoomInput) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE rooms SET name = ?, capacity = ?, location = ?, description = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
             WHERE id = ? RETURNING {}",
            ROOM_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.capacity)
        .bind(&input.location)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
