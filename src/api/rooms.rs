//! Rooms API.
//!
//! Listing and lookup are public; create, update and delete require an
//! authenticated user.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use super::error::{ApiError, ResultExt};
use crate::auth::Auth;
use crate::db::{Database, RoomInput};

const MAX_ROOM_NAME_LENGTH: usize = 100;

#[derive(Clone)]
pub struct RoomsState {
    pub db: Database,
}

pub fn router(state: RoomsState) -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route(
            "/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/{id}/reservations", get(super::reservations::list_for_room))
        .with_state(state)
}

fn validate_room(input: &mut RoomInput) -> Result<(), ApiError> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(ApiError::bad_request("Room name cannot be empty"));
    }
    if input.name.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Room name cannot be longer than {} characters",
            MAX_ROOM_NAME_LENGTH
        )));
    }
    if input.capacity < 1 {
        return Err(ApiError::bad_request("Capacity must be at least 1"));
    }
    Ok(())
}

async fn list_rooms(State(state): State<RoomsState>) -> Result<impl IntoResponse, ApiError> {
    let rooms = state.db.rooms().list().await.db_err("Failed to list rooms")?;
    Ok(Json(rooms))
}

async fn get_room(
    State(state): State<RoomsState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .db
        .rooms()
        .get(id)
        .await
        .db_err("Failed to get room")?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    Ok(Json(room))
}

async fn create_room(
    State(state): State<RoomsState>,
    Auth(user): Auth,
    Json(mut payload): Json<RoomInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_room(&mut payload)?;

    let room = state
        .db
        .rooms()
        .create(&payload)
        .await
        .db_err("Failed to create room")?;

    tracing::info!(room_id = room.id, by = %user.email, "Room created");
    Ok((StatusCode::CREATED, Json(room)))
}

async fn update_room(
    State(state): State<RoomsState>,
    Auth(user): Auth,
    Path(id): Path<i64>,
    Json(mut payload): Json<RoomInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_room(&mut payload)?;

    let room = state
        .db
        .rooms()
        .update(id, &payload)
        .await
        .db_err("Failed to update room")?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    tracing::info!(room_id = id, by = %user.email, "Room updated");
    Ok(Json(room))
}

async fn delete_room(
    State(state): State<RoomsState>,
    Auth(user): Auth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .rooms()
        .delete(id)
        .await
        .db_err("Failed to delete room")?;

    if !deleted {
        return Err(ApiError::not_found("Room not found"));
    }

    tracing::info!(room_id = id, by = %user.email, "Room deleted");
    Ok(StatusCode::NO_CONTENT)
}
