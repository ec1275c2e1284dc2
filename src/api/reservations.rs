//! Reservations API.
//!
//! Incoming timestamps may be any RFC 3339 instant. They are normalised to UTC
//! and stored as `YYYY-MM-DDTHH:MM:SSZ`, so the store can sort on the raw
//! column.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use super::rooms::RoomsState;
use crate::auth::Auth;
use crate::db::{Database, NewReservation};

#[derive(Clone)]
pub struct ReservationsState {
    pub db: Database,
}

pub fn router(state: ReservationsState) -> Router {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateReservationRequest {
    room_id: i64,
    starts_at: String,
    ends_at: String,
}

/// Parse an RFC 3339 instant, truncated to whole seconds in UTC.
fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(0))
        .map_err(|e| ApiError::bad_request(format!("{} is not an RFC 3339 timestamp: {}", field, e)))
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn list_reservations(
    State(state): State<ReservationsState>,
) -> Result<impl IntoResponse, ApiError> {
    let reservations = state
        .db
        .reservations()
        .list()
        .await
        .db_err("Failed to list reservations")?;
    Ok(Json(reservations))
}

/// `GET /api/rooms/{id}/reservations`, mounted on the rooms router.
pub(super) async fn list_for_room(
    State(state): State<RoomsState>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .rooms()
        .get(room_id)
        .await
        .db_err("Failed to get room")?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    let reservations = state
        .db
        .reservations()
        .list_by_room(room_id)
        .await
        .db_err("Failed to list reservations")?;
    Ok(Json(reservations))
}

async fn create_reservation(
    State(state): State<ReservationsState>,
    Auth(user): Auth,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let starts_at = parse_timestamp("starts_at", &payload.starts_at)?;
    let ends_at = parse_timestamp("ends_at", &payload.ends_at)?;
    if ends_at <= starts_at {
        return Err(ApiError::bad_request("ends_at must be after starts_at"));
    }

    state
        .db
        .rooms()
        .get(payload.room_id)
        .await
        .db_err("Failed to get room")?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    let reservation = state
        .db
        .reservations()
        .create(&NewReservation {
            room_id: payload.room_id,
            user_email: user.email,
            starts_at: format_timestamp(&starts_at),
            ends_at: format_timestamp(&ends_at),
        })
        .await
        .db_err("Failed to create reservation")?;

    tracing::info!(
        reservation_id = reservation.id,
        room_id = reservation.room_id,
        "Reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}
