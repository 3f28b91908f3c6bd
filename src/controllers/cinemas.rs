use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::{ReservationError, Result},
    middleware::ValidatedJson,
    models::{Cinema, CinemaId},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinemas", post(create_cinema))
        .route("/cinemas/{cinema_id}", get(get_cinema))
        .route("/cinemas/{cinema_id}/purchase/{seat_number}", post(purchase_seat))
        .route("/cinemas/{cinema_id}/purchaseConsecutive", post(purchase_consecutive))
}

/* ---------- helpers ---------- */

// Нечисловой id не может принадлежать ни одному залу
fn parse_cinema_id(raw: &str) -> Result<CinemaId> {
    raw.trim()
        .parse()
        .map_err(|_| ReservationError::CinemaNotFound)
}

/* ---------- CINEMAS ---------- */

// POST /cinemas
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCinemaRequest {
    #[validate(range(min = 1, message = "seats must be a positive integer"))]
    pub seats: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCinemaResponse {
    pub cinema_id: CinemaId,
}

async fn create_cinema(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCinemaRequest>,
) -> Result<Json<CreateCinemaResponse>> {
    let cinema_id = state.reservations.create_cinema(req.seats).await?;
    Ok(Json(CreateCinemaResponse { cinema_id }))
}

// GET /cinemas/{cinema_id}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaView {
    pub id: CinemaId,
    pub seats: u32,
    pub purchased_seats: Vec<u32>,
    pub free_seats: u32,
    pub fully_booked: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Cinema> for CinemaView {
    fn from(cinema: &Cinema) -> Self {
        Self {
            id: cinema.id(),
            seats: cinema.seats(),
            purchased_seats: cinema.purchased_seats().iter().copied().collect(),
            free_seats: cinema.free_seats(),
            fully_booked: cinema.is_fully_booked(),
            version: cinema.version(),
            created_at: cinema.created_at(),
        }
    }
}

async fn get_cinema(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<String>,
) -> Result<Json<CinemaView>> {
    let cinema_id = parse_cinema_id(&cinema_id)?;
    let cinema = state.reservations.get_cinema(cinema_id).await?;
    Ok(Json(CinemaView::from(&cinema)))
}

// POST /cinemas/{cinema_id}/purchase/{seat_number}
#[derive(Debug, Serialize)]
pub struct PurchaseSeatResponse {
    pub seat: u32,
}

async fn purchase_seat(
    State(state): State<Arc<AppState>>,
    Path((cinema_id, seat_number)): Path<(String, String)>,
) -> Result<Json<PurchaseSeatResponse>> {
    let cinema_id = parse_cinema_id(&cinema_id)?;
    let seat = state.reservations.purchase_seat(cinema_id, &seat_number).await?;
    Ok(Json(PurchaseSeatResponse { seat }))
}

// POST /cinemas/{cinema_id}/purchaseConsecutive
#[derive(Debug, Serialize)]
pub struct PurchaseConsecutiveResponse {
    pub seats: [u32; 2],
}

async fn purchase_consecutive(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<String>,
) -> Result<Json<PurchaseConsecutiveResponse>> {
    let cinema_id = parse_cinema_id(&cinema_id)?;
    let seats = state.reservations.purchase_consecutive_seats(cinema_id).await?;
    Ok(Json(PurchaseConsecutiveResponse { seats }))
}
