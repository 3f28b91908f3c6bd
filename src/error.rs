//! Errors raised by seat reservation and their HTTP translation.
//!
//! Every handler returns `Result<_, ReservationError>`; the `IntoResponse`
//! impl below logs the error and renders it as `{"error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Cinema not found")]
    CinemaNotFound,

    #[error("Invalid seat number")]
    InvalidSeatNumber,

    #[error("Seat already purchased")]
    SeatAlreadyPurchased,

    #[error("No two consecutive seats available")]
    NoConsecutiveSeats,

    #[error("Seat count must be between 1 and {max}")]
    InvalidSeatCount { max: u32 },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Every version-checked write lost to a concurrent writer.
    #[error("Cinema was modified concurrently, please retry")]
    ConcurrentModification,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CinemaNotFound => ErrorKind::NotFound,
            Self::InvalidSeatNumber
            | Self::NoConsecutiveSeats
            | Self::InvalidSeatCount { .. }
            | Self::InvalidBody(_) => ErrorKind::InvalidArgument,
            Self::SeatAlreadyPurchased | Self::ConcurrentModification => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CinemaNotFound => StatusCode::NOT_FOUND,
            // already-purchased keeps the 400 the public API has always returned
            Self::SeatAlreadyPurchased => StatusCode::BAD_REQUEST,
            Self::ConcurrentModification => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ReservationError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
            "An error occurred".to_string()
        } else {
            tracing::warn!(kind = ?self.kind(), "request rejected: {}", self);
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ReservationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorruptRecord;

    #[test]
    fn kinds_follow_error_taxonomy() {
        assert_eq!(ReservationError::CinemaNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ReservationError::InvalidSeatNumber.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ReservationError::NoConsecutiveSeats.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ReservationError::SeatAlreadyPurchased.kind(), ErrorKind::Conflict);

        let corrupt = StoreError::Corrupt(CorruptRecord { id: 1, reason: "bad".into() });
        assert_eq!(ReservationError::from(corrupt).kind(), ErrorKind::Internal);
    }

    #[test]
    fn status_codes_match_http_surface() {
        assert_eq!(ReservationError::CinemaNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ReservationError::InvalidSeatNumber.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ReservationError::SeatAlreadyPurchased.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ReservationError::NoConsecutiveSeats.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ReservationError::ConcurrentModification.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ReservationError::from(StoreError::Corrupt(CorruptRecord {
            id: 3,
            reason: "seat 9 outside 1..=3".into(),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
