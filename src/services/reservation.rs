//! Seat reservation: create a cinema, buy one seat, buy the first free pair.
//!
//! Purchases are read-modify-write cycles against the [`CinemaStore`]. The
//! write is version-checked; when another request wrote the cinema first the
//! whole cycle (read, validate, write) runs again, so a seat sold in the
//! meantime is reported as already purchased instead of being sold twice.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    cache::CacheService,
    config::ReservationConfig,
    error::{ReservationError, Result},
    models::{Cinema, CinemaId, SeatCount},
    store::{CinemaStore, UpdateOutcome},
};

#[derive(Clone)]
pub struct SeatReservationService {
    store: Arc<dyn CinemaStore>,
    cache: CacheService,
    max_seats: u32,
    max_write_attempts: u32,
}

impl SeatReservationService {
    pub fn new(store: Arc<dyn CinemaStore>, cache: CacheService, config: &ReservationConfig) -> Self {
        Self {
            store,
            cache,
            max_seats: config.max_seats,
            max_write_attempts: config.max_write_attempts.max(1),
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    pub async fn create_cinema(&self, seats: i64) -> Result<CinemaId> {
        let seats = u32::try_from(seats)
            .ok()
            .filter(|&s| s <= self.max_seats)
            .and_then(SeatCount::new)
            .ok_or(ReservationError::InvalidSeatCount { max: self.max_seats })?;

        let cinema = self.store.insert(seats).await?;
        info!(cinema_id = cinema.id(), seats = seats.get(), "Cinema created");
        Ok(cinema.id())
    }

    /// Buys `raw_seat` in the given cinema and returns the seat number.
    ///
    /// Checks run in order: the cinema exists, the seat number is valid for
    /// it, the seat is still free.
    pub async fn purchase_seat(&self, cinema_id: CinemaId, raw_seat: &str) -> Result<u32> {
        let seat = self
            .modify(cinema_id, |cinema| {
                let seat = cinema.parse_seat_number(raw_seat)?;
                cinema.purchase(seat)?;
                Ok(seat)
            })
            .await?;

        info!(cinema_id, seat, "Seat purchased");
        Ok(seat)
    }

    pub async fn purchase_consecutive_seats(&self, cinema_id: CinemaId) -> Result<[u32; 2]> {
        let pair = self
            .modify(cinema_id, Cinema::purchase_consecutive_pair)
            .await?;

        info!(cinema_id, seats = ?pair, "Consecutive seats purchased");
        Ok(pair)
    }

    /// Current state of a cinema; served from the cache when possible.
    ///
    /// A snapshot read here never replaces a newer one that a purchase has
    /// already cached. If that purchase's cache write failed, the view can
    /// lag the store for at most `CACHE_TTL_SECONDS`.
    pub async fn get_cinema(&self, cinema_id: CinemaId) -> Result<Cinema> {
        if let Some(cinema) = self.cache.get_cinema(cinema_id).await {
            return Ok(cinema);
        }

        let cinema = self
            .store
            .find(cinema_id)
            .await?
            .ok_or(ReservationError::CinemaNotFound)?;

        self.cache.cache_cinema(&cinema).await;
        Ok(cinema)
    }

    async fn modify<T, F>(&self, cinema_id: CinemaId, mut mutate: F) -> Result<T>
    where
        F: FnMut(&mut Cinema) -> Result<T>,
    {
        for attempt in 1..=self.max_write_attempts {
            let mut cinema = self
                .store
                .find(cinema_id)
                .await?
                .ok_or(ReservationError::CinemaNotFound)?;

            let output = mutate(&mut cinema)?;

            match self.store.update(&cinema).await? {
                UpdateOutcome::Updated(saved) => {
                    self.cache.cache_cinema(&saved).await;
                    return Ok(output);
                }
                UpdateOutcome::Stale => {
                    warn!(cinema_id, attempt, "Stale write, retrying");
                }
            }
        }

        Err(ReservationError::ConcurrentModification)
    }
}
