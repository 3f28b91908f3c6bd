use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::error::ReservationError;

pub type CinemaId = i64;

/// Largest seat count a cinema can have: seat numbers are stored as Postgres INTEGER.
pub const SEAT_LIMIT: u32 = i32::MAX as u32;

/// Persisted shape of a cinema. Used as the Postgres row and as the cache payload.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaRecord {
    pub id: i64,
    pub seats: i32,
    pub purchased_seats: Vec<i32>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// A seat count already checked to be in `1..=SEAT_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeatCount(u32);

impl SeatCount {
    pub fn new(seats: u32) -> Option<Self> {
        (1..=SEAT_LIMIT).contains(&seats).then_some(Self(seats))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error)]
#[error("corrupt cinema record {id}: {reason}")]
pub struct CorruptRecord {
    pub id: CinemaId,
    pub reason: String,
}

/// A cinema and the seats sold in it.
///
/// Purchased seats are always unique and within `1..=seats`; every way of
/// building or mutating a `Cinema` goes through a check of that range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CinemaRecord", into = "CinemaRecord")]
pub struct Cinema {
    id: CinemaId,
    seats: u32,
    purchased_seats: BTreeSet<u32>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl Cinema {
    pub fn new(id: CinemaId, seats: SeatCount, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            seats: seats.get(),
            purchased_seats: BTreeSet::new(),
            version: 0,
            created_at,
        }
    }

    pub fn id(&self) -> CinemaId {
        self.id
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn purchased_seats(&self) -> &BTreeSet<u32> {
        &self.purchased_seats
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn free_seats(&self) -> u32 {
        // purchased_seats is bounded by seats
        self.seats - self.purchased_seats.len() as u32
    }

    pub fn is_fully_booked(&self) -> bool {
        self.free_seats() == 0
    }

    pub(crate) fn advance_version(&mut self) {
        self.version += 1;
    }

    /// Parses a raw seat number (as it arrives in a URL) and checks it is in `1..=seats`.
    ///
    /// Integral decimal forms like `"2.0"` or `" 3 "` are accepted; anything
    /// fractional, non-numeric or empty is not.
    pub fn parse_seat_number(&self, raw: &str) -> Result<u32, ReservationError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ReservationError::InvalidSeatNumber)?;

        if !value.is_finite() || value.fract() != 0.0 || value <= 0.0 || value > f64::from(self.seats) {
            return Err(ReservationError::InvalidSeatNumber);
        }

        Ok(value as u32)
    }

    /// Marks a single seat as purchased.
    pub fn purchase(&mut self, seat: u32) -> Result<(), ReservationError> {
        if seat == 0 || seat > self.seats {
            return Err(ReservationError::InvalidSeatNumber);
        }
        if !self.purchased_seats.insert(seat) {
            return Err(ReservationError::SeatAlreadyPurchased);
        }
        Ok(())
    }

    /// Lowest-numbered run of `N` adjacent free seats.
    ///
    /// Seats are scanned in increasing order and the run restarts at every
    /// purchased seat, so the first run to reach length `N` wins.
    pub fn first_free_run<const N: usize>(&self) -> Option<[u32; N]> {
        let mut run_start = 1;
        let mut run_len = 0;

        for seat in 1..=self.seats {
            if self.purchased_seats.contains(&seat) {
                run_len = 0;
                continue;
            }
            if run_len == 0 {
                run_start = seat;
            }
            run_len += 1;
            if run_len == N {
                return Some(std::array::from_fn(|i| run_start + i as u32));
            }
        }

        None
    }

    /// Buys the first two adjacent free seats.
    pub fn purchase_consecutive_pair(&mut self) -> Result<[u32; 2], ReservationError> {
        let pair = self
            .first_free_run::<2>()
            .ok_or(ReservationError::NoConsecutiveSeats)?;
        self.purchased_seats.extend(pair);
        Ok(pair)
    }
}

impl TryFrom<CinemaRecord> for Cinema {
    type Error = CorruptRecord;

    fn try_from(record: CinemaRecord) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| CorruptRecord { id: record.id, reason };

        let seats = u32::try_from(record.seats)
            .ok()
            .and_then(SeatCount::new)
            .ok_or_else(|| corrupt(format!("seat count {} is not positive", record.seats)))?
            .get();

        let mut purchased_seats = BTreeSet::new();
        for &seat in &record.purchased_seats {
            let in_range = u32::try_from(seat).ok().filter(|&s| s > 0 && s <= seats);
            let Some(seat) = in_range else {
                return Err(corrupt(format!("seat {seat} outside 1..={seats}")));
            };
            if !purchased_seats.insert(seat) {
                return Err(corrupt(format!("seat {seat} purchased twice")));
            }
        }

        Ok(Self {
            id: record.id,
            seats,
            purchased_seats,
            version: record.version,
            created_at: record.created_at,
        })
    }
}

impl From<Cinema> for CinemaRecord {
    fn from(cinema: Cinema) -> Self {
        Self {
            id: cinema.id,
            // seats and seat numbers never exceed SEAT_LIMIT
            seats: cinema.seats as i32,
            purchased_seats: cinema.purchased_seats.iter().map(|&s| s as i32).collect(),
            version: cinema.version,
            created_at: cinema.created_at,
        }
    }
}
