//! Persistence for cinemas.
//!
//! The service only talks to a [`CinemaStore`], which is built once at
//! startup and handed to it; Postgres is the production backend and the
//! in-memory store backs local runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Cinema, CinemaId, CorruptRecord, SeatCount};

pub use memory::MemoryCinemaStore;
pub use postgres::PgCinemaStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Corrupt(#[from] CorruptRecord),
}

/// Result of a version-checked update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The write went through; carries the stored cinema with its new version.
    Updated(Cinema),
    /// Someone else wrote the cinema after it was read.
    Stale,
}

#[async_trait]
pub trait CinemaStore: Send + Sync {
    /// Inserts a cinema with no purchased seats and returns it with its new id.
    async fn insert(&self, seats: SeatCount) -> Result<Cinema, StoreError>;

    async fn find(&self, id: CinemaId) -> Result<Option<Cinema>, StoreError>;

    /// Persists `cinema.purchased_seats()` only if the stored version still
    /// equals `cinema.version()`.
    async fn update(&self, cinema: &Cinema) -> Result<UpdateOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
