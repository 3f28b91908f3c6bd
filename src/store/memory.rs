use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CinemaStore, StoreError, UpdateOutcome};
use crate::models::{Cinema, CinemaId, SeatCount};

#[derive(Default)]
struct Inner {
    next_id: CinemaId,
    cinemas: HashMap<CinemaId, Cinema>,
}

/// Process-local store. Same version semantics as Postgres, nothing survives a restart.
#[derive(Default)]
pub struct MemoryCinemaStore {
    inner: RwLock<Inner>,
}

impl MemoryCinemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CinemaStore for MemoryCinemaStore {
    async fn insert(&self, seats: SeatCount) -> Result<Cinema, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let cinema = Cinema::new(inner.next_id, seats, Utc::now());
        inner.cinemas.insert(cinema.id(), cinema.clone());
        Ok(cinema)
    }

    async fn find(&self, id: CinemaId) -> Result<Option<Cinema>, StoreError> {
        Ok(self.inner.read().await.cinemas.get(&id).cloned())
    }

    async fn update(&self, cinema: &Cinema) -> Result<UpdateOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.cinemas.get_mut(&cinema.id()) else {
            return Ok(UpdateOutcome::Stale);
        };
        if stored.version() != cinema.version() {
            return Ok(UpdateOutcome::Stale);
        }

        let mut updated = cinema.clone();
        updated.advance_version();
        *stored = updated.clone();
        Ok(UpdateOutcome::Updated(updated))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
