use async_trait::async_trait;

use super::{CinemaStore, StoreError, UpdateOutcome};
use crate::database::Database;
use crate::models::{Cinema, CinemaId, CinemaRecord, SeatCount};

#[derive(Clone)]
pub struct PgCinemaStore {
    db: Database,
}

impl PgCinemaStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CinemaStore for PgCinemaStore {
    async fn insert(&self, seats: SeatCount) -> Result<Cinema, StoreError> {
        let record = sqlx::query_as::<_, CinemaRecord>(
            "INSERT INTO cinemas (seats)
             VALUES ($1)
             RETURNING id, seats, purchased_seats, version, created_at",
        )
        // SeatCount never exceeds SEAT_LIMIT
        .bind(seats.get() as i32)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(Cinema::try_from(record)?)
    }

    async fn find(&self, id: CinemaId) -> Result<Option<Cinema>, StoreError> {
        let record = sqlx::query_as::<_, CinemaRecord>(
            "SELECT id, seats, purchased_seats, version, created_at
             FROM cinemas
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        record.map(Cinema::try_from).transpose().map_err(StoreError::from)
    }

    async fn update(&self, cinema: &Cinema) -> Result<UpdateOutcome, StoreError> {
        let purchased: Vec<i32> = cinema.purchased_seats().iter().map(|&s| s as i32).collect();

        // если version уже другая, строка не обновится и вернётся None
        let record = sqlx::query_as::<_, CinemaRecord>(
            "UPDATE cinemas
             SET purchased_seats = $2, version = version + 1
             WHERE id = $1 AND version = $3
             RETURNING id, seats, purchased_seats, version, created_at",
        )
        .bind(cinema.id())
        .bind(purchased)
        .bind(cinema.version())
        .fetch_optional(&self.db.pool)
        .await?;

        match record {
            Some(record) => Ok(UpdateOutcome::Updated(Cinema::try_from(record)?)),
            None => Ok(UpdateOutcome::Stale),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db.pool).await?;
        Ok(())
    }
}
