pub mod config;
pub mod database;
pub mod redis_client;
pub mod models;
pub mod controllers;
pub mod middleware;
pub mod cache;
pub mod services;
pub mod store;
pub mod error;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use config::{Config, ReservationConfig, StorageBackend};
use store::CinemaStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CinemaStore>,
    pub reservations: services::SeatReservationService,
}

impl AppState {
    /// Connects the configured backends and wires the service on top of them.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn CinemaStore> = match (config.storage, &config.database) {
            (StorageBackend::Postgres, Some(db_config)) => {
                let db = database::Database::connect(db_config).await?;
                db.run_migrations().await?;
                Arc::new(store::PgCinemaStore::new(db))
            }
            (StorageBackend::Postgres, None) => {
                anyhow::bail!("postgres storage selected without database settings")
            }
            (StorageBackend::Memory, _) => {
                warn!("Using in-memory storage; cinemas are lost on restart");
                Arc::new(store::MemoryCinemaStore::new())
            }
        };

        let cache = match &config.redis.url {
            Some(url) => match redis_client::RedisClient::connect(url).await {
                Ok(redis) => cache::CacheService::new(redis, config.redis.cache_ttl_seconds),
                Err(e) => {
                    // без Redis сервис работает, просто без кеша
                    warn!("Redis unavailable, cinema cache disabled: {:?}", e);
                    cache::CacheService::disabled()
                }
            },
            None => {
                info!("REDIS_URL not set, cinema cache disabled");
                cache::CacheService::disabled()
            }
        };

        info!(cache_enabled = cache.is_enabled(), "Application state ready");
        Ok(Self::with_parts(&config.reservation, store, cache))
    }

    pub fn with_parts(
        reservation: &ReservationConfig,
        store: Arc<dyn CinemaStore>,
        cache: cache::CacheService,
    ) -> Arc<Self> {
        let reservations = services::SeatReservationService::new(store.clone(), cache, reservation);
        Arc::new(Self { store, reservations })
    }

    pub fn cache_enabled(&self) -> bool {
        self.reservations.cache_enabled()
    }
}

/// Full HTTP application: routes, state and the tower-http layers.
pub fn router(state: Arc<AppState>) -> Router {
    controllers::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
