use crate::redis_client::RedisClient;

pub mod cinemas;

/// Read-cache in front of the cinema store.
///
/// Only the read view goes through it; purchases always read the store.
/// Without a Redis connection every lookup is a miss.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self {
            redis: Some(redis),
            ttl_seconds,
        }
    }

    pub fn disabled() -> Self {
        Self {
            redis: None,
            ttl_seconds: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }
}
