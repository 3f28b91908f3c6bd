use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client,
};
use tracing::info;

const CONNECT_RETRIES: usize = 2;

#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    /// Opens a self-reconnecting connection; Redis restarts don't take the cache down for good.
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        // при старте не ждём Redis долго: кеш необязателен
        let config = ConnectionManagerConfig::new().set_number_of_retries(CONNECT_RETRIES);
        let conn = ConnectionManager::new_with_config(client, config).await?;
        info!("Redis connected");
        Ok(RedisClient { conn })
    }
}
