use crate::cache::CacheService;
use crate::models::{Cinema, CinemaId};
use redis::{AsyncCommands, RedisResult, Script};
use tracing::{debug, warn};

// KEYS[1] = ключ, ARGV = json, version, ttl; не перезаписывает более новый снимок
const STORE_IF_NEWER: &str = r#"
local current = redis.call('GET', KEYS[1])
if current then
    local ok, decoded = pcall(cjson.decode, current)
    if ok and type(decoded) == 'table' and tonumber(decoded['version']) then
        if tonumber(decoded['version']) >= tonumber(ARGV[2]) then
            return 0
        end
    end
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
return 1
"#;

fn cinema_key(id: CinemaId) -> String {
    format!("cinema:{}", id)
}

impl CacheService {
    // Снимок кинозала из кеша; ошибки Redis считаем промахом
    pub async fn get_cinema(&self, id: CinemaId) -> Option<Cinema> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();

        let data: Option<String> = match conn.get(cinema_key(id)).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to read cinema {} from cache: {:?}", id, e);
                return None;
            }
        };

        match serde_json::from_str(&data?) {
            Ok(cinema) => {
                debug!("Cache hit for cinema {}", id);
                Some(cinema)
            }
            Err(e) => {
                warn!("Dropping unreadable cache entry for cinema {}: {:?}", id, e);
                self.invalidate_cinema(id).await;
                None
            }
        }
    }

    /// Stores a snapshot unless the cache already holds the same or a later version.
    pub async fn cache_cinema(&self, cinema: &Cinema) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };

        let data = match serde_json::to_string(cinema) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize cinema {}: {:?}", cinema.id(), e);
                return;
            }
        };

        let mut conn = redis.conn.clone();
        let script = Script::new(STORE_IF_NEWER);
        let result: RedisResult<i32> = script
            .key(cinema_key(cinema.id()))
            .arg(data)
            .arg(cinema.version())
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await;

        match result {
            Ok(1) => debug!("Cached cinema {} at version {}", cinema.id(), cinema.version()),
            Ok(_) => debug!("Kept newer cached snapshot of cinema {}", cinema.id()),
            Err(e) => warn!("Failed to cache cinema {}: {:?}", cinema.id(), e),
        }
    }

    // Удалить запись из кеша
    pub async fn invalidate_cinema(&self, id: CinemaId) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };

        let mut conn = redis.conn.clone();
        let result: Result<(), _> = conn.del(cinema_key(id)).await;
        match result {
            Ok(()) => debug!("Invalidated cache for cinema {}", id),
            Err(e) => warn!("Failed to invalidate cinema {}: {:?}", id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatCount;
    use chrono::Utc;

    #[test]
    fn keys_are_namespaced_by_id() {
        assert_eq!(cinema_key(17), "cinema:17");
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = CacheService::disabled();
        let cinema = Cinema::new(1, SeatCount::new(4).unwrap(), Utc::now());

        cache.cache_cinema(&cinema).await;
        assert!(cache.get_cinema(1).await.is_none());
        cache.invalidate_cinema(1).await;
        assert!(!cache.is_enabled());
    }

    // Нужен живой Redis: без REDIS_URL тест ничего не проверяет
    #[tokio::test]
    async fn older_snapshot_never_replaces_newer_one() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };
        let redis = crate::redis_client::RedisClient::connect(&url).await.unwrap();
        let cache = CacheService::new(redis, 30);

        let id = Utc::now().timestamp_micros();
        let stale = Cinema::new(id, SeatCount::new(4).unwrap(), Utc::now());
        let mut fresh = stale.clone();
        fresh.purchase(2).unwrap();
        fresh.advance_version();

        // покупка успела закешировать свой снимок раньше, чем медленное чтение
        cache.cache_cinema(&fresh).await;
        cache.cache_cinema(&stale).await;
        assert_eq!(cache.get_cinema(id).await, Some(fresh.clone()));

        let mut newer = fresh.clone();
        newer.purchase(3).unwrap();
        newer.advance_version();
        cache.cache_cinema(&newer).await;
        assert_eq!(cache.get_cinema(id).await, Some(newer));

        cache.invalidate_cinema(id).await;
    }
}
