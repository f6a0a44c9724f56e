use redis::AsyncCommands;
use tracing::warn;

use crate::redis_client::RedisClient;

/// Redis-backed read cache for the browse endpoints. Cache failures are
/// logged and treated as misses; the database stays the source of truth.
#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    ttl_secs: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    fn seats_key(show_id: i64) -> String {
        format!("seats:{}", show_id)
    }

    fn browse_version_key(movie_id: i64) -> String {
        format!("browse_ver:{}", movie_id)
    }

    /// Browse entries are keyed under a per-movie version. Bumping the
    /// version on booking orphans every cached listing for that movie at
    /// once; the old entries simply age out via TTL.
    pub fn browse_key(movie_id: i64, version: u64, city: &str, date: &str) -> String {
        format!(
            "browse:shows:v{}:m={}&c={}&d={}",
            version,
            movie_id,
            city.to_lowercase(),
            date
        )
    }

    pub async fn browse_version(&self, movie_id: i64) -> u64 {
        let mut conn = self.redis.conn.clone();
        match conn
            .get::<_, Option<u64>>(Self::browse_version_key(movie_id))
            .await
        {
            Ok(version) => version.unwrap_or(0),
            Err(e) => {
                warn!("browse version read failed for movie {}: {:?}", movie_id, e);
                0
            }
        }
    }

    pub async fn get_cached(&self, key: &str) -> Option<String> {
        let mut conn = self.redis.conn.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("cache read failed for {}: {:?}", key, e);
                None
            }
        }
    }

    pub async fn put_cached(&self, key: &str, json: &str) {
        let mut conn = self.redis.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, self.ttl_secs).await {
            warn!("cache write failed for {}: {:?}", key, e);
        }
    }

    pub async fn get_seats(&self, show_id: i64) -> Option<String> {
        self.get_cached(&Self::seats_key(show_id)).await
    }

    pub async fn put_seats(&self, show_id: i64, json: &str) {
        self.put_cached(&Self::seats_key(show_id), json).await
    }

    /// Drop the cached seat listing and orphan the movie's browse entries
    /// after a booking mutated seat state.
    pub async fn invalidate_show(&self, show_id: i64, movie_id: i64) {
        let mut conn = self.redis.conn.clone();
        if let Err(e) = conn.del::<_, ()>(Self::seats_key(show_id)).await {
            warn!("cache invalidation failed for show {}: {:?}", show_id, e);
        }
        if let Err(e) = conn
            .incr::<_, _, i64>(Self::browse_version_key(movie_id), 1)
            .await
        {
            warn!(
                "browse version bump failed for movie {}: {:?}",
                movie_id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_key_changes_with_the_version() {
        let before = CacheService::browse_key(3, 0, "Mumbai", "2026-08-29");
        let after = CacheService::browse_key(3, 1, "Mumbai", "2026-08-29");
        assert_ne!(before, after);
        assert!(before.starts_with("browse:shows:v0:"));
        assert!(after.starts_with("browse:shows:v1:"));
    }

    #[test]
    fn browse_key_normalizes_city_case() {
        assert_eq!(
            CacheService::browse_key(3, 2, "MUMBAI", "2026-08-29"),
            CacheService::browse_key(3, 2, "mumbai", "2026-08-29"),
        );
    }

    #[test]
    fn browse_keys_separate_movies_and_dates() {
        let a = CacheService::browse_key(3, 0, "Delhi", "2026-08-29");
        let b = CacheService::browse_key(4, 0, "Delhi", "2026-08-29");
        let c = CacheService::browse_key(3, 0, "Delhi", "2026-08-30");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
