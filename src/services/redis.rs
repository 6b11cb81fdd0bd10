//! Redis service holding per-area calculation locks

use redis::{Client, Script};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Deletes the key only while it still holds our token
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Proof of holding an area lock, needed to release it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaLock {
    pub area_id: i32,
    token: String,
}

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    fn lock_key(area_id: i32) -> String {
        format!("pdre:calc-lock:{}", area_id)
    }

    /// Take the calculation lock of an area; `None` when another run holds it
    pub async fn try_lock_area(&self, area_id: i32, ttl_seconds: u64) -> AppResult<Option<AreaLock>> {
        let mut conn = self.get_connection().await?;

        let token = Uuid::new_v4().to_string();
        let acquired: Option<String> = redis::cmd("SET")
            .arg(Self::lock_key(area_id))
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to acquire calculation lock: {}", e)))?;

        Ok(acquired.map(|_| AreaLock { area_id, token }))
    }

    /// Release a lock; a lock that already expired or was taken over is left alone
    pub async fn release_area_lock(&self, lock: &AreaLock) -> AppResult<bool> {
        let mut conn = self.get_connection().await?;

        let script = Script::new(RELEASE_SCRIPT);
        let deleted: i32 = script
            .key(Self::lock_key(lock.area_id))
            .arg(&lock.token)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to release calculation lock: {}", e)))?;

        Ok(deleted == 1)
    }

    /// Round-trip used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a Redis connection (for advanced operations)
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}
