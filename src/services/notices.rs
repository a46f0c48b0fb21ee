//! One-time notices scoped to a browser session
//!
//! A notice is written by one request and consumed by the next page render of
//! the same session. `take_once` reads and clears in a single step so two
//! concurrent renders can never both display it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::Client;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

/// Slot holding the confirmation of the last deleted book
pub const LAST_DELETED_BOOK: &str = "last_deleted_book";

#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// Store `value` under `key` for `session`, replacing any previous value
    async fn set(&self, session: &str, key: &str, value: &str) -> AppResult<()>;

    /// Return the value under `key` and clear it
    async fn take_once(&self, session: &str, key: &str) -> AppResult<Option<String>>;
}

fn slot(session: &str, key: &str) -> String {
    format!("notice:{}:{}", session, key)
}

/// Redis-backed notices with expiration
#[derive(Clone)]
pub struct RedisNotices {
    client: Client,
    ttl_seconds: u64,
}

impl RedisNotices {
    /// Connect and verify the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl NoticeStore for RedisNotices {
    async fn set(&self, session: &str, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(slot(session, key))
            .arg(value)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store notice in Redis: {}", e)))
    }

    async fn take_once(&self, session: &str, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GETDEL")
            .arg(slot(session, key))
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to take notice from Redis: {}", e)))
    }
}

/// Process-local notices, for tests and single-instance deployments
pub struct MemoryNotices {
    ttl: Duration,
    slots: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryNotices {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_seconds),
            slots: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl NoticeStore for MemoryNotices {
    async fn set(&self, session: &str, key: &str, value: &str) -> AppResult<()> {
        let mut slots = self.slots.lock().await;
        let now = Instant::now();
        slots.retain(|_, (_, expires)| *expires > now);
        slots.insert(slot(session, key), (value.to_string(), now + self.ttl));
        Ok(())
    }

    async fn take_once(&self, session: &str, key: &str) -> AppResult<Option<String>> {
        let mut slots = self.slots.lock().await;
        Ok(slots
            .remove(&slot(session, key))
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value))
    }
}
