// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Redis-backed bit store.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BitStore, CacheStore, StoreError, StoreResult, MAX_BIT_OFFSET};

/// Bit store speaking `SETBIT`, `GETBIT` and `DEL` to a Redis server.
///
/// A single blocking connection is opened lazily and shared behind a mutex.
/// A dropped connection is discarded and reopened by the next command; the
/// failing command itself is not retried.
pub struct RedisBitStore {
    client: redis::Client,
    connection: Mutex<Option<redis::Connection>>,
}

impl RedisBitStore {
    /// Create a store for the given `redis://` URL.
    ///
    /// No connection is made until the first command.
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    fn with_connection<T>(
        &self,
        command: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.connection.lock();
        if guard.is_none() {
            let connection = self
                .client
                .get_connection()
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            *guard = Some(connection);
        }

        let Some(connection) = guard.as_mut() else {
            return Err(StoreError::Unavailable("no connection".to_string()));
        };

        command(connection).map_err(|e| {
            if e.is_connection_dropped() || e.is_io_error() {
                tracing::warn!(error = %e, "Dropping broken Redis connection");
                *guard = None;
            }
            StoreError::from(e)
        })
    }
}

impl fmt::Debug for RedisBitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBitStore")
            .field("addr", &self.client.get_connection_info().addr)
            .finish()
    }
}

impl BitStore for RedisBitStore {
    fn set_bit(&self, key: &str, index: u64, value: bool) -> StoreResult<()> {
        if index > MAX_BIT_OFFSET {
            return Err(StoreError::OffsetOutOfRange {
                key: key.to_string(),
                index,
            });
        }

        self.with_connection(|conn| {
            redis::cmd("SETBIT")
                .arg(key)
                .arg(index)
                .arg(i32::from(value))
                .query::<i32>(conn)
        })?;
        Ok(())
    }

    fn get_bit(&self, key: &str, index: u64) -> StoreResult<bool> {
        if index > MAX_BIT_OFFSET {
            return Err(StoreError::OffsetOutOfRange {
                key: key.to_string(),
                index,
            });
        }

        let bit = self.with_connection(|conn| {
            redis::cmd("GETBIT").arg(key).arg(index).query::<i32>(conn)
        })?;
        Ok(bit == 1)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.with_connection(|conn| redis::cmd("DEL").arg(key).query::<i64>(conn))?;
        Ok(())
    }
}

impl CacheStore for RedisBitStore {
    fn name(&self) -> &str {
        "redis"
    }

    fn bit_store(self: Arc<Self>) -> Option<Arc<dyn BitStore>> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_malformed_url() {
        assert!(RedisBitStore::open("not a url").is_err());
    }

    #[test]
    fn test_open_is_lazy() {
        // Nothing listens here, but opening must not connect
        let store = RedisBitStore::open("redis://127.0.0.1:1/").unwrap();
        assert_eq!(store.name(), "redis");
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let store = RedisBitStore::open("redis://127.0.0.1:1/").unwrap();
        let err = store.get_bit("k", 0).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
