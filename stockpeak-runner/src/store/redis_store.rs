//! Redis key-value store.
//!
//! One `SET key value` per write on a fresh synchronous connection; a run
//! performs exactly one write, so no connection is kept between calls.

use tracing::debug;

use super::{KeyValueStore, StoreError};
use crate::config::RedisConfig;

pub struct RedisStore {
    client: redis::Client,
    url: String,
}

impl RedisStore {
    /// Bind connection parameters. Does not connect until the first write.
    pub fn new(config: &RedisConfig) -> Result<Self, StoreError> {
        let url = config.url();
        let client = redis::Client::open(url.as_str())?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl KeyValueStore for RedisStore {
    fn name(&self) -> &str {
        "redis"
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(url = %self.url, key, "connecting to redis");
        let mut conn = self.client.get_connection()?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query::<()>(&mut conn)?;
        Ok(())
    }
}
