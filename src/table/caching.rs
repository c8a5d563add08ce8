//! Caching decorator for tables

use bytes::Bytes;

use crate::cache::BoundedCache;
use crate::error::Result;

use super::Table;

/// Wraps any [`Table`] and serves repeated reads from a [`BoundedCache`]
///
/// - `read`: cache first; a miss found in storage populates the cache
/// - `write`: storage first, then the cache is refreshed
/// - `delete`: the cached entry is dropped whatever the outcome
pub struct CachingTable<T> {
    inner: T,
    cache: BoundedCache,
}

impl<T: Table> CachingTable<T> {
    pub fn new(inner: T, capacity: usize) -> Self {
        Self {
            inner,
            cache: BoundedCache::new(capacity),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn cache(&self) -> &BoundedCache {
        &self.cache
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Table> Table for CachingTable<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.inner.write(key, value)?;
        self.cache.set(key, Bytes::copy_from_slice(value));
        Ok(())
    }

    fn read(&mut self, key: &str) -> Result<Option<Bytes>> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value));
        }

        let value = self.inner.read(key)?;
        if let Some(value) = &value {
            self.cache.set(key, value.clone());
        }
        Ok(value)
    }

    fn delete(&mut self, key: &str) -> Result<Bytes> {
        let result = self.inner.delete(key);
        self.cache.remove(key);
        result
    }
}
