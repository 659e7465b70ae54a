use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::core::collaborators::ClinicInfoStore;
use crate::core::errors::StoreError;
use crate::models::ClinicInfo;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key of the single clinic record
    pub fn clinic_info() -> &'static str {
        "clinic_info"
    }
}

/// Time-bounded in-memory cache in front of a [`ClinicInfoStore`]
///
/// Placeholder records are never cached, so a clinic row added later is picked
/// up on the next request.
pub struct CachedClinicInfoStore {
    inner: Arc<dyn ClinicInfoStore>,
    cache: moka::future::Cache<&'static str, ClinicInfo>,
}

impl CachedClinicInfoStore {
    pub fn new(inner: Arc<dyn ClinicInfoStore>, ttl: Duration) -> Self {
        let cache = moka::future::CacheBuilder::new(1).time_to_live(ttl).build();
        Self { inner, cache }
    }

    /// Drop the cached record
    pub async fn invalidate(&self) {
        self.cache.invalidate(CacheKey::clinic_info()).await;
    }
}

#[async_trait]
impl ClinicInfoStore for CachedClinicInfoStore {
    async fn fetch_clinic_info(&self) -> Result<ClinicInfo, StoreError> {
        let key = CacheKey::clinic_info();

        if let Some(info) = self.cache.get(key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(info);
        }

        tracing::trace!("Cache miss: {}", key);
        let info = self.inner.fetch_clinic_info().await?;

        if !info.is_placeholder() {
            self.cache.insert(key, info.clone()).await;
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
        info: ClinicInfo,
    }

    #[async_trait]
    impl ClinicInfoStore for CountingStore {
        async fn fetch_clinic_info(&self) -> Result<ClinicInfo, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.info.clone())
        }
    }

    fn real_clinic() -> ClinicInfo {
        ClinicInfo {
            address: "123 Medical Center Drive".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            operating_hours: "9am-6pm".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let inner = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            info: real_clinic(),
        });
        let cached = CachedClinicInfoStore::new(inner.clone(), Duration::from_secs(60));

        let first = cached.fetch_clinic_info().await.unwrap();
        let second = cached.fetch_clinic_info().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let inner = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            info: real_clinic(),
        });
        let cached = CachedClinicInfoStore::new(inner.clone(), Duration::from_secs(60));

        cached.fetch_clinic_info().await.unwrap();
        cached.invalidate().await;
        cached.fetch_clinic_info().await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_placeholder_is_not_cached() {
        let inner = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            info: ClinicInfo::placeholder(),
        });
        let cached = CachedClinicInfoStore::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.fetch_clinic_info().await.unwrap().is_placeholder());
        cached.fetch_clinic_info().await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::clinic_info(), "clinic_info");
    }
}
