use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::model::user::UserProfile;
use crate::store::{StoreResult, UserDirectory};

/// Read-through TTL cache in front of a [`UserDirectory`].
///
/// Only hits are cached; a missing user is looked up again next time.
pub struct CachedUserDirectory {
    inner: Arc<dyn UserDirectory>,
    cache: Cache<u64, UserProfile>,
}

impl CachedUserDirectory {
    pub fn new(inner: Arc<dyn UserDirectory>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl UserDirectory for CachedUserDirectory {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<UserProfile>> {
        if let Some(profile) = self.cache.get(&user_id).await {
            return Ok(Some(profile));
        }

        let found = self.inner.find_user(user_id).await?;
        if let Some(profile) = &found {
            self.cache.insert(user_id, profile.clone()).await;
        }
        Ok(found)
    }
}
