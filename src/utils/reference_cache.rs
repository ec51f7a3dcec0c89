use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::SqlitePool;

use crate::model::project::ReferenceData;
use crate::utils::db_utils::fetch_reference_data;

const KEY: &str = "reference";

/// Projects and activities change rarely; keep one copy in memory between TTL expiries.
#[derive(Clone)]
pub struct ReferenceCache {
    inner: Cache<&'static str, Arc<ReferenceData>>,
}

impl ReferenceCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(ttl_secs.max(1)))
                .build(),
        }
    }

    pub async fn get(&self, pool: &SqlitePool) -> Result<Arc<ReferenceData>, sqlx::Error> {
        self.inner
            .try_get_with(KEY, async {
                tracing::debug!("Loading reference data");
                fetch_reference_data(pool).await.map(Arc::new)
            })
            .await
            .map_err(|e| match Arc::try_unwrap(e) {
                Ok(e) => e,
                Err(shared) => sqlx::Error::Protocol(shared.to_string()),
            })
    }

    pub async fn invalidate(&self) {
        self.inner.invalidate(KEY).await;
    }
}
