//! Read-through cache of provider-manager assignments.
//!
//! Injected via `AppState` rather than living in a process-wide singleton,
//! so every test gets a fresh instance bound to its own pool. Entries
//! expire after a TTL; [`RoleCache::refresh`] forces a reload after an
//! assignment change.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use medq_core::types::DbId;
use medq_db::repositories::ProviderRepo;
use medq_db::DbPool;
use tokio::sync::RwLock;

/// Default entry lifetime.
const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct Entry {
    loaded_at: Instant,
    provider_ids: HashSet<DbId>,
}

pub struct RoleCache {
    pool: DbPool,
    ttl: Duration,
    entries: RwLock<HashMap<DbId, Entry>>,
}

impl RoleCache {
    pub fn new(pool: DbPool) -> Self {
        Self::with_ttl(pool, DEFAULT_TTL)
    }

    pub fn with_ttl(pool: DbPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `user_id` manages `provider_id`, loading from the database
    /// on a miss or an expired entry.
    pub async fn manages(&self, user_id: DbId, provider_id: DbId) -> Result<bool, sqlx::Error> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&user_id) {
                if entry.loaded_at.elapsed() < self.ttl {
                    return Ok(entry.provider_ids.contains(&provider_id));
                }
            }
        }

        let provider_ids = self.refresh(user_id).await?;
        Ok(provider_ids.contains(&provider_id))
    }

    /// Reload a user's assignments from the database.
    pub async fn refresh(&self, user_id: DbId) -> Result<HashSet<DbId>, sqlx::Error> {
        let provider_ids: HashSet<DbId> = ProviderRepo::managed_provider_ids(&self.pool, user_id)
            .await?
            .into_iter()
            .collect();

        let mut entries = self.entries.write().await;
        entries.insert(
            user_id,
            Entry {
                loaded_at: Instant::now(),
                provider_ids: provider_ids.clone(),
            },
        );
        Ok(provider_ids)
    }
}
