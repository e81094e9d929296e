use crate::domain::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

const DEFAULT_SHARDS: usize = 16;

type Shard<T> = RwLock<HashMap<UserId, Arc<Mutex<T>>>>;

/// Sharded map of per-user state with one lock per user.
///
/// Shard locks are only held while an entry is looked up or inserted; the
/// returned per-user mutex is what callers hold while working. Tokio mutexes
/// queue waiters in FIFO order, so a user's requests are served in arrival order
/// while different users never wait on each other.
pub struct Registry<T> {
    shards: Vec<Shard<T>>,
}

impl<T: Default> Default for Registry<T> {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl<T: Default> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, user: UserId) -> &Shard<T> {
        let index = (user.unsigned_abs() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Returns the user's slot, creating a default entry on first use.
    pub async fn slot(&self, user: UserId) -> Arc<Mutex<T>> {
        if let Some(slot) = self.get(user).await {
            return slot;
        }
        let mut shard = self.shard(user).write().await;
        shard.entry(user).or_default().clone()
    }

    /// Returns the user's slot without creating one.
    pub async fn get(&self, user: UserId) -> Option<Arc<Mutex<T>>> {
        let shard = self.shard(user).read().await;
        shard.get(&user).cloned()
    }

    /// Locks the user's entry, creating it if needed.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<T> {
        self.slot(user).await.lock_owned().await
    }

    /// Number of users with an entry.
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.len();
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slot_is_created_once() {
        let registry: Registry<u32> = Registry::new();
        assert!(registry.get(1).await.is_none());

        *registry.lock(1).await += 5;
        *registry.lock(1).await += 5;

        assert_eq!(*registry.lock(1).await, 10);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_negative_ids_and_single_shard() {
        let registry: Registry<u32> = Registry::with_shards(0);
        *registry.lock(-42).await = 1;
        *registry.lock(42).await = 2;

        assert_eq!(*registry.lock(-42).await, 1);
        assert_eq!(*registry.lock(42).await, 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_users_do_not_block_each_other() {
        let registry: Registry<u32> = Registry::new();
        let held = registry.lock(1).await;

        // Another user's entry is reachable while user 1 is locked.
        let other = tokio::time::timeout(std::time::Duration::from_secs(1), registry.lock(2)).await;
        assert!(other.is_ok());
        drop(held);
    }

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let registry = Arc::new(Registry::<Vec<u32>>::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let mut entry = registry.lock(7).await;
                let len = entry.len();
                tokio::task::yield_now().await;
                entry.push(i);
                assert_eq!(entry.len(), len + 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.lock(7).await.len(), 50);
    }
}
