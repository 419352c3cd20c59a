use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::session::now_secs;

/// In-flight authorization started by `GET /auth`, keyed by its CSRF state
#[derive(Clone, Debug)]
pub struct PendingAuthorization {
    /// PKCE verifier matching the challenge sent to the provider
    pub pkce_verifier: String,

    /// Creation timestamp (Unix timestamp)
    pub created_at: u64,
}

impl PendingAuthorization {
    pub fn is_expired(&self, timeout_seconds: u64, now: u64) -> bool {
        now.saturating_sub(self.created_at) > timeout_seconds
    }
}

/// Authorization states awaiting their callback.
///
/// Each state is handed out once and can be taken back at most once.
/// At most `max_entries` states are held at a time.
pub struct PendingAuthorizations {
    entries: RwLock<HashMap<String, PendingAuthorization>>,
    timeout_seconds: u64,
    max_entries: usize,
}

impl PendingAuthorizations {
    pub fn new(timeout_seconds: u64, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            timeout_seconds,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new state, dropping any entries that already timed out and,
    /// when full, the oldest remaining ones
    pub async fn insert(&self, state: String, pending: PendingAuthorization) {
        let now = now_secs();
        let timeout = self.timeout_seconds;
        let mut entries = self.entries.write().await;
        entries.retain(|_, p| !p.is_expired(timeout, now));

        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, p)| p.created_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!("Pending authorization limit reached, evicting oldest state");
                    entries.remove(&key);
                }
                None => break,
            }
        }

        entries.insert(state, pending);
    }

    /// Consume a state. Unknown, already used and timed out states yield `None`.
    pub async fn take(&self, state: &str) -> Option<PendingAuthorization> {
        let pending = self.entries.write().await.remove(state)?;
        if pending.is_expired(self.timeout_seconds, now_secs()) {
            tracing::debug!("Authorization state timed out before callback");
            return None;
        }
        Some(pending)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(created_at: u64) -> PendingAuthorization {
        PendingAuthorization {
            pkce_verifier: "verifier".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_state_is_consumed_once() {
        let store = PendingAuthorizations::new(600, 100);
        store.insert("abc".to_string(), pending(now_secs())).await;

        let first = store.take("abc").await;
        assert_eq!(first.unwrap().pkce_verifier, "verifier");
        assert!(store.take("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_state_is_rejected() {
        let store = PendingAuthorizations::new(600, 100);
        store.insert("abc".to_string(), pending(now_secs())).await;
        assert!(store.take("xyz").await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_timed_out_state_is_rejected() {
        let store = PendingAuthorizations::new(600, 100);
        store.insert("old".to_string(), pending(now_secs() - 601)).await;
        assert!(store.take("old").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_prunes_timed_out_states() {
        let store = PendingAuthorizations::new(600, 100);
        store.insert("old".to_string(), pending(now_secs() - 1000)).await;
        store.insert("new".to_string(), pending(now_secs())).await;
        assert_eq!(store.len().await, 1);
        assert!(store.take("new").await.is_some());
    }

    #[tokio::test]
    async fn test_full_store_evicts_oldest_state() {
        let store = PendingAuthorizations::new(600, 2);
        let now = now_secs();
        store.insert("first".to_string(), pending(now - 20)).await;
        store.insert("second".to_string(), pending(now - 10)).await;
        store.insert("third".to_string(), pending(now)).await;

        assert_eq!(store.len().await, 2);
        assert!(store.take("first").await.is_none());
        assert!(store.take("second").await.is_some());
        assert!(store.take("third").await.is_some());
    }

    #[tokio::test]
    async fn test_many_authorizations_stay_bounded() {
        let store = PendingAuthorizations::new(600, 50);
        for i in 0..500 {
            store.insert(format!("state-{}", i), pending(now_secs())).await;
        }
        assert_eq!(store.len().await, 50);
    }
}
