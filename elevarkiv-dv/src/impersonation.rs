//! Admin impersonation store
//!
//! Process-wide lookup of the impersonation target an administrator has
//! chosen, keyed by the admin's principal id with per-key TTL eviction.
//! This is advisory authorization context only, never a cache of roster
//! or access results.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::info;

use crate::access::Impersonation;

struct Entry {
    value: Impersonation,
    expires_at: Instant,
}

pub struct ImpersonationStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl ImpersonationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Choose an impersonation target for `principal_id`, replacing any
    /// previous choice and restarting its TTL
    pub async fn set(&self, principal_id: &str, impersonation: Impersonation) {
        info!(
            principal = %principal_id,
            target = %impersonation.target,
            "Setting impersonation target"
        );
        let mut entries = self.entries.write().await;
        entries.insert(
            principal_id.to_string(),
            Entry {
                value: impersonation,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Current target for `principal_id`, if one exists and has not expired.
    /// Expired entries are evicted on the way out.
    pub async fn get(&self, principal_id: &str) -> Option<Impersonation> {
        {
            let entries = self.entries.read().await;
            match entries.get(principal_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry existed but expired
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(principal_id) {
            if entry.expires_at <= Instant::now() {
                entries.remove(principal_id);
            }
        }
        None
    }

    pub async fn clear(&self, principal_id: &str) {
        info!(principal = %principal_id, "Clearing impersonation target");
        let mut entries = self.entries.write().await;
        entries.remove(principal_id);
    }
}
