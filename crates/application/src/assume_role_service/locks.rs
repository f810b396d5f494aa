use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

type IssuanceKey = (String, String);

/// Keyed async mutexes making check-issue-record exclusive per role and principal.
///
/// Idle entries are dropped on the next acquisition, so the map only holds keys
/// with a request in flight.
#[derive(Clone, Default)]
pub(super) struct IssuanceLocks {
    slots: Arc<Mutex<HashMap<IssuanceKey, Arc<Mutex<()>>>>>,
}

impl IssuanceLocks {
    pub(super) async fn acquire(&self, role_arn: &str, principal_arn: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry((role_arn.to_owned(), principal_arn.to_owned()))
                .or_default()
                .clone()
        };

        slot.lock_owned().await
    }

    #[cfg(test)]
    pub(super) async fn tracked_keys(&self) -> usize {
        self.slots.lock().await.len()
    }
}
