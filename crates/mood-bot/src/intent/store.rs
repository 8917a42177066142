//! Per-user memory of the last selected category.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use crate::types::{Intent, UserId};

/// Storage for each user's last selectable intent.
///
/// Last write wins; callers never need compare-and-swap.
pub trait IntentStore: Send + Sync {
    /// Remember `intent` for `user`. Non-selectable intents are ignored.
    fn set(&self, user: UserId, intent: Intent);

    fn get(&self, user: UserId) -> Option<Intent>;
}

/// Process-local store bounded by an LRU policy so an unbounded number of
/// users cannot grow memory without limit.
pub struct InMemoryIntentStore {
    entries: Mutex<LruCache<UserId, Intent>>,
}

impl InMemoryIntentStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl IntentStore for InMemoryIntentStore {
    fn set(&self, user: UserId, intent: Intent) {
        if !intent.is_selectable() {
            tracing::debug!(user_id = %user, intent = %intent, "Ignoring non-selectable intent");
            return;
        }
        self.entries.lock().put(user, intent);
    }

    fn get(&self, user: UserId) -> Option<Intent> {
        self.entries.lock().get(&user).copied()
    }
}
