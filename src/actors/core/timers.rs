use std::collections::HashMap;
use std::hash::Hash;

// ============================================================================
// Timer Registry
// ============================================================================
//
// Tracks the handle of every pending deferred callback by key so it can be
// replaced, cancelled, or drained on shutdown. Generic over the handle type;
// the session stores actix `SpawnHandle`s in it.
//
// ============================================================================

#[derive(Debug)]
pub struct TimerRegistry<K, H> {
    pending: HashMap<K, H>,
}

impl<K: Eq + Hash, H: Copy> TimerRegistry<K, H> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Track `handle` under `key`; returns the handle it replaces, which the
    /// caller must cancel
    pub fn track(&mut self, key: K, handle: H) -> Option<H> {
        self.pending.insert(key, handle)
    }

    /// Stop tracking `key` (fired or cancelled)
    pub fn release(&mut self, key: &K) -> Option<H> {
        self.pending.remove(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove every pending handle
    pub fn drain(&mut self) -> Vec<H> {
        self.pending.drain().map(|(_, handle)| handle).collect()
    }
}

impl<K: Eq + Hash, H: Copy> Default for TimerRegistry<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_replaces_previous_handle() {
        let mut timers: TimerRegistry<&str, u32> = TimerRegistry::new();
        assert_eq!(timers.track("confirm", 1), None);
        assert_eq!(timers.track("confirm", 2), Some(1));
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_release_forgets_key() {
        let mut timers: TimerRegistry<&str, u32> = TimerRegistry::new();
        timers.track("cart:p1", 7);

        assert_eq!(timers.release(&"cart:p1"), Some(7));
        assert!(timers.is_empty());
        assert_eq!(timers.release(&"cart:p1"), None);
    }

    #[test]
    fn test_drain_returns_everything() {
        let mut timers: TimerRegistry<&str, u32> = TimerRegistry::new();
        timers.track("a", 1);
        timers.track("b", 2);

        let mut drained = timers.drain();
        drained.sort();

        assert_eq!(drained, vec![1, 2]);
        assert!(timers.is_empty());
    }
}
