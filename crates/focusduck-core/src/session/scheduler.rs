use std::collections::BTreeMap;

/// Deadline-ordered timers keyed by kind. At most one entry per kind;
/// scheduling a kind again replaces the earlier deadline.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    entries: BTreeMap<(u64, u64), K>,
    seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            seq: 0,
        }
    }
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, key: K) {
        self.cancel(key);
        self.seq += 1;
        self.entries.insert((due_ms, self.seq), key);
    }

    /// Returns how many entries were removed.
    pub fn cancel(&mut self, key: K) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, k| *k != key);
        before - self.entries.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return the earliest timer if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, K)> {
        match self.next_due() {
            Some(due) if due <= now_ms => self.entries.pop_first().map(|((due, _), k)| (due, k)),
            _ => None,
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.values().any(|k| *k == key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
