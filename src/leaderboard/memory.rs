//! In-process leaderboard store
//!
//! Used when no remote store is configured, and by tests.

use std::cell::{Cell, RefCell};

use super::{LeaderboardEntry, LeaderboardStore, PersistenceError, ScoreRecord, timestamp_now};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<Vec<LeaderboardEntry>>,
    next_id: Cell<u64>,
    offline: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score directly, stamped now
    pub fn seed(&self, name: impl Into<String>, score: u64) -> String {
        self.push(ScoreRecord {
            name: name.into(),
            score,
            timestamp: timestamp_now(),
        })
    }

    /// Simulate an unreachable store
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn push(&self, record: ScoreRecord) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let id = format!("score-{}", n);
        self.entries.borrow_mut().push(LeaderboardEntry {
            id: id.clone(),
            name: record.name,
            score: record.score,
            timestamp: record.timestamp,
        });
        id
    }

    fn check_online(&self) -> Result<(), PersistenceError> {
        if self.offline.get() {
            return Err(PersistenceError::Transport("store offline".to_string()));
        }
        Ok(())
    }
}

impl LeaderboardStore for MemoryStore {
    async fn append(&self, record: &ScoreRecord) -> Result<String, PersistenceError> {
        self.check_online()?;
        Ok(self.push(record.clone()))
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        self.check_online()?;
        let mut entries = self.entries.borrow().clone();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let store = MemoryStore::new();
        let a = store.seed("a", 1);
        let b = store.seed("b", 1);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_top_orders_descending() {
        let store = MemoryStore::new();
        for score in [5, 50, 20] {
            store.seed("p", score);
        }
        let top = pollster::block_on(store.top(10)).unwrap();
        assert_eq!(top.iter().map(|e| e.score).collect::<Vec<_>>(), vec![50, 20, 5]);
    }

    #[test]
    fn test_offline_rejects_writes() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let record = ScoreRecord {
            name: "p".into(),
            score: 1,
            timestamp: "2026-10-15T09:30:00.000Z".into(),
        };
        assert!(pollster::block_on(store.append(&record)).is_err());
        assert!(store.is_empty());
    }
}
