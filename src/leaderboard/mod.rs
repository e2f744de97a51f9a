//! Remote top-N leaderboard
//!
//! Scores are independent append-only records. Reads come back sorted
//! descending by score. Writes surface their errors to the caller (there is
//! no retry); the qualification check fails open so a flaky read never
//! costs a player their entry.

pub mod firestore;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TOP_N;
use crate::settings::StoreConfig;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// A score as written to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
    /// See [`timestamp_now`]
    pub timestamp: String,
}

/// A score read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Store-assigned identifier
    pub id: String,
    pub name: String,
    pub score: u64,
    pub timestamp: String,
}

/// Leaderboard read/write failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The request never produced a response
    Transport(String),
    /// The store answered with a non-success status
    Rejected { status: u16, message: String },
    /// The response could not be understood
    Decode(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Transport(msg) => write!(f, "leaderboard transport error: {}", msg),
            PersistenceError::Rejected { status, message } => {
                write!(f, "leaderboard rejected request ({}): {}", status, message)
            }
            PersistenceError::Decode(msg) => write!(f, "malformed leaderboard response: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Decode(e.to_string())
    }
}

/// Backing storage for scores
///
/// Single-threaded: futures are driven by the browser event loop (or
/// `pollster` natively) and never cross threads.
#[allow(async_fn_in_trait)]
pub trait LeaderboardStore {
    /// Append a record, returning the store-assigned id
    async fn append(&self, record: &ScoreRecord) -> Result<String, PersistenceError>;

    /// Up to `limit` entries, highest score first
    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError>;
}

/// Store picked at startup: remote when configured, local otherwise
#[derive(Debug)]
pub enum Backend {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

impl Backend {
    pub fn from_config(config: Option<StoreConfig>) -> Self {
        match config {
            Some(config) => {
                log::info!("Leaderboard: Firestore project {}", config.project_id);
                Backend::Firestore(FirestoreStore::new(config))
            }
            None => {
                log::info!("Leaderboard: in-memory");
                Backend::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Backend::Firestore(_))
    }
}

impl LeaderboardStore for Backend {
    async fn append(&self, record: &ScoreRecord) -> Result<String, PersistenceError> {
        match self {
            Backend::Firestore(store) => store.append(record).await,
            Backend::Memory(store) => store.append(record).await,
        }
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        match self {
            Backend::Firestore(store) => store.top(limit).await,
            Backend::Memory(store) => store.top(limit).await,
        }
    }
}

/// Score submission and top-N queries over a store
pub struct LeaderboardClient<S> {
    store: S,
}

impl<S: LeaderboardStore> LeaderboardClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a timestamped score. Errors are logged and returned.
    pub async fn submit_score(&self, player_name: &str, score: u64) -> Result<String, PersistenceError> {
        let record = ScoreRecord {
            name: player_name.to_string(),
            score,
            timestamp: timestamp_now(),
        };

        match self.store.append(&record).await {
            Ok(id) => {
                log::info!("Score saved with id {}", id);
                Ok(id)
            }
            Err(e) => {
                log::error!("Failed to save score: {}", e);
                Err(e)
            }
        }
    }

    /// Highest `top_n` scores, descending
    pub async fn fetch_top_scores(&self, top_n: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let mut entries = self.store.top(top_n).await.inspect_err(|e| {
            log::error!("Failed to fetch top scores: {}", e);
        })?;
        // Stable, so equal scores keep the store's order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(top_n);
        Ok(entries)
    }

    /// `fetch_top_scores` with the default depth
    pub async fn fetch_default_top(&self) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        self.fetch_top_scores(DEFAULT_TOP_N).await
    }

    /// Would `score` enter the top `top_n`?
    ///
    /// True while the board has free slots, otherwise only when it beats the
    /// lowest listed score. Read failures answer true.
    pub async fn is_qualified(&self, score: u64, top_n: usize) -> bool {
        // A zero-depth board has no lowest entry to beat; treated as a failed read
        if top_n == 0 {
            log::warn!("Qualification check with top_n = 0, allowing submission");
            return true;
        }
        match self.fetch_top_scores(top_n).await {
            Ok(entries) => qualifies(&entries, score, top_n),
            Err(e) => {
                log::error!("Qualification check failed, allowing submission: {}", e);
                true
            }
        }
    }

    /// 1-indexed rank `score` would take, `None` if it would not place
    pub async fn potential_rank(&self, score: u64, top_n: usize) -> Result<Option<usize>, PersistenceError> {
        let entries = self.fetch_top_scores(top_n).await?;
        if top_n == 0 || !qualifies(&entries, score, top_n) {
            return Ok(None);
        }
        let rank = entries.iter().position(|e| score > e.score);
        Ok(Some(rank.unwrap_or(entries.len()) + 1))
    }
}

/// Qualification rule over an already-sorted board
fn qualifies(entries: &[LeaderboardEntry], score: u64, top_n: usize) -> bool {
    if entries.len() < top_n {
        return true;
    }
    entries.last().is_some_and(|lowest| score > lowest.score)
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_unix_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_unix_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current time as ISO-8601 UTC, e.g. `2026-10-15T09:30:00.000Z`
#[cfg(target_arch = "wasm32")]
pub fn timestamp_now() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

/// Native builds only feed the in-memory board, so Unix milliseconds will do
#[cfg(not(target_arch = "wasm32"))]
pub fn timestamp_now() -> String {
    now_unix_ms().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: impl IntoIterator<Item = u64>) -> LeaderboardClient<MemoryStore> {
        let store = MemoryStore::new();
        for (i, score) in scores.into_iter().enumerate() {
            store.seed(format!("player{}", i), score);
        }
        LeaderboardClient::new(store)
    }

    #[test]
    fn test_full_board_requires_beating_lowest() {
        let client = board((1..=100).rev());
        assert!(!pollster::block_on(client.is_qualified(0, 100)));
        assert!(!pollster::block_on(client.is_qualified(1, 100)));
        assert!(pollster::block_on(client.is_qualified(2, 100)));
        assert!(pollster::block_on(client.is_qualified(50, 100)));
    }

    #[test]
    fn test_partial_board_always_qualifies() {
        let client = board([500, 400, 300, 200, 100]);
        assert!(pollster::block_on(client.is_qualified(0, 100)));
        assert!(pollster::block_on(client.is_qualified(1, 100)));
    }

    #[test]
    fn test_zero_depth_fails_open() {
        let client = board([]);
        assert!(pollster::block_on(client.is_qualified(10, 0)));
        let client = board([500, 400]);
        assert!(pollster::block_on(client.is_qualified(0, 0)));
    }

    #[test]
    fn test_qualification_fails_open() {
        let client = board((1..=100).rev());
        client.store().set_offline(true);
        assert!(pollster::block_on(client.is_qualified(0, 100)));
    }

    #[test]
    fn test_fetch_sorted_and_truncated() {
        let client = board([10, 70, 30, 90, 50]);
        let top = pollster::block_on(client.fetch_top_scores(3)).unwrap();
        let scores: Vec<u64> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![90, 70, 50]);
    }

    #[test]
    fn test_fetch_error_propagates() {
        let client = board([10]);
        client.store().set_offline(true);
        assert!(matches!(
            pollster::block_on(client.fetch_default_top()),
            Err(PersistenceError::Transport(_))
        ));
    }

    #[test]
    fn test_submit_then_read_back() {
        let client = board([]);
        let id = pollster::block_on(client.submit_score("Giulia", 120)).unwrap();
        let top = pollster::block_on(client.fetch_default_top()).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, id);
        assert_eq!(top[0].name, "Giulia");
        assert_eq!(top[0].score, 120);
        assert!(top[0].timestamp.parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn test_submit_error_surfaces() {
        let client = board([]);
        client.store().set_offline(true);
        assert!(pollster::block_on(client.submit_score("Luca", 5)).is_err());
    }

    #[test]
    fn test_potential_rank() {
        let client = board([300, 200, 100]);
        assert_eq!(pollster::block_on(client.potential_rank(250, 3)).unwrap(), Some(2));
        assert_eq!(pollster::block_on(client.potential_rank(50, 3)).unwrap(), None);
        assert_eq!(pollster::block_on(client.potential_rank(50, 4)).unwrap(), Some(4));
        assert_eq!(pollster::block_on(client.potential_rank(999, 3)).unwrap(), Some(1));
    }

    #[test]
    fn test_backend_selection() {
        assert!(!Backend::from_config(None).is_remote());
        let remote = Backend::from_config(Some(StoreConfig {
            api_key: "k".into(),
            project_id: "p".into(),
            app_id: "a".into(),
        }));
        assert!(remote.is_remote());
    }

    #[test]
    fn test_backend_delegates_to_memory() {
        let client = LeaderboardClient::new(Backend::from_config(None));
        pollster::block_on(client.submit_score("Ugo", 7)).unwrap();
        assert_eq!(pollster::block_on(client.fetch_top_scores(10)).unwrap()[0].score, 7);
    }
}
