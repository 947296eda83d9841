//! The persistence collaborator. The engine only ever talks to this trait;
//! the in-memory implementation backs tests and the demo server.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::board::PuzzleId;
use crate::protocol::{ChatEntry, PuzzleSummary};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("puzzle {0} not found")]
    NotFound(PuzzleId),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A puzzle as stored: encoded grid plus the candidate side-channel.
#[derive(Debug, Clone)]
pub struct PuzzleRecord {
    pub title: String,
    pub difficulty: String,
    pub sdx: String,
    pub candidates: String,
}

pub trait PuzzleStore: Send + Sync {
    fn load_puzzle(&self, id: PuzzleId) -> Result<PuzzleRecord, StoreError>;
    fn load_solution(&self, id: PuzzleId) -> Result<String, StoreError>;
    fn save_puzzle(&self, id: PuzzleId, sdx: &str, candidates: &str) -> Result<(), StoreError>;
    fn load_chat(&self, id: PuzzleId) -> Result<Vec<ChatEntry>, StoreError>;
    fn append_chat(&self, id: PuzzleId, entry: ChatEntry) -> Result<(), StoreError>;
    /// Puzzle summaries, newest id first.
    fn list_puzzles(&self) -> Result<Vec<PuzzleSummary>, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredPuzzle {
    record: PuzzleRecord,
    solution: String,
    status: String,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    puzzles: HashMap<PuzzleId, StoredPuzzle>,
    chat: HashMap<PuzzleId, Vec<ChatEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_puzzle(
        &self,
        id: PuzzleId,
        title: &str,
        difficulty: &str,
        sdx: &str,
        solution: &str,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.puzzles.insert(
            id,
            StoredPuzzle {
                record: PuzzleRecord {
                    title: title.to_string(),
                    difficulty: difficulty.to_string(),
                    sdx: sdx.to_string(),
                    candidates: String::new(),
                },
                solution: solution.to_string(),
                status: "unsolved".to_string(),
            },
        );
    }
}

impl PuzzleStore for MemoryStore {
    fn load_puzzle(&self, id: PuzzleId) -> Result<PuzzleRecord, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .puzzles
            .get(&id)
            .map(|p| p.record.clone())
            .ok_or(StoreError::NotFound(id))
    }

    fn load_solution(&self, id: PuzzleId) -> Result<String, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .puzzles
            .get(&id)
            .map(|p| p.solution.clone())
            .ok_or(StoreError::NotFound(id))
    }

    fn save_puzzle(&self, id: PuzzleId, sdx: &str, candidates: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let puzzle = inner.puzzles.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        puzzle.record.sdx = sdx.to_string();
        puzzle.record.candidates = candidates.to_string();
        Ok(())
    }

    fn load_chat(&self, id: PuzzleId) -> Result<Vec<ChatEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.chat.get(&id).cloned().unwrap_or_default())
    }

    fn append_chat(&self, id: PuzzleId, entry: ChatEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.chat.entry(id).or_default().push(entry);
        Ok(())
    }

    fn list_puzzles(&self) -> Result<Vec<PuzzleSummary>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut summaries: Vec<PuzzleSummary> = inner
            .puzzles
            .iter()
            .map(|(&id, p)| PuzzleSummary {
                id,
                title: p.record.title.clone(),
                difficulty: p.record.difficulty.clone(),
                status: p.status.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_reload() {
        let store = MemoryStore::new();
        store.insert_puzzle(1, "First", "easy", "sdx-old", "solution");

        store.save_puzzle(1, "sdx-new", "0,0:1").unwrap();
        let record = store.load_puzzle(1).unwrap();
        assert_eq!(record.sdx, "sdx-new");
        assert_eq!(record.candidates, "0,0:1");
        assert_eq!(store.load_solution(1).unwrap(), "solution");
    }

    #[test]
    fn test_missing_puzzle() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.load_puzzle(42),
            Err(StoreError::NotFound(42))
        ));
        assert!(store.save_puzzle(42, "x", "").is_err());
    }

    #[test]
    fn test_chat_is_ordered() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .append_chat(
                    7,
                    ChatEntry {
                        user: "A".into(),
                        color: "#000000".into(),
                        text: format!("msg {i}"),
                        timestamp: i,
                    },
                )
                .unwrap();
        }

        let chat = store.load_chat(7).unwrap();
        assert_eq!(chat.len(), 3);
        assert_eq!(chat[2].text, "msg 2");
        assert!(store.load_chat(8).unwrap().is_empty());
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        store.insert_puzzle(1, "First", "easy", "a", "b");
        store.insert_puzzle(3, "Third", "hard", "a", "b");
        store.insert_puzzle(2, "Second", "medium", "a", "b");

        let ids: Vec<_> = store
            .list_puzzles()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
