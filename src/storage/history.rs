use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use super::models::HistoryEntry;

/// Append-only log of dispatcher runs, keyed by sequence number so that
/// runs finishing in the same instant never overwrite one another.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: DashMap<u64, HistoryEntry>,
    next_sequence: AtomicU64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run that delivered to `recipients`
    pub fn append(&self, recipients: Vec<String>) -> HistoryEntry {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = HistoryEntry {
            recipients,
            sequence,
            timestamp: Utc::now(),
        };
        self.entries.insert(sequence, entry.clone());
        entry
    }

    /// All entries in chronological order
    pub fn all(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|e| e.sequence);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_assigns_increasing_sequence() {
        let log = HistoryLog::new();
        let first = log.append(vec!["Alice".to_string()]);
        let second = log.append(vec![]);

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_same_instant_entries_do_not_collide() {
        let log = HistoryLog::new();
        for _ in 0..100 {
            log.append(vec![]);
        }
        assert_eq!(log.len(), 100);
    }

    #[test]
    fn test_all_is_chronological() {
        let log = Arc::new(HistoryLog::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.append(vec![format!("{t}-{i}")]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sequences: Vec<u64> = log.all().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (1..=100).collect::<Vec<u64>>());
    }
}
