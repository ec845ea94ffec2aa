//! Snapshot-based undo/redo.

use crate::shapes::Element;

/// Default maximum number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Linear history over whole-document snapshots.
///
/// Always holds at least one snapshot, and `index` always points at the
/// snapshot matching the current document.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: Vec<Vec<Element>>,
    index: usize,
    limit: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    /// Start with a single empty snapshot.
    pub fn new(limit: usize) -> Self {
        Self::with_initial(Vec::new(), limit)
    }

    /// Start from an existing document.
    pub fn with_initial(elements: Vec<Element>, limit: usize) -> Self {
        Self {
            snapshots: vec![elements],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot, dropping any redo entries.
    pub fn commit(&mut self, elements: &[Element]) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(elements.to_vec());
        self.index += 1;

        if self.snapshots.len() > self.limit {
            let excess = self.snapshots.len() - self.limit;
            self.snapshots.drain(..excess);
            self.index -= excess;
        }

        log::debug!("History commit: {} of {}", self.index + 1, self.snapshots.len());
    }

    /// Step back; returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<Vec<Element>> {
        if self.index == 0 {
            log::debug!("Nothing to undo");
            return None;
        }
        self.index -= 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Step forward; returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<Vec<Element>> {
        if self.index + 1 >= self.snapshots.len() {
            log::debug!("Nothing to redo");
            return None;
        }
        self.index += 1;
        Some(self.snapshots[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The snapshot at the current index.
    pub fn current(&self) -> &[Element] {
        &self.snapshots[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementKind, ElementStyle};

    fn doc(n: usize) -> Vec<Element> {
        (0..n)
            .map(|i| {
                Element::new(
                    ElementKind::Rectangle,
                    i as f64 * 10.0,
                    0.0,
                    10.0,
                    10.0,
                    ElementStyle::default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let history = HistoryManager::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(history.current().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_identity() {
        let mut history = HistoryManager::default();
        let state = doc(2);
        history.commit(&state);

        let undone = history.undo();
        assert_eq!(undone.as_deref(), Some(&[][..]));
        let redone = history.redo();
        assert_eq!(redone, Some(state));
    }

    #[test]
    fn test_noop_at_ends() {
        let mut history = HistoryManager::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        history.commit(&doc(1));
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut history = HistoryManager::default();
        history.commit(&doc(1));
        history.commit(&doc(2));
        history.commit(&doc(3));
        history.undo();
        history.undo();
        assert_eq!(history.index(), 1);

        history.commit(&doc(4));
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().len(), 4);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = HistoryManager::new(3);
        for n in 1..=5 {
            history.commit(&doc(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current().len(), 5);

        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().len(), 3);
    }
}
