//! Viewport-aware selection of items to poll
//!
//! The view layer records which rows are on screen in a [`ViewportTracker`].
//! The metric cadences use [`select_priority`] to restrict polling to those
//! rows, falling back to every item while the viewport is not yet known.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Pick the identifiers to poll
///
/// Returns `all_ids` unchanged when fewer than `minimum_visible` ids are
/// visible, otherwise `all_ids` filtered to the visible ones in their original
/// order.
pub fn select_priority(
    all_ids: &[String],
    visible_ids: &HashSet<String>,
    minimum_visible: usize,
) -> Vec<String> {
    if visible_ids.len() < minimum_visible {
        return all_ids.to_vec();
    }
    all_ids
        .iter()
        .filter(|id| visible_ids.contains(*id))
        .cloned()
        .collect()
}

/// Shared set of identifiers currently on screen
#[derive(Clone, Default, Debug)]
pub struct ViewportTracker {
    visible: Arc<RwLock<HashSet<String>>>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible set
    pub fn set_visible<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        if let Ok(mut visible) = self.visible.write() {
            *visible = ids;
        }
    }

    pub fn clear(&self) {
        if let Ok(mut visible) = self.visible.write() {
            visible.clear();
        }
    }

    pub fn visible(&self) -> HashSet<String> {
        self.visible
            .read()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// [`select_priority`] against the current visible set
    pub fn select(&self, all_ids: &[String], minimum_visible: usize) -> Vec<String> {
        match self.visible.read() {
            Ok(visible) => select_priority(all_ids, &visible, minimum_visible),
            Err(_) => all_ids.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_few_visible_falls_back_to_all() {
        let all = ids(&["a", "b", "c", "d", "e"]);
        assert_eq!(select_priority(&all, &set(&["b", "d"]), 3), all);
    }

    #[test]
    fn test_visible_subset_keeps_order() {
        let all = ids(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            select_priority(&all, &set(&["d", "a", "c", "b"]), 3),
            ids(&["a", "b", "c", "d"])
        );
    }

    #[test]
    fn test_visible_ids_not_in_list_are_ignored() {
        let all = ids(&["a", "b"]);
        assert_eq!(
            select_priority(&all, &set(&["x", "y", "b"]), 3),
            ids(&["b"])
        );
    }

    #[test]
    fn test_tracker_select() {
        let tracker = ViewportTracker::new();
        let all = ids(&["a", "b", "c", "d"]);
        assert_eq!(tracker.select(&all, 3), all);

        tracker.set_visible(["b", "c", "d"]);
        assert_eq!(tracker.select(&all, 3), ids(&["b", "c", "d"]));

        tracker.clear();
        assert!(tracker.visible().is_empty());
    }
}
