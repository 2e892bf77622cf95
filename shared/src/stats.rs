use std::collections::HashMap;

use serde::Serialize;

use crate::marker::Owner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerCount {
    pub display_name: String,
    pub user_name: String,
    pub user_id: String,
    pub count: i64,
}

/// Per-owner marker counters plus a directory of known owners.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerStats {
    users: HashMap<String, Owner>,
    counts: HashMap<String, i64>,
}

impl OwnerStats {
    pub fn add_user(&mut self, owner: &Owner) {
        if owner.user_id.is_empty() {
            return;
        }
        if !self.users.contains_key(&owner.user_id) {
            self.users.insert(owner.user_id.clone(), owner.clone());
        }
    }

    /// Entries that drop to zero or below are removed.
    pub fn add_count(&mut self, user_id: &str, amount: i64) {
        if user_id.is_empty() {
            return;
        }
        let count = self.counts.entry(user_id.to_string()).or_insert(0);
        *count += amount;
        if *count <= 0 {
            self.counts.remove(user_id);
        }
    }

    pub fn reset_counts(&mut self) {
        self.counts.clear();
    }

    pub fn clear(&mut self) {
        self.users.clear();
        self.counts.clear();
    }

    pub fn count(&self, user_id: &str) -> i64 {
        self.counts.get(user_id).copied().unwrap_or(0)
    }

    pub fn owner_count(&self) -> usize {
        self.counts.len()
    }

    /// Owners by descending count. Ties fall back to user id so output is stable.
    pub fn ranked(&self) -> Vec<OwnerCount> {
        let mut out: Vec<OwnerCount> = self
            .counts
            .iter()
            .map(|(user_id, &count)| {
                let owner = self.users.get(user_id);
                OwnerCount {
                    display_name: owner.map(|o| o.display_name.clone()).unwrap_or_default(),
                    user_name: owner.map(|o| o.user_name.clone()).unwrap_or_default(),
                    user_id: user_id.clone(),
                    count,
                }
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.user_id.cmp(&b.user_id)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: &str, name: &str) -> Owner {
        Owner {
            display_name: format!("{name} Display"),
            user_name: name.to_string(),
            user_id: id.to_string(),
        }
    }

    #[test]
    fn ranked_sorts_by_descending_count() {
        let mut stats = OwnerStats::default();
        stats.add_user(&owner("a", "Ann"));
        stats.add_user(&owner("b", "Ben"));
        stats.add_count("a", 2);
        stats.add_count("b", 5);
        stats.add_count("a", 1);

        let ranked = stats.ranked();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_name, "Ben");
        assert_eq!(ranked[0].count, 5);
        assert_eq!(ranked[1].display_name, "Ann Display");
        assert_eq!(ranked[1].count, 3);
    }

    #[test]
    fn non_positive_counts_are_dropped() {
        let mut stats = OwnerStats::default();
        stats.add_count("a", 2);
        stats.add_count("a", -2);
        assert_eq!(stats.count("a"), 0);
        assert!(stats.ranked().is_empty());
    }

    #[test]
    fn empty_ids_are_ignored() {
        let mut stats = OwnerStats::default();
        stats.add_user(&owner("", "Ghost"));
        stats.add_count("", 4);
        assert_eq!(stats.owner_count(), 0);
    }

    #[test]
    fn reset_keeps_user_directory() {
        let mut stats = OwnerStats::default();
        stats.add_user(&owner("a", "Ann"));
        stats.add_count("a", 1);
        stats.reset_counts();
        assert!(stats.ranked().is_empty());
        stats.add_count("a", 1);
        assert_eq!(stats.ranked()[0].user_name, "Ann");
    }

    #[test]
    fn ties_break_on_user_id() {
        let mut stats = OwnerStats::default();
        stats.add_count("zed", 1);
        stats.add_count("amy", 1);
        let ids: Vec<_> = stats.ranked().into_iter().map(|c| c.user_id).collect();
        assert_eq!(ids, ["amy", "zed"]);
    }
}
