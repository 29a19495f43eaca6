//! Canonical member sets

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::uid::Uid;

/// A deduplicated set of [`Uid`]s with no ordering guarantee.
///
/// The fundamental exchange type between the resolver, the sync engine,
/// and every service client. Duplicates cannot exist by construction
/// because [`Uid`] normalization happens before insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet(BTreeSet<Uid>);

impl MemberSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw strings, dropping entries that normalize to
    /// nothing.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().filter_map(|s| Uid::new(s.as_ref())).collect()
    }

    pub fn insert(&mut self, uid: Uid) -> bool {
        self.0.insert(uid)
    }

    #[must_use]
    pub fn contains(&self, uid: &Uid) -> bool {
        self.0.contains(uid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uid> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other` (`self − other`).
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// Members present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Members present in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl FromIterator<Uid> for MemberSet {
    fn from_iter<I: IntoIterator<Item = Uid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MemberSet {
    type Item = Uid;
    type IntoIter = std::collections::btree_set::IntoIter<Uid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a Uid;
    type IntoIter = std::collections::btree_set::Iter<'a, Uid>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(uids: &[&str]) -> MemberSet {
        MemberSet::from_raw(uids.iter().copied())
    }

    #[test]
    fn from_raw_normalizes_and_dedupes() {
        let members = set(&["AUid", " auid", "buid", ""]);
        assert_eq!(members.len(), 2);
        assert!(members.contains(&Uid::new("auid").expect("uid")));
    }

    #[test]
    fn difference_excludes_shared_members() {
        let src = set(&["auid", "buid"]);
        let dest = set(&["buid", "cuid"]);

        let to_add = src.difference(&dest);
        assert_eq!(to_add, set(&["auid"]));
        // Diff correctness: to_add must be disjoint from dest.
        assert!(to_add.intersection(&dest).is_empty());
    }

    #[test]
    fn intersection_and_union() {
        let a = set(&["auid", "buid"]);
        let b = set(&["buid", "cuid"]);
        assert_eq!(a.intersection(&b), set(&["buid"]));
        assert_eq!(a.union(&b), set(&["auid", "buid", "cuid"]));
    }
}
