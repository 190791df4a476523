//! Sparse set of rule ids with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! An id is present iff `sparse[id] < len && dense[sparse[id]] == id`, so
//! neither array needs zeroing between match calls.

use crate::rules::RuleId;

#[derive(Clone, Debug, Default)]
pub struct TouchedRules {
    len: usize,
    /// Ids in first-touch order.
    dense: Vec<RuleId>,
    /// Id -> position in `dense`.
    sparse: Vec<usize>,
}

impl TouchedRules {
    #[cfg(test)]
    pub fn new(capacity: usize) -> Self {
        let mut set = Self::default();
        set.reset(capacity);
        set
    }

    /// Empty the set and make room for ids below `capacity`.
    #[inline]
    pub fn reset(&mut self, capacity: usize) {
        self.len = 0;
        if self.sparse.len() < capacity {
            self.dense.resize(capacity, RuleId::new(0));
            self.sparse.resize(capacity, 0);
        }
    }

    /// Returns true if `id` was not already present.
    #[inline]
    pub fn insert(&mut self, id: RuleId) -> bool {
        if self.contains(id) {
            return false;
        }
        debug_assert!(self.len < self.dense.len(), "rule id beyond capacity");
        self.dense[self.len] = id;
        self.sparse[id.index()] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: RuleId) -> bool {
        let pos = self.sparse[id.index()];
        pos < self.len && self.dense[pos] == id
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut set = TouchedRules::new(10);
        assert!(set.is_empty());

        assert!(set.insert(RuleId::new(3)));
        assert!(set.insert(RuleId::new(7)));
        assert!(!set.insert(RuleId::new(3)));

        assert_eq!(set.len(), 2);
        assert!(set.contains(RuleId::new(7)));
        assert!(!set.contains(RuleId::new(0)));
    }

    #[test]
    fn test_first_touch_order() {
        let mut set = TouchedRules::new(10);
        for i in [5, 2, 8, 1] {
            set.insert(RuleId::new(i));
        }
        let items: Vec<_> = set.iter().map(RuleId::index).collect();
        assert_eq!(items, vec![5, 2, 8, 1]);
    }

    #[test]
    fn test_reset_clears_and_grows() {
        let mut set = TouchedRules::new(2);
        set.insert(RuleId::new(1));

        set.reset(20);
        assert!(set.is_empty());
        assert!(!set.contains(RuleId::new(1)));

        assert!(set.insert(RuleId::new(15)));
        assert!(set.contains(RuleId::new(15)));
    }
}
