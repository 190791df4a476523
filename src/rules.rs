//! Registered rules: identifier storage and deduplication.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::expr::NodeId;

/// Index of a rule, in registration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct RuleId(u32);

impl RuleId {
    /// Placeholder carried by nodes that are not yet in the arena.
    pub(crate) const PENDING: RuleId = RuleId(u32::MAX);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        RuleId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One accepted composite rule.
#[derive(Clone, Debug)]
pub struct Rule {
    text: Arc<str>,
    root: NodeId,
    vacuous: bool,
}

impl Rule {
    /// The full rule text, reported when the rule matches.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> &Arc<str> {
        &self.text
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True if the rule holds for a text in which none of its operands occur.
    pub fn is_vacuous(&self) -> bool {
        self.vacuous
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    by_text: FxHashMap<Arc<str>, RuleId>,
    vacuous: Vec<RuleId>,
}

impl RuleSet {
    pub fn contains(&self, text: &str) -> bool {
        self.by_text.contains_key(text)
    }

    pub fn id_of(&self, text: &str) -> Option<RuleId> {
        self.by_text.get(text).copied()
    }

    /// The id the next pushed rule will receive.
    pub fn next_id(&self) -> RuleId {
        RuleId::new(self.rules.len())
    }

    pub fn push(&mut self, text: &str, root: NodeId, vacuous: bool) -> RuleId {
        debug_assert!(!self.contains(text));
        let id = self.next_id();
        let text: Arc<str> = Arc::from(text);
        self.by_text.insert(text.clone(), id);
        self.rules.push(Rule {
            text,
            root,
            vacuous,
        });
        if vacuous {
            self.vacuous.push(id);
        }
        id
    }

    #[inline]
    pub fn get(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Rules that hold when untouched by a scan, in registration order.
    pub fn vacuous(&self) -> &[RuleId] {
        &self.vacuous
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_lookup() {
        let mut set = RuleSet::default();
        let a = set.push("cat & dog", NodeId::new(2), false);
        let b = set.push("spam !", NodeId::new(4), true);

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(set.contains("cat & dog"));
        assert!(!set.contains("cat"));
        assert_eq!(set.id_of("spam !"), Some(b));
        assert_eq!(set.get(a).text(), "cat & dog");
        assert_eq!(set.get(b).root(), NodeId::new(4));
        assert_eq!(set.vacuous(), &[b]);
        assert_eq!(set.len(), 2);
    }
}
