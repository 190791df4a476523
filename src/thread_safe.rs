//! Thread-safe rule matcher.
//!
//! Registration is serialized through a mutex guarding the writer's copy of
//! the matcher; each successful registration publishes a new immutable
//! snapshot. Matching loads the current snapshot and never takes the lock.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::error::{MatchError, RuleError};
use crate::{Accumulator, Config, RuleId, RuleMatcher};

/// A [`RuleMatcher`] that can be registered into and matched against from
/// many threads at once.
///
/// Matches already in flight keep using the snapshot they loaded; rules
/// registered meanwhile apply to later calls.
pub struct SharedRuleMatcher {
    /// The published snapshot - atomically swappable, lock-free reads
    current: ArcSwap<RuleMatcher>,
    /// Writer's copy, mutated under the lock and then published
    writer: Mutex<RuleMatcher>,
}

impl Default for SharedRuleMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedRuleMatcher {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::from_matcher(RuleMatcher::with_config(config))
    }

    /// Publish an already built matcher.
    pub fn from_matcher(matcher: RuleMatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(matcher.clone()),
            writer: Mutex::new(matcher),
        }
    }

    /// Register a rule and publish the result.
    ///
    /// Serialized with other registrations; a rejected rule publishes nothing.
    /// Every accepted rule recompiles the automaton and publishes a full copy
    /// of the matcher, so loading rules one at a time is quadratic. Load
    /// batches with [`register_rules`](Self::register_rules).
    pub fn register_rule(&self, rule: &str) -> Result<RuleId, RuleError> {
        let mut writer = self.writer.lock();
        let id = writer.register_rule(rule)?;
        self.current.store(Arc::new(writer.clone()));
        Ok(id)
    }

    /// Register many rules and publish once. Returns how many were accepted.
    pub fn register_rules<I, S>(&self, rules: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut writer = self.writer.lock();
        let accepted = writer.register_rules(rules);
        if accepted > 0 {
            self.current.store(Arc::new(writer.clone()));
        }
        accepted
    }

    /// Match against the current snapshot.
    ///
    /// This method is lock-free and can be called concurrently from multiple threads.
    pub fn match_text(&self, text: impl AsRef<[u8]>) -> Result<Vec<Arc<str>>, MatchError> {
        let snapshot = self.current.load();
        let mut acc = Accumulator::new();
        let ids = snapshot.match_ids(text.as_ref(), &mut acc)?;
        Ok(ids
            .into_iter()
            .map(|id| snapshot.rule(id).shared_text().clone())
            .collect())
    }

    pub fn is_match(&self, text: impl AsRef<[u8]>) -> Result<bool, MatchError> {
        Ok(!self.match_text(text)?.is_empty())
    }

    /// The currently published matcher.
    pub fn snapshot(&self) -> Arc<RuleMatcher> {
        self.current.load_full()
    }

    /// Number of rules in the published snapshot.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
