//! Per-call match state.

use rustc_hash::FxHashMap;

use super::touched::TouchedRules;
use crate::expr::NodeId;
use crate::rules::RuleId;

/// Transient state of one match call: leaf hit counters, operator codes
/// that differ from their baseline, and the rules any hit reached.
///
/// Each concurrent match call needs its own accumulator. One accumulator can
/// be reused across sequential calls; every call starts by clearing it.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    hits: FxHashMap<NodeId, u32>,
    codes: FxHashMap<NodeId, u8>,
    touched: TouchedRules,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self, rule_count: usize) {
        self.hits.clear();
        self.codes.clear();
        self.touched.reset(rule_count);
    }

    /// Occurrences of `leaf`'s operand counted by the last call.
    #[inline]
    pub fn hits(&self, leaf: NodeId) -> u32 {
        self.hits.get(&leaf).copied().unwrap_or(0)
    }

    /// Current code of an operator node, given its baseline.
    #[inline]
    pub(crate) fn code(&self, node: NodeId, baseline: u8) -> u8 {
        self.codes.get(&node).copied().unwrap_or(baseline)
    }

    #[inline]
    pub(crate) fn set_code(&mut self, node: NodeId, code: u8) {
        self.codes.insert(node, code);
    }

    /// Count a hit. Returns true on the first hit of `leaf` in this call.
    #[inline]
    pub(crate) fn record_hit(&mut self, leaf: NodeId, rule: RuleId) -> bool {
        let count = self.hits.entry(leaf).or_insert(0);
        *count = count.saturating_add(1);
        if *count > 1 {
            return false;
        }
        self.touched.insert(rule);
        true
    }

    /// Rules reached by at least one hit, in first-touch order.
    pub fn touched_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.touched.iter()
    }

    #[inline]
    pub(crate) fn was_touched(&self, rule: RuleId) -> bool {
        self.touched.contains(rule)
    }
}
