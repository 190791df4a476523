//! Single-pass match engine.
//!
//! The text is split and fed through the automaton one codepoint at a time.
//! Each leaf reached on a transition is counted; on its first hit the leaf's
//! satisfaction is pushed up its tree:
//!
//! ```text
//! leaf hit ─► set slot bit in parent ─► parent's value changed? ─► set/clear
//!                                              │ no                slot bit in
//!                                              ▼                   grandparent …
//!                                             stop
//! ```
//!
//! Propagation stops at the first ancestor whose value does not change, so a
//! hit only costs as much as the part of the tree it actually flips. After the
//! scan, rules reached by a hit are decided from their root's code; rules no
//! hit reached keep their baseline value.

mod accumulator;
mod touched;

pub use accumulator::Accumulator;

use crate::automaton::{Automaton, StateId};
use crate::error::DecodeError;
use crate::expr::{ExprArena, Link, NodeId};
use crate::rules::{RuleId, RuleSet};
use crate::utf8::{Codepoints, Symbol};

/// Borrowed view of a compiled matcher, used for one scan.
pub(crate) struct Engine<'a> {
    pub automaton: &'a Automaton,
    pub arena: &'a ExprArena,
    pub rules: &'a RuleSet,
}

impl Engine<'_> {
    /// Scan `text` and return the matching rules in registration order.
    ///
    /// A malformed sequence anywhere in the text fails the whole call.
    pub fn run(
        &self,
        text: &[u8],
        stop_at_nul: bool,
        acc: &mut Accumulator,
    ) -> Result<Vec<RuleId>, DecodeError> {
        debug_assert!(self.automaton.is_compiled());
        acc.reset(self.rules.len());

        let mut state = StateId::ROOT;
        for span in Codepoints::new(text, stop_at_nul) {
            let sym = Symbol::from_bytes(span?.bytes(text));
            state = self.automaton.step(state, sym);
            for &leaf in self.automaton[state].outputs() {
                if acc.record_hit(leaf, self.arena[leaf].rule) {
                    self.propagate(leaf, acc);
                }
            }
        }

        let matched = self.collect(acc);
        log::trace!(
            "scanned {} bytes: {} rules touched, {} matched",
            text.len(),
            acc.touched_rules().count(),
            matched.len()
        );
        Ok(matched)
    }

    /// Push a leaf's first hit up its tree until some ancestor's value holds.
    fn propagate(&self, leaf: NodeId, acc: &mut Accumulator) {
        debug_assert!(self.arena[leaf].is_leaf());
        let Link::Child {
            mut parent,
            mut side,
        } = self.arena[leaf].link
        else {
            // a bare literal rule; its hit counter decides it
            return;
        };
        let mut satisfied = true;

        loop {
            let node = &self.arena[parent];
            let Some(op) = node.kind.op() else {
                unreachable!("leaf {:?} has a leaf parent", leaf);
            };

            let before = acc.code(parent, node.baseline());
            let after = side.apply(before, satisfied);
            if after == before {
                return;
            }
            acc.set_code(parent, after);

            let now = op.eval(after);
            if now == op.eval(before) {
                return;
            }
            match node.link {
                Link::Root => return,
                Link::Child { parent: up, side: up_side } => {
                    parent = up;
                    side = up_side;
                    satisfied = now;
                }
            }
        }
    }

    fn root_value(&self, rule: RuleId, acc: &Accumulator) -> bool {
        let root = self.rules.get(rule).root();
        let node = &self.arena[root];
        match node.kind.op() {
            Some(op) => op.eval(acc.code(root, node.baseline())),
            None => acc.hits(root) > 0,
        }
    }

    fn collect(&self, acc: &Accumulator) -> Vec<RuleId> {
        let mut matched: Vec<RuleId> = acc
            .touched_rules()
            .filter(|&rule| self.root_value(rule, acc))
            .collect();
        matched.extend(
            self.rules
                .vacuous()
                .iter()
                .copied()
                .filter(|&rule| !acc.was_touched(rule)),
        );
        matched.sort_unstable();
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse, LEFT, RIGHT};
    use crate::utf8::split;

    struct Fixture {
        automaton: Automaton,
        arena: ExprArena,
        rules: RuleSet,
    }

    impl Fixture {
        fn new(rules: &[&str]) -> Self {
            let mut fx = Fixture {
                automaton: Automaton::new(),
                arena: ExprArena::new(),
                rules: RuleSet::default(),
            };
            for rule in rules {
                let symbols = split(rule.as_bytes(), true).unwrap();
                let tree = parse(&symbols, true).unwrap();
                let ranges: Vec<_> = tree.operands.iter().map(|o| o.symbols.clone()).collect();
                let id = fx.rules.next_id();
                let (root, leaves) = fx.arena.insert_tree(tree, id);
                for (range, leaf) in ranges.into_iter().zip(leaves) {
                    fx.automaton.insert(&symbols[range], leaf);
                }
                let vacuous = fx.arena[root].baseline_value();
                fx.rules.push(rule, root, vacuous);
            }
            fx.automaton.compile();
            fx
        }

        fn engine(&self) -> Engine<'_> {
            Engine {
                automaton: &self.automaton,
                arena: &self.arena,
                rules: &self.rules,
            }
        }

        fn run(&self, text: &str, acc: &mut Accumulator) -> Vec<usize> {
            self.engine()
                .run(text.as_bytes(), true, acc)
                .unwrap()
                .into_iter()
                .map(RuleId::index)
                .collect()
        }
    }

    #[test]
    fn test_hit_counters() {
        let fx = Fixture::new(&["ab"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("ab ab xab", &mut acc), vec![0]);
        let leaf = fx.rules.get(RuleId::new(0)).root();
        assert_eq!(acc.hits(leaf), 3);
    }

    #[test]
    fn test_and_code_after_scan() {
        let fx = Fixture::new(&["cat & dog"]);
        let root = fx.rules.get(RuleId::new(0)).root();
        let mut acc = Accumulator::new();

        assert!(fx.run("a cat", &mut acc).is_empty());
        assert_eq!(acc.code(root, 0), LEFT);

        assert!(fx.run("a dog", &mut acc).is_empty());
        assert_eq!(acc.code(root, 0), RIGHT);

        assert_eq!(fx.run("dog and cat", &mut acc), vec![0]);
        assert_eq!(acc.code(root, 0), LEFT | RIGHT);
    }

    #[test]
    fn test_accumulator_is_reset_between_calls() {
        let fx = Fixture::new(&["cat & dog"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("cat dog", &mut acc), vec![0]);
        assert!(fx.run("cat", &mut acc).is_empty());
        assert_eq!(acc.touched_rules().count(), 1);
    }

    #[test]
    fn test_not_flips_back_when_operand_appears() {
        // NOT spam starts true; the hit must clear the OR's right bit
        let fx = Fixture::new(&["eggs | spam !"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("ham", &mut acc), vec![0]);
        assert!(fx.run("spam", &mut acc).is_empty());
        assert_eq!(fx.run("spam and eggs", &mut acc), vec![0]);
    }

    #[test]
    fn test_double_negation() {
        let fx = Fixture::new(&["a ! !"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("xax", &mut acc), vec![0]);
        assert!(fx.run("xyz", &mut acc).is_empty());
    }

    #[test]
    fn test_untouched_vacuous_rules_are_reported() {
        let fx = Fixture::new(&["cat", "spam !", "x & y"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("hello", &mut acc), vec![1]);
        assert_eq!(fx.run("cat spam", &mut acc), vec![0]);
        assert_eq!(fx.run("", &mut acc), vec![1]);
    }

    #[test]
    fn test_shared_operand_reaches_every_rule() {
        let fx = Fixture::new(&["foo & bar", "foo | baz", "foo !"]);
        let mut acc = Accumulator::new();
        assert_eq!(fx.run("foo", &mut acc), vec![1]);
        assert_eq!(fx.run("foo bar", &mut acc), vec![0, 1]);
        assert_eq!(fx.run("bar", &mut acc), vec![2]);
    }

    #[test]
    fn test_decode_error_aborts() {
        let fx = Fixture::new(&["a"]);
        let mut acc = Accumulator::new();
        let err = fx
            .engine()
            .run(&[b'a', 0xC3], true, &mut acc)
            .unwrap_err();
        assert_eq!(err.offset, 1);
    }
}
