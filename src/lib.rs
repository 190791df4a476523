//! ruleac: single-pass matching of boolean substring rules
//!
//! A rule is a boolean expression over literal substrings:
//!
//! - `cat & dog`: both occur
//! - `cat | dog`: at least one occurs
//! - `spam !`: `spam` does not occur (postfix NOT)
//! - `(foo & bar) | baz`: parentheses group; otherwise operators associate
//!   left to right with no precedence
//!
//! Every operand of every rule goes into one shared Aho-Corasick automaton,
//! so a text is scanned once no matter how many rules reference it.
//!
//! ```
//! # use ruleac::RuleMatcher;
//! let mut m = RuleMatcher::new();
//! m.register_rule("cat & dog").unwrap();
//! m.register_rule("spam !").unwrap();
//!
//! let hits = m.match_text("the cat chased the dog").unwrap();
//! assert_eq!(hits, vec!["cat & dog", "spam !"]);
//! ```
//!
//! For concurrent matching while rules are still being added, see
//! [`SharedRuleMatcher`].

pub mod automaton;
mod config;
mod engine;
mod error;
pub mod expr;
mod rules;
mod thread_safe;
pub mod utf8;

pub use config::Config;
pub use engine::Accumulator;
pub use error::{DecodeError, DecodeErrorKind, MatchError, ParseError, RuleError};
pub use rules::{Rule, RuleId};
pub use thread_safe::SharedRuleMatcher;

use automaton::Automaton;
use engine::Engine;
use expr::ExprArena;
use rules::RuleSet;

/// A compiled set of composite rules.
///
/// Registration takes `&mut self`; matching takes `&self` and never mutates,
/// so a `RuleMatcher` can be shared across threads once built. Each match
/// call uses its own [`Accumulator`].
#[derive(Clone, Debug, Default)]
pub struct RuleMatcher {
    config: Config,
    rules: RuleSet,
    arena: ExprArena,
    automaton: Automaton,
}

impl RuleMatcher {
    /// Create an empty matcher with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a builder that compiles once at the end.
    pub fn builder() -> RuleMatcherBuilder {
        RuleMatcherBuilder::new()
    }

    /// Parse a rule, merge it into the automaton and recompile.
    ///
    /// A duplicate or malformed rule is rejected and leaves the matcher
    /// unchanged.
    ///
    /// Each call recompiles every failure link and output list, so a loop of
    /// `register_rule` calls costs O(rules × states). To load many rules, use
    /// [`register_rules`](Self::register_rules), the [builder](Self::builder),
    /// or [`add_rule`](Self::add_rule) followed by one
    /// [`compile`](Self::compile).
    pub fn register_rule(&mut self, rule: &str) -> Result<RuleId, RuleError> {
        self.register_rule_bytes(rule.as_bytes())
    }

    /// Like [`register_rule`](Self::register_rule), for a rule given as raw
    /// bytes. Bytes that do not decode are a [`RuleError::Decode`].
    pub fn register_rule_bytes(&mut self, rule: &[u8]) -> Result<RuleId, RuleError> {
        let id = self.insert_rule(rule)?;
        self.automaton.compile();
        Ok(id)
    }

    /// Register many rules with a single compile. Rejected rules are logged
    /// and skipped; returns how many were accepted.
    pub fn register_rules<I, S>(&mut self, rules: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let accepted = rules
            .into_iter()
            .filter(|rule| self.insert_rule(rule.as_ref().as_bytes()).is_ok())
            .count();
        self.automaton.compile();
        accepted
    }

    /// Insert a rule without compiling.
    ///
    /// Matching fails with [`MatchError::Uncompiled`] until
    /// [`compile`](Self::compile) is called. A rejected rule leaves the
    /// matcher, and its compiled state, unchanged.
    pub fn add_rule(&mut self, rule: &str) -> Result<RuleId, RuleError> {
        self.insert_rule(rule.as_bytes())
    }

    /// Compute failure links and output lists for every inserted operand.
    ///
    /// Cheap when nothing was added since the last compile.
    pub fn compile(&mut self) {
        if !self.automaton.is_compiled() {
            self.automaton.compile();
        }
    }

    /// Whether every added rule is visible to matching.
    pub fn is_compiled(&self) -> bool {
        self.automaton.is_compiled()
    }

    /// Insert without compiling. Nothing is touched until the rule has been
    /// fully decoded and parsed.
    fn insert_rule(&mut self, rule: &[u8]) -> Result<RuleId, RuleError> {
        self.try_insert_rule(rule).inspect_err(|e| {
            log::debug!("rejected rule {:?}: {}", String::from_utf8_lossy(rule), e);
        })
    }

    fn try_insert_rule(&mut self, rule: &[u8]) -> Result<RuleId, RuleError> {
        let symbols = utf8::split(rule, self.config.stop_at_nul)?;
        let text = std::str::from_utf8(rule).map_err(|e| DecodeError {
            offset: e.valid_up_to(),
            kind: DecodeErrorKind::NotScalar,
        })?;
        if self.rules.contains(text) {
            return Err(RuleError::Duplicate);
        }
        let tree = expr::parse(&symbols, self.config.trim_operands)?;

        let ranges: Vec<_> = tree.operands.iter().map(|o| o.symbols.clone()).collect();
        let id = self.rules.next_id();
        let (root, leaves) = self.arena.insert_tree(tree, id);
        for (range, leaf) in ranges.into_iter().zip(leaves) {
            self.automaton.insert(&symbols[range], leaf);
        }

        let vacuous = self.arena[root].baseline_value();
        self.rules.push(text, root, vacuous);
        log::debug!(
            "registered rule {:?} as {:?} ({} states)",
            text,
            id,
            self.automaton.state_count()
        );
        Ok(id)
    }

    /// Return the text of every rule that holds for `text`, in registration
    /// order.
    ///
    /// `Ok(vec![])` means the text was scanned and no rule matched; malformed
    /// UTF-8 is an error and reports nothing.
    pub fn match_text(&self, text: impl AsRef<[u8]>) -> Result<Vec<&str>, MatchError> {
        let mut acc = Accumulator::new();
        self.match_with(text, &mut acc)
    }

    /// Like [`match_text`](Self::match_text), reusing `acc`. After the call
    /// `acc` holds the leaf hit counters of this scan.
    pub fn match_with(
        &self,
        text: impl AsRef<[u8]>,
        acc: &mut Accumulator,
    ) -> Result<Vec<&str>, MatchError> {
        let ids = self.match_ids(text.as_ref(), acc)?;
        Ok(ids.into_iter().map(|id| self.rules.get(id).text()).collect())
    }

    /// Ids of the matching rules, in registration order.
    pub fn match_ids(&self, text: &[u8], acc: &mut Accumulator) -> Result<Vec<RuleId>, MatchError> {
        if !self.automaton.is_compiled() {
            return Err(MatchError::Uncompiled);
        }
        let engine = Engine {
            automaton: &self.automaton,
            arena: &self.arena,
            rules: &self.rules,
        };
        Ok(engine.run(text, self.config.stop_at_nul, acc)?)
    }

    /// Check if any rule holds for `text`.
    pub fn is_match(&self, text: impl AsRef<[u8]>) -> Result<bool, MatchError> {
        Ok(!self.match_text(text)?.is_empty())
    }

    /// Count how many rules hold for `text`.
    pub fn count_matches(&self, text: impl AsRef<[u8]>) -> Result<usize, MatchError> {
        Ok(self.match_text(text)?.len())
    }

    pub fn contains_rule(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }

    /// Id of a registered rule, looked up by its exact text.
    pub fn rule_id(&self, rule: &str) -> Option<RuleId> {
        self.rules.id_of(rule)
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        self.rules.get(id)
    }

    /// Registered rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// The expression node arena shared by every rule.
    pub fn expressions(&self) -> &ExprArena {
        &self.arena
    }

    /// Returns the number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of trie states, root included.
    pub fn state_count(&self) -> usize {
        self.automaton.state_count()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Remove every rule, keeping the configuration.
    pub fn clear(&mut self) {
        *self = Self::with_config(self.config);
    }
}

/// Collects rules and compiles the automaton once in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RuleMatcherBuilder {
    matcher: RuleMatcher,
}

impl RuleMatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            matcher: RuleMatcher::with_config(config),
        }
    }

    pub fn add_rule(&mut self, rule: &str) -> Result<RuleId, RuleError> {
        self.matcher.add_rule(rule)
    }

    /// Add many rules, skipping rejected ones; returns how many were accepted.
    pub fn add_rules<I, S>(&mut self, rules: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        rules
            .into_iter()
            .filter(|rule| self.matcher.add_rule(rule.as_ref()).is_ok())
            .count()
    }

    pub fn build(mut self) -> RuleMatcher {
        self.matcher.compile();
        self.matcher
    }
}
