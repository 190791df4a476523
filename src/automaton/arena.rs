//! Index-based state arena for the shared trie.
//!
//! `StateId` is just an index (u32), so failure links can point anywhere in
//! the arena, including back toward the root, without ownership issues.
//! Output entries are `NodeId`s into the expression arena.

use smallvec::SmallVec;

use crate::expr::NodeId;
use crate::utf8::Symbol;

/// A state identifier - an index into the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    /// The root state, present in every automaton.
    pub const ROOT: StateId = StateId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == StateId::ROOT
    }
}

/// A trie state.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Number of codepoints on the path from the root.
    pub depth: u32,
    /// Children as (symbol, state) pairs, kept sorted by symbol.
    pub(super) next: SmallVec<[(Symbol, StateId); 4]>,
    /// Longest proper suffix state; `None` only for the root.
    pub(super) fail: Option<StateId>,
    /// Leaves whose operand ends exactly here.
    pub(super) own: SmallVec<[NodeId; 1]>,
    /// `own` plus every output along the failure chain; filled by compile.
    pub(super) outputs: Vec<NodeId>,
}

impl State {
    #[inline]
    pub fn fail(&self) -> Option<StateId> {
        self.fail
    }

    #[inline]
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    #[inline]
    pub fn child(&self, sym: Symbol) -> Option<StateId> {
        self.next
            .binary_search_by_key(&sym, |&(s, _)| s)
            .ok()
            .map(|pos| self.next[pos].1)
    }
}

/// Shared trie plus failure links over every operand of every rule.
#[derive(Clone, Debug)]
pub struct Automaton {
    pub(super) states: Vec<State>,
    /// Whether failure links and outputs reflect every inserted operand.
    pub(super) compiled: bool,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    pub fn new() -> Self {
        let mut states = Vec::with_capacity(64);
        states.push(State::default());
        Self {
            states,
            compiled: true,
        }
    }

    fn alloc(&mut self, depth: u32) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State {
            depth,
            ..State::default()
        });
        id
    }

    /// Find or create the child of `parent` on `sym`.
    fn get_or_create_child(&mut self, parent: StateId, sym: Symbol) -> StateId {
        let children = &self.states[parent.index()].next;
        match children.binary_search_by_key(&sym, |&(s, _)| s) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let depth = self.states[parent.index()].depth + 1;
                let child = self.alloc(depth);
                self.states[parent.index()].next.insert(pos, (sym, child));
                child
            }
        }
    }

    /// Walk or extend the trie along `operand` and register `leaf` as an
    /// output of the final state. An empty operand is discarded.
    pub fn insert(&mut self, operand: &[Symbol], leaf: NodeId) -> Option<StateId> {
        if operand.is_empty() {
            return None;
        }
        let mut state = StateId::ROOT;
        for &sym in operand {
            state = self.get_or_create_child(state, sym);
        }
        self.states[state.index()].own.push(leaf);
        self.compiled = false;
        Some(state)
    }

    /// Advance from `state` on `sym`, falling back along failure links when
    /// there is no direct transition.
    #[inline]
    pub fn step(&self, mut state: StateId, sym: Symbol) -> StateId {
        loop {
            let current = &self.states[state.index()];
            if let Some(next) = current.child(sym) {
                return next;
            }
            match current.fail {
                Some(fail) => state = fail,
                None => return StateId::ROOT,
            }
        }
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}

impl std::ops::Index<StateId> for Automaton {
    type Output = State;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}
