//! Failure links and output propagation.

use std::collections::VecDeque;

use super::arena::{Automaton, StateId};

impl Automaton {
    /// Compute failure links and effective output lists breadth-first from
    /// the root.
    ///
    /// BFS order matters: a state's failure target is strictly shallower, so
    /// its effective outputs are final by the time the state is visited.
    /// Safe to call again after more operands are inserted; everything is
    /// recomputed from the states' own outputs.
    pub fn compile(&mut self) {
        let root = StateId::ROOT;
        self.states[root.index()].fail = None;
        self.states[root.index()].outputs = self.states[root.index()].own.to_vec();

        let mut queue: VecDeque<StateId> = VecDeque::with_capacity(self.states.len());
        queue.push_back(root);

        while let Some(parent) = queue.pop_front() {
            for pos in 0..self.states[parent.index()].next.len() {
                let (sym, child) = self.states[parent.index()].next[pos];

                let target = if parent.is_root() {
                    root
                } else {
                    let mut probe = self.states[parent.index()].fail;
                    loop {
                        match probe {
                            Some(p) => match self.states[p.index()].child(sym) {
                                Some(found) => break found,
                                None => probe = self.states[p.index()].fail,
                            },
                            None => break root,
                        }
                    }
                };

                let mut outputs = self.states[child.index()].own.to_vec();
                outputs.extend_from_slice(&self.states[target.index()].outputs);

                let state = &mut self.states[child.index()];
                state.fail = Some(target);
                state.outputs = outputs;
                queue.push_back(child);
            }
        }

        self.compiled = true;
        log::trace!("compiled automaton: {} states", self.states.len());
    }
}
