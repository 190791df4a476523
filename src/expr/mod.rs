//! Boolean expression trees over substring operands.
//!
//! Every rule's tree lives in one shared [`ExprArena`]. Nodes reference their
//! children and their parent by [`NodeId`], so upward walks during matching
//! are O(1) per step and no node owns another.
//!
//! An operator node's state during a scan is a 2-bit *code*: [`LEFT`] is set
//! while its left (or only) operand is satisfied, [`RIGHT`] while its right
//! operand is. Each node also carries a *baseline* code: its code when no
//! operand has been hit at all. A NOT whose operand is a bare literal, for
//! instance, starts out true.

mod parser;

pub use parser::{parse, ExprTree, Operand};

use crate::rules::RuleId;

/// Right operand satisfied.
pub const RIGHT: u8 = 0b01;
/// Left (or only) operand satisfied.
pub const LEFT: u8 = 0b10;

/// Index of a node in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn offset(self, base: usize) -> Self {
        NodeId::new(self.index() + base)
    }
}

/// Which operand slot of its parent a node fills.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Side::Left => LEFT,
            Side::Right => RIGHT,
        }
    }

    /// Set or clear this side's bit in `code`.
    #[inline]
    pub const fn apply(self, code: u8, satisfied: bool) -> u8 {
        if satisfied {
            code | self.bit()
        } else {
            code & !self.bit()
        }
    }
}

/// Boolean operator of an interior node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    And,
    Or,
    Not,
}

impl Op {
    /// Truth value of a node with this operator holding `code`.
    #[inline]
    pub const fn eval(self, code: u8) -> bool {
        match self {
            Op::And => code & (LEFT | RIGHT) == LEFT | RIGHT,
            Op::Or => code & (LEFT | RIGHT) != 0,
            Op::Not => code & LEFT == 0,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Op::And => '&',
            Op::Or => '|',
            Op::Not => '!',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// A literal substring operand.
    Leaf,
    And { left: NodeId, right: NodeId },
    Or { left: NodeId, right: NodeId },
    /// Its operand fills the left slot.
    Not { operand: NodeId },
}

impl NodeKind {
    #[inline]
    pub fn op(&self) -> Option<Op> {
        match self {
            NodeKind::Leaf => None,
            NodeKind::And { .. } => Some(Op::And),
            NodeKind::Or { .. } => Some(Op::Or),
            NodeKind::Not { .. } => Some(Op::Not),
        }
    }

    fn children(&self) -> [Option<(NodeId, Side)>; 2] {
        match *self {
            NodeKind::Leaf => [None, None],
            NodeKind::And { left, right } | NodeKind::Or { left, right } => {
                [Some((left, Side::Left)), Some((right, Side::Right))]
            }
            NodeKind::Not { operand } => [Some((operand, Side::Left)), None],
        }
    }

    fn offset(self, base: usize) -> Self {
        match self {
            NodeKind::Leaf => NodeKind::Leaf,
            NodeKind::And { left, right } => NodeKind::And {
                left: left.offset(base),
                right: right.offset(base),
            },
            NodeKind::Or { left, right } => NodeKind::Or {
                left: left.offset(base),
                right: right.offset(base),
            },
            NodeKind::Not { operand } => NodeKind::Not {
                operand: operand.offset(base),
            },
        }
    }
}

/// Upward link of a node. Only a rule's root has none.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Link {
    Root,
    Child { parent: NodeId, side: Side },
}

impl Link {
    fn offset(self, base: usize) -> Self {
        match self {
            Link::Root => Link::Root,
            Link::Child { parent, side } => Link::Child {
                parent: parent.offset(base),
                side,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub link: Link,
    /// The rule whose tree holds this node.
    pub rule: RuleId,
    baseline: u8,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, link: Link) -> Self {
        Self {
            kind,
            link,
            rule: RuleId::PENDING,
            baseline: 0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Code held when no operand of the rule has been hit.
    #[inline]
    pub fn baseline(&self) -> u8 {
        self.baseline
    }

    /// Truth value with no operand hit.
    #[inline]
    pub fn baseline_value(&self) -> bool {
        self.kind.op().is_some_and(|op| op.eval(self.baseline))
    }
}

/// Arena holding the expression trees of every accepted rule.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Node>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move a parsed tree into the arena under `rule`, returning the id of
    /// its root and the arena ids of its operands, in parse order.
    pub fn insert_tree(&mut self, tree: ExprTree, rule: RuleId) -> (NodeId, Vec<NodeId>) {
        let base = self.nodes.len();
        let root = tree.root.offset(base);
        let leaves = tree.operands.iter().map(|o| o.leaf.offset(base)).collect();

        self.nodes.extend(tree.nodes.into_iter().map(|node| Node {
            kind: node.kind.offset(base),
            link: node.link.offset(base),
            rule,
            baseline: 0,
        }));
        self.compute_baselines(root);
        (root, leaves)
    }

    /// Fill in baseline codes bottom-up with an explicit post-order walk, so
    /// deeply chained expressions do not recurse.
    fn compute_baselines(&mut self, root: NodeId) {
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];

        while let Some((id, child_pos)) = stack.pop() {
            let children = self.get(id).kind.children();
            if let Some(Some((child, _))) = children.get(child_pos) {
                stack.push((id, child_pos + 1));
                stack.push((*child, 0));
                continue;
            }

            let code = children
                .iter()
                .flatten()
                .filter(|(child, _)| self.get(*child).baseline_value())
                .fold(0, |code, (_, side)| code | side.bit());
            self.nodes[id.index()].baseline = code;
        }
    }
}

impl std::ops::Index<NodeId> for ExprArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utf8::split;

    fn insert(arena: &mut ExprArena, rule: &str) -> NodeId {
        let symbols = split(rule.as_bytes(), true).unwrap();
        let tree = parse(&symbols, true).unwrap();
        arena.insert_tree(tree, RuleId::new(0)).0
    }

    #[test]
    fn test_op_eval() {
        assert!(Op::And.eval(LEFT | RIGHT));
        assert!(!Op::And.eval(LEFT));
        assert!(Op::Or.eval(RIGHT));
        assert!(!Op::Or.eval(0));
        assert!(Op::Not.eval(0));
        assert!(!Op::Not.eval(LEFT));
    }

    #[test]
    fn test_side_apply() {
        assert_eq!(Side::Left.apply(0, true), LEFT);
        assert_eq!(Side::Right.apply(LEFT, true), LEFT | RIGHT);
        assert_eq!(Side::Left.apply(LEFT | RIGHT, false), RIGHT);
    }

    #[test]
    fn test_baselines() {
        let mut arena = ExprArena::new();

        let root = insert(&mut arena, "a & b");
        assert_eq!(arena[root].baseline(), 0);
        assert!(!arena[root].baseline_value());

        let root = insert(&mut arena, "a !");
        assert!(arena[root].baseline_value());

        // NOT a is true with nothing hit, so the AND starts with its left bit set
        let root = insert(&mut arena, "(a !) & b");
        assert_eq!(arena[root].baseline(), LEFT);
        assert!(!arena[root].baseline_value());

        let root = insert(&mut arena, "b | a !");
        assert_eq!(arena[root].baseline(), RIGHT);
        assert!(arena[root].baseline_value());
    }

    #[test]
    fn test_insert_rebases_ids() {
        let mut arena = ExprArena::new();
        insert(&mut arena, "x & y");
        let before = arena.len();
        let root = insert(&mut arena, "p | q");
        assert!(root.index() >= before);
        match arena[root].kind {
            NodeKind::Or { left, right } => {
                assert!(left.index() >= before && right.index() >= before);
                assert_eq!(
                    arena[left].link,
                    Link::Child {
                        parent: root,
                        side: Side::Left
                    }
                );
                assert_eq!(
                    arena[right].link,
                    Link::Child {
                        parent: root,
                        side: Side::Right
                    }
                );
            }
            other => panic!("expected Or, got {:?}", other),
        }
        assert_eq!(arena[root].link, Link::Root);
    }

    #[test]
    fn test_deep_not_chain_does_not_overflow() {
        let mut arena = ExprArena::new();
        let rule = format!("a{}", " !".repeat(50_000));
        let root = insert(&mut arena, &rule);
        // an even number of negations
        assert!(!arena[root].baseline_value());
    }
}
