//! Composite rule parsing.
//!
//! Grammar, scanned left to right:
//! - a maximal run of codepoints other than `& | ! ( )` is a literal operand
//! - `&` and `|` are infix and associate left to right; there is no precedence
//! - `!` is postfix and negates the operand just before it (a literal, a
//!   parenthesized group, or an earlier negation)
//! - `(` ... `)` groups a single expression
//!
//! So `a & b | c` is `(a & b) | c`, and `(a & b) | c !` is `(a & b) | (c !)`.

use std::ops::Range;

use super::{Link, Node, NodeId, NodeKind, Op, Side};
use crate::error::ParseError;
use crate::utf8::Symbol;

const AND: Symbol = Symbol::ascii(b'&');
const OR: Symbol = Symbol::ascii(b'|');
const NOT: Symbol = Symbol::ascii(b'!');
const OPEN: Symbol = Symbol::ascii(b'(');
const CLOSE: Symbol = Symbol::ascii(b')');

/// A literal operand: the codepoints it spans in the rule, and its leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    pub symbols: Range<usize>,
    pub leaf: NodeId,
}

/// A parsed rule whose node ids are local to this tree.
#[derive(Clone, Debug)]
pub struct ExprTree {
    pub(crate) nodes: Vec<Node>,
    pub root: NodeId,
    pub operands: Vec<Operand>,
}

impl ExprTree {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Binary(Op),
    Not,
    Open,
    Close,
}

#[inline]
fn token(sym: Symbol) -> Option<Token> {
    match sym {
        AND => Some(Token::Binary(Op::And)),
        OR => Some(Token::Binary(Op::Or)),
        NOT => Some(Token::Not),
        OPEN => Some(Token::Open),
        CLOSE => Some(Token::Close),
        _ => None,
    }
}

/// Parse-stack entry.
#[derive(Clone, Copy, Debug)]
enum Frame {
    /// An open `(`.
    Scope { position: usize },
    /// A binary operator still waiting for its right operand.
    Partial {
        op: Op,
        left: NodeId,
        position: usize,
    },
    /// A finished expression. `last` is the operand a postfix `!` would negate.
    Complete { root: NodeId, last: NodeId },
}

#[derive(Default)]
struct Builder {
    nodes: Vec<Node>,
    stack: Vec<Frame>,
    operands: Vec<Operand>,
}

impl Builder {
    fn alloc(&mut self, kind: NodeKind, link: Link) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, link));
        id
    }

    fn set_link(&mut self, child: NodeId, parent: NodeId, side: Side) {
        self.nodes[child.index()].link = Link::Child { parent, side };
    }

    fn replace_child(&mut self, parent: NodeId, side: Side, new: NodeId) {
        match (&mut self.nodes[parent.index()].kind, side) {
            (NodeKind::And { left, .. } | NodeKind::Or { left, .. }, Side::Left) => *left = new,
            (NodeKind::And { right, .. } | NodeKind::Or { right, .. }, Side::Right) => {
                *right = new
            }
            (NodeKind::Not { operand }, _) => *operand = new,
            (NodeKind::Leaf, _) => debug_assert!(false, "leaf has no children"),
        }
    }

    fn operand(&mut self, symbols: Range<usize>) -> Result<(), ParseError> {
        let position = symbols.start;
        let leaf = self.alloc(NodeKind::Leaf, Link::Root);
        self.operands.push(Operand { symbols, leaf });
        self.attach(leaf, position)
    }

    /// Place a finished operand: as the right side of a waiting operator, or
    /// as a new expression at the top level of the current scope.
    fn attach(&mut self, node: NodeId, position: usize) -> Result<(), ParseError> {
        match self.stack.pop() {
            Some(Frame::Partial { op, left, .. }) => {
                let kind = match op {
                    Op::And => NodeKind::And { left, right: node },
                    Op::Or => NodeKind::Or { left, right: node },
                    Op::Not => unreachable!("'!' is never pending"),
                };
                let id = self.alloc(kind, Link::Root);
                self.set_link(left, id, Side::Left);
                self.set_link(node, id, Side::Right);
                self.stack.push(Frame::Complete {
                    root: id,
                    last: node,
                });
            }
            Some(Frame::Complete { .. }) => return Err(ParseError::AdjacentOperands { position }),
            Some(scope @ Frame::Scope { .. }) => {
                self.stack.push(scope);
                self.stack.push(Frame::Complete {
                    root: node,
                    last: node,
                });
            }
            None => self.stack.push(Frame::Complete {
                root: node,
                last: node,
            }),
        }
        Ok(())
    }

    fn binary(&mut self, op: Op, position: usize) -> Result<(), ParseError> {
        match self.stack.pop() {
            Some(Frame::Complete { root, .. }) => {
                self.stack.push(Frame::Partial {
                    op,
                    left: root,
                    position,
                });
                Ok(())
            }
            _ => Err(ParseError::MissingLeftOperand {
                op: op.symbol(),
                position,
            }),
        }
    }

    fn not(&mut self, position: usize) -> Result<(), ParseError> {
        let Some(Frame::Complete { root, last }) = self.stack.pop() else {
            return Err(ParseError::MissingOperand { position });
        };

        let link = self.nodes[last.index()].link;
        let id = self.alloc(NodeKind::Not { operand: last }, link);
        if let Link::Child { parent, side } = link {
            self.replace_child(parent, side, id);
        }
        self.set_link(last, id, Side::Left);

        let root = if last == root { id } else { root };
        self.stack.push(Frame::Complete { root, last: id });
        Ok(())
    }

    fn close(&mut self, position: usize) -> Result<(), ParseError> {
        match self.stack.pop() {
            Some(Frame::Complete { root, .. }) => match self.stack.pop() {
                Some(Frame::Scope { .. }) => self.attach(root, position),
                _ => Err(ParseError::UnmatchedClose { position }),
            },
            Some(Frame::Scope { position }) => Err(ParseError::EmptyGroup { position }),
            Some(Frame::Partial { position, .. }) => Err(ParseError::DanglingOperator { position }),
            None => Err(ParseError::UnmatchedClose { position }),
        }
    }

    fn finish(mut self, len: usize) -> Result<ExprTree, ParseError> {
        let root = match self.stack.pop() {
            Some(Frame::Complete { root, .. }) => root,
            Some(Frame::Scope { position }) => return Err(ParseError::UnclosedGroup { position }),
            Some(Frame::Partial { position, .. }) => {
                return Err(ParseError::DanglingOperator { position })
            }
            None => return Err(ParseError::Empty),
        };
        match self.stack.pop() {
            None => Ok(ExprTree {
                nodes: self.nodes,
                root,
                operands: self.operands,
            }),
            Some(Frame::Scope { position }) => Err(ParseError::UnclosedGroup { position }),
            Some(Frame::Partial { position, .. }) => Err(ParseError::DanglingOperator { position }),
            Some(Frame::Complete { .. }) => Err(ParseError::AdjacentOperands { position: len }),
        }
    }
}

fn trim(symbols: &[Symbol], mut range: Range<usize>) -> Range<usize> {
    while range.start < range.end && symbols[range.start].is_whitespace() {
        range.start += 1;
    }
    while range.end > range.start && symbols[range.end - 1].is_whitespace() {
        range.end -= 1;
    }
    range
}

/// Parse one composite rule.
///
/// With `trim_operands`, whitespace around each operand is dropped and
/// whitespace-only runs are skipped; otherwise every run is an operand.
pub fn parse(symbols: &[Symbol], trim_operands: bool) -> Result<ExprTree, ParseError> {
    let mut builder = Builder::default();
    let mut i = 0;

    while i < symbols.len() {
        match token(symbols[i]) {
            Some(Token::Binary(op)) => builder.binary(op, i)?,
            Some(Token::Not) => builder.not(i)?,
            Some(Token::Open) => builder.stack.push(Frame::Scope { position: i }),
            Some(Token::Close) => builder.close(i)?,
            None => {
                let start = i;
                while i < symbols.len() && token(symbols[i]).is_none() {
                    i += 1;
                }
                let range = if trim_operands {
                    trim(symbols, start..i)
                } else {
                    start..i
                };
                if !range.is_empty() {
                    builder.operand(range)?;
                }
                continue;
            }
        }
        i += 1;
    }

    builder.finish(symbols.len())
}
