//! Errors raised while registering rules and scanning text.

use thiserror::Error;

/// Why a byte sequence failed to split into codepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A continuation byte (`10xxxxxx`) where a lead byte was expected.
    StrayContinuation,
    /// A lead byte announcing more than five continuation bytes.
    InvalidLead,
    /// The buffer ends before all announced continuation bytes.
    Truncated,
    /// A byte inside the sequence lacks the `10xxxxxx` marker.
    BadContinuation,
    /// A well-formed sequence that is not a Unicode scalar value (an
    /// overlong form, a surrogate, or a codepoint beyond U+10FFFF). Only
    /// rule text, which is reported back as `str`, is held to this.
    NotScalar,
}

/// Malformed UTF-8 at a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid UTF-8 at byte {offset}: {kind:?}")]
pub struct DecodeError {
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

/// A composite rule that does not form a single expression.
///
/// Positions are codepoint indices into the rule text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("rule has no operands")]
    Empty,
    #[error("operator '{op}' at {position} has no left operand")]
    MissingLeftOperand { op: char, position: usize },
    #[error("'!' at {position} has no operand to negate")]
    MissingOperand { position: usize },
    #[error("operand at {position} follows another operand without an operator")]
    AdjacentOperands { position: usize },
    #[error("')' at {position} has no matching '('")]
    UnmatchedClose { position: usize },
    #[error("'(' at {position} is never closed")]
    UnclosedGroup { position: usize },
    #[error("empty group at {position}")]
    EmptyGroup { position: usize },
    #[error("operator at {position} has no right operand")]
    DanglingOperator { position: usize },
}

/// Rejection of a rule at registration. A rejected rule leaves the matcher untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule is already registered")]
    Duplicate,
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("malformed rule: {0}")]
    Malformed(#[from] ParseError),
}

/// Failure of a match call. No partial results are reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("text is not valid UTF-8: {0}")]
    Decode(#[from] DecodeError),
    #[error("rules were added since the last compile")]
    Uncompiled,
}
