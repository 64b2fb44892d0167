//! Common error types and their diagnostic rendering.

use crate::Kind;
use std::fmt;

/// Common error type.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Typing(TypingError),
}

impl From<TypingError> for Error {
    fn from(err: TypingError) -> Self {
        Self::Typing(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Typing(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// A type-checking failure.
///
/// The `Display` of an error is the diagnostic text; offending
/// expressions are rendered at construction time so that errors can
/// outlive the borrow of the state that produced them.
#[derive(Debug, Eq, PartialEq)]
pub enum TypingError {
    /// The head of an application is not of function type.
    NonFunctionHead(String),
    /// An application provides the wrong number of arguments.
    ApplyArity {
        head: String,
        arg_types: usize,
        children: usize,
    },
    /// An argument type does not match the declared argument type.
    ///
    /// `expected` is the declared type under the substitution
    /// accumulated so far, `expected_orig` its declared form.
    ArgMismatch {
        head: String,
        index: usize,
        expected: String,
        expected_orig: String,
        found: String,
    },
    /// The argument of `Proof` is not of type `Bool`.
    NonBoolProofArg,
    /// A kind without a typing rule.
    UnknownKind(Kind),
    /// A kind applied to an unsupported number of arguments.
    IncorrectArity(Kind, usize),
    /// A kind without an arity constraint.
    UnknownArity(Kind),
    /// A literal operator without a return type rule.
    UnknownLiteralOpType(Kind),
    /// A subterm with no declared type.
    MissingType(String),
}

impl fmt::Display for TypingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NonFunctionHead(head) => {
                write!(f, "Non-function {} as head of APPLY", head)
            }
            Self::ApplyArity {
                head,
                arg_types,
                children,
            } => write!(
                f,
                "Incorrect arity for {}, #argTypes={} #children={}",
                head, arg_types, children
            ),
            Self::ArgMismatch {
                head,
                index,
                expected,
                expected_orig,
                found,
            } => {
                writeln!(f, "Unexpected argument type {} of {}", index, head)?;
                writeln!(f, "  LHS {}, from {}", expected, expected_orig)?;
                write!(f, "  RHS {}", found)
            }
            Self::NonBoolProofArg => write!(f, "Non-Bool for argument of Proof"),
            Self::UnknownKind(k) => write!(f, "Unknown kind {}", k),
            Self::IncorrectArity(k, nargs) => {
                write!(f, "Incorrect arity {} for {}", nargs, k)
            }
            Self::UnknownArity(k) => write!(f, "Unknown arity for {}", k),
            Self::UnknownLiteralOpType(k) => {
                write!(f, "Unknown type for literal operator {}", k)
            }
            Self::MissingType(e) => write!(f, "Missing type for {}", e),
        }
    }
}

impl std::error::Error for TypingError {}
