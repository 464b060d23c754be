//! Derangements - anagram derangement search over words and encoded terms
//!
//! This crate contains two cooperating pieces:
//!
//! - A direct finder that buckets words by their sorted letters and reports
//!   same-bucket pairs that differ at every position of a fixed window.
//! - A small term library: native values are encoded into [`term::Term`]s
//!   (booleans, naturals, lists, pairs, triples, orderings, letters and
//!   strings), run through named higher-order operations (fold, map, filter,
//!   group-by, sort-by, ...) and decoded back.
//!
//! ## Encoded terms
//!
//! ```text
//! encode(3)          => Succ(Succ(Succ(Zero)))
//! encode([1, 0])     => Cons(Succ(Zero), Cons(Zero, Nil))
//! encode("AB")       => Cons(Zero, Cons(Succ(Zero), Nil))
//! ```
//!
//! Library operations are looked up by name in an [`env::Environment`]:
//!
//! ```text
//! (nat-cmp 2 5)                 => lt
//! (group-by nat-eq [1 1 2 1 1]) => [[1 1] [2] [1 1]]
//! ```
//!
//! ## Strict decoding
//!
//! Decoding never guesses: a term of the wrong shape yields
//! [`Error::TypeError`], and encoding rejects values outside a type's domain
//! with [`Error::InvalidInput`].
//!
//! ## Modules
//!
//! - `term`: the tagged term representation and helper constructors
//! - `codec`: encode/decode between native values and terms
//! - `library`: the named operation registry and its native implementations
//! - `env`: the term environment mapping names to callables
//! - `anagram`: the direct derangement finder
//! - `pipeline`: the same search expressed through encoded terms
//! - `wordlist`: JSON word-list loading

use std::fmt;

/// Number of leading positions that must all differ for two anagrams to form
/// a derangement pair
pub const DERANGEMENT_WINDOW: usize = 5;

/// Error types for encoding, decoding and evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A native value outside the domain of the requested encoding
    InvalidInput(String),
    /// A term of the wrong shape for the requested operation
    TypeError(String),
    ArityError {
        expected: usize,
        got: usize,
        operation: Option<String>,
    },
    UnboundOperation(String),
    LoadError(String),
}

impl Error {
    /// Create an ArityError without operation context
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            operation: None,
        }
    }

    /// Create an ArityError naming the operation that was called
    pub fn arity_error_for(expected: usize, got: usize, operation: impl Into<String>) -> Self {
        Error::ArityError {
            expected,
            got,
            operation: Some(operation.into()),
        }
    }

    pub(crate) fn with_operation(self, name: &str) -> Self {
        match self {
            Error::ArityError {
                expected,
                got,
                operation: None,
            } => Error::arity_error_for(expected, got, name),
            Error::TypeError(msg) => Error::TypeError(format!("{msg}\n  In operation: {name}")),
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::ArityError {
                expected,
                got,
                operation,
            } => match operation {
                Some(name) => write!(
                    f,
                    "ArityError: operation {name}: expected {expected} arguments, got {got}"
                ),
                None => write!(
                    f,
                    "ArityError: function expected {expected} arguments but got {got}"
                ),
            },
            Error::UnboundOperation(name) => write!(f, "Unbound operation: {name}"),
            Error::LoadError(msg) => write!(f, "Load error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod anagram;
pub mod codec;
pub mod env;
pub mod intooperation;
pub mod library;
pub mod pipeline;
pub mod term;
pub mod wordlist;
