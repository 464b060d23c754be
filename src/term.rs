//! This module defines the tagged term representation that encoded values live in.
//! The main enum, [`Term`], covers every shape the codec produces: booleans,
//! zero/successor naturals, nil/cons lists, pairs, triples, three-way orderings,
//! opaque host integers and named functions. Helper constructors such as
//! [`cons`], [`succ`], [`pair`] and [`nil`] keep term construction short in code
//! and tests, and the fallible `TryFrom<Term>` conversions give typed access to
//! a term's native value.

use crate::Error;
use crate::codec;
use crate::intooperation::{IntoOperation, OperationFn};
use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::sync::{Arc, LazyLock};

/// Placeholder swapped into a spine link while a long list or natural is torn down
static SPINE_END: LazyLock<Arc<Term>> = LazyLock::new(|| Arc::new(Term::Nil));

/// Encoded term
///
/// Subterms are shared through `Arc`, so cloning a term, prepending to a list or
/// wrapping a natural in another successor never copies the existing structure.
#[derive(Clone)]
pub enum Term {
    /// Two-branch selector
    Bool(bool),
    /// Natural number zero
    Zero,
    /// Successor of a natural number
    Succ(Arc<Term>),
    /// Empty list
    Nil,
    /// Non-empty list: head and tail
    Cons(Arc<Term>, Arc<Term>),
    Pair(Arc<Term>, Arc<Term>),
    Triple(Arc<Term>, Arc<Term>, Arc<Term>),
    /// Three-way comparison result
    Ord(Ordering),
    /// Native integer carried through the library untouched
    Host(i64),
    /// Named native callable, compared by id
    Function {
        id: String,
        func: Arc<OperationFn>,
    },
}

impl Term {
    /// Wrap a strongly-typed Rust function or closure as a function term.
    ///
    /// Parameters and results are converted with the same adapters used by the
    /// library registry, so `|a: Term, b: Term| -> Result<Term, Error>` and
    /// `|n: u64| n > 3` are both accepted.
    pub fn operation<Args, F>(id: impl Into<String>, func: F) -> Term
    where
        F: IntoOperation<Args>,
    {
        Term::Function {
            id: id.into(),
            func: func.into_operation(),
        }
    }

    /// Borrowing iterator over the elements of a list term.
    ///
    /// Yields an error (once) if the spine ends in something other than `Nil`.
    pub fn list_iter(&self) -> ListIter<'_> {
        ListIter { cursor: Some(self) }
    }

    /// Number of successors above `Zero`, or `None` for a non-natural
    pub(crate) fn nat_depth(&self) -> Option<u64> {
        let mut depth = 0;
        let mut current = self;
        loop {
            match current {
                Term::Zero => return Some(depth),
                Term::Succ(pred) => {
                    depth += 1;
                    current = &**pred;
                }
                _ => return None,
            }
        }
    }

    /// Detach the tail of a list cell or the predecessor of a successor
    fn take_spine(&mut self) -> Option<Arc<Term>> {
        match self {
            Term::Succ(link) | Term::Cons(_, link) => {
                Some(std::mem::replace(link, Arc::clone(&SPINE_END)))
            }
            _ => None,
        }
    }

    /// Short name of the term's shape, used in error messages
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Term::Bool(_) => "boolean",
            Term::Zero | Term::Succ(_) => "natural",
            Term::Nil | Term::Cons(..) => "list",
            Term::Pair(..) => "pair",
            Term::Triple(..) => "triple",
            Term::Ord(_) => "ordering",
            Term::Host(_) => "host integer",
            Term::Function { .. } => "function",
        }
    }
}

/// Iterator over the elements of a list term, see [`Term::list_iter`]
pub struct ListIter<'a> {
    cursor: Option<&'a Term>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<&'a Term, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.take()? {
            Term::Nil => None,
            Term::Cons(head, tail) => {
                self.cursor = Some(&**tail);
                Some(Ok(head))
            }
            other => Some(Err(Error::TypeError(format!(
                "expected list, found {}",
                other.kind()
            )))),
        }
    }
}

impl FusedIterator for ListIter<'_> {}

impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Bool(b) => write!(f, "Bool({b})"),
            Term::Zero | Term::Succ(_) => match self.nat_depth() {
                Some(n) => write!(f, "Nat({n})"),
                None => match self {
                    Term::Succ(pred) => write!(f, "Succ({pred:?})"),
                    _ => write!(f, "Zero"),
                },
            },
            Term::Nil | Term::Cons(..) => {
                write!(f, "List(")?;
                let mut first = true;
                let mut current = self;
                loop {
                    match current {
                        Term::Nil => break,
                        Term::Cons(head, tail) => {
                            if !first {
                                write!(f, ", ")?;
                            }
                            first = false;
                            write!(f, "{head:?}")?;
                            current = &**tail;
                        }
                        improper => {
                            write!(f, " . {improper:?}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Term::Pair(x, y) => write!(f, "Pair({x:?}, {y:?})"),
            Term::Triple(x, y, z) => write!(f, "Triple({x:?}, {y:?}, {z:?})"),
            Term::Ord(ord) => write!(f, "Ord({ord:?})"),
            Term::Host(n) => write!(f, "Host({n})"),
            Term::Function { id, .. } => write!(f, "Function({id})"),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Bool(b) => write!(f, "{b}"),
            Term::Zero => write!(f, "0"),
            Term::Succ(pred) => match self.nat_depth() {
                Some(n) => write!(f, "{n}"),
                None => write!(f, "(succ {pred})"),
            },
            Term::Nil | Term::Cons(..) => {
                write!(f, "[")?;
                for (i, item) in self.list_iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match item {
                        Ok(item) => write!(f, "{item}")?,
                        Err(_) => write!(f, ". <improper>")?,
                    }
                }
                write!(f, "]")
            }
            Term::Pair(x, y) => write!(f, "({x}, {y})"),
            Term::Triple(x, y, z) => write!(f, "({x}, {y}, {z})"),
            Term::Ord(Ordering::Less) => write!(f, "lt"),
            Term::Ord(Ordering::Equal) => write!(f, "eq"),
            Term::Ord(Ordering::Greater) => write!(f, "gt"),
            Term::Host(n) => write!(f, "{n}"),
            Term::Function { id, .. } => write!(f, "#<function:{id}>"),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        // List tails and successor chains are walked in a loop; only heads,
        // pair and triple components recurse.
        let (mut a, mut b) = (self, other);
        loop {
            match (a, b) {
                (Term::Succ(x), Term::Succ(y)) => {
                    if Arc::ptr_eq(x, y) {
                        return true;
                    }
                    (a, b) = (&**x, &**y);
                }
                (Term::Cons(h1, t1), Term::Cons(h2, t2)) => {
                    if !Arc::ptr_eq(h1, h2) && h1 != h2 {
                        return false;
                    }
                    if Arc::ptr_eq(t1, t2) {
                        return true;
                    }
                    (a, b) = (&**t1, &**t2);
                }
                (Term::Bool(x), Term::Bool(y)) => return x == y,
                (Term::Zero, Term::Zero) | (Term::Nil, Term::Nil) => return true,
                (Term::Pair(x1, y1), Term::Pair(x2, y2)) => return x1 == x2 && y1 == y2,
                (Term::Triple(x1, y1, z1), Term::Triple(x2, y2, z2)) => {
                    return x1 == x2 && y1 == y2 && z1 == z2;
                }
                (Term::Ord(x), Term::Ord(y)) => return x == y,
                (Term::Host(x), Term::Host(y)) => return x == y,
                // Compare functions by id string, not function pointer
                (Term::Function { id: id1, .. }, Term::Function { id: id2, .. }) => {
                    return id1 == id2;
                }
                _ => return false,
            }
        }
    }
}

/// Tears down list and natural spines iteratively.
///
/// The derived drop glue would recurse once per `Cons` or `Succ` cell and
/// overflow the stack on long lists. Each uniquely owned link is unwrapped in a
/// loop instead; a link still shared elsewhere just loses one reference.
impl Drop for Term {
    fn drop(&mut self) {
        let mut next = self.take_spine();
        while let Some(link) = next {
            next = Arc::into_inner(link).and_then(|mut term| term.take_spine());
        }
    }
}

// From trait implementations for Term - enables .into() conversion

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Bool(b)
    }
}

impl From<Ordering> for Term {
    fn from(ord: Ordering) -> Self {
        Term::Ord(ord)
    }
}

macro_rules! impl_from_host_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Term {
            fn from(n: $int_type) -> Self {
                Term::Host(n as i64)
            }
        }
    };
}

// Plain Rust integers become opaque host values, never naturals: naturals
// need the codec's cache, see `Codec::encode_nat`.
impl_from_host_integer!(i8);
impl_from_host_integer!(i16);
impl_from_host_integer!(i32);
impl_from_host_integer!(i64);
impl_from_host_integer!(u8);
impl_from_host_integer!(u16);
impl_from_host_integer!(u32);

impl<A: Into<Term>, B: Into<Term>> From<(A, B)> for Term {
    fn from((x, y): (A, B)) -> Self {
        pair(x.into(), y.into())
    }
}

impl<A: Into<Term>, B: Into<Term>, C: Into<Term>> From<(A, B, C)> for Term {
    fn from((x, y, z): (A, B, C)) -> Self {
        triple(x.into(), y.into(), z.into())
    }
}

// Fallible conversions from `Term` back into native Rust types.

impl TryFrom<Term> for bool {
    type Error = Error;

    fn try_from(term: Term) -> Result<bool, Error> {
        codec::decode_bool(&term)
    }
}

impl TryFrom<Term> for u64 {
    type Error = Error;

    fn try_from(term: Term) -> Result<u64, Error> {
        codec::decode_nat(&term)
    }
}

impl TryFrom<Term> for Ordering {
    type Error = Error;

    fn try_from(term: Term) -> Result<Ordering, Error> {
        match term {
            Term::Ord(ord) => Ok(ord),
            other => Err(Error::TypeError(format!(
                "expected ordering, found {}",
                other.kind()
            ))),
        }
    }
}

impl TryFrom<Term> for i64 {
    type Error = Error;

    fn try_from(term: Term) -> Result<i64, Error> {
        match term {
            Term::Host(n) => Ok(n),
            other => Err(Error::TypeError(format!(
                "expected host integer, found {}",
                other.kind()
            ))),
        }
    }
}

/// Empty list
pub fn nil() -> Term {
    Term::Nil
}

/// Prepend `head` to the list `tail`
pub fn cons(head: Term, tail: Term) -> Term {
    Term::Cons(Arc::new(head), Arc::new(tail))
}

/// Successor of the natural `pred`
pub fn succ(pred: Term) -> Term {
    Term::Succ(Arc::new(pred))
}

pub fn pair(x: Term, y: Term) -> Term {
    Term::Pair(Arc::new(x), Arc::new(y))
}

pub fn triple(x: Term, y: Term, z: Term) -> Term {
    Term::Triple(Arc::new(x), Arc::new(y), Arc::new(z))
}
