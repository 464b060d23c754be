//! Bidirectional conversion between native values and encoded [`Term`]s.
//!
//! Every supported type obeys the round-trip law `decode(encode(x)) == x` for
//! any `x` in its domain:
//!
//! | Native            | Encoded term                                   |
//! |-------------------|------------------------------------------------|
//! | `bool`            | `Bool`                                         |
//! | natural `n >= 0`  | `n` successors around `Zero`                   |
//! | `'A'..='Z'`       | the natural offset from `'A'`                  |
//! | `&str`            | list of encoded letters                        |
//! | sequence          | `Cons` chain ending in `Nil`, in native order  |
//! | 2-/3-tuple        | `Pair` / `Triple` of already-encoded terms     |
//! | `-1`, `0`, `1`    | `Ord(Less)`, `Ord(Equal)`, `Ord(Greater)`      |
//!
//! Encoding rejects values outside a type's domain with
//! [`Error::InvalidInput`]; decoding a term of the wrong shape yields
//! [`Error::TypeError`].

use crate::Error;
use crate::term::{Term, cons, pair, succ, triple};
use log::trace;
use std::cmp::Ordering;

/// Memo table of encoded naturals.
///
/// Entry `k` holds the encoding of `k`. The table only grows: asking for a
/// natural past the end extends it one successor at a time, and each new
/// entry shares the previous one as its predecessor.
#[derive(Debug, Clone)]
pub struct NatCache {
    entries: Vec<Term>,
}

impl Default for NatCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NatCache {
    pub fn new() -> Self {
        NatCache {
            entries: vec![Term::Zero],
        }
    }

    /// Encoding of `n`, extending the table as needed
    pub fn get(&mut self, n: usize) -> Term {
        if n >= self.entries.len() {
            trace!("extending nat cache from {} to {}", self.entries.len(), n + 1);
            self.entries.reserve(n + 1 - self.entries.len());
            while self.entries.len() <= n {
                let pred = self.entries[self.entries.len() - 1].clone();
                self.entries.push(succ(pred));
            }
        }
        self.entries[n].clone()
    }

    /// Largest natural currently cached. Zero is always present, so a fresh
    /// cache reports `0`.
    pub fn cached_up_to(&self) -> usize {
        self.entries.len() - 1
    }
}

/// Encoder for the types whose encoding is memoized.
///
/// Naturals, and everything built from them (letters, strings), go through
/// the codec's [`NatCache`], which lives exactly as long as the codec.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    nats: NatCache,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a non-negative integer as a zero/successor chain
    pub fn encode_nat(&mut self, n: i64) -> Result<Term, Error> {
        let n = usize::try_from(n).map_err(|_| {
            Error::InvalidInput(format!("can only encode non-negative integers, got {n}"))
        })?;
        Ok(self.nats.get(n))
    }

    /// Encode a sequence of naturals as a list term
    pub fn encode_nats<I>(&mut self, items: I) -> Result<Term, Error>
    where
        I: IntoIterator<Item = i64>,
    {
        let encoded = items
            .into_iter()
            .map(|n| self.encode_nat(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(encode_list(encoded))
    }

    /// Encode a single uppercase ASCII letter as its offset from `'A'`
    pub fn encode_char(&mut self, c: char) -> Result<Term, Error> {
        if !c.is_ascii_uppercase() {
            return Err(Error::InvalidInput(format!(
                "can only encode single uppercase letters, got {c:?}"
            )));
        }
        Ok(self.nats.get(usize::from(c as u8 - b'A')))
    }

    /// Encode a string as a list of encoded letters
    pub fn encode_string(&mut self, s: &str) -> Result<Term, Error> {
        let letters = s
            .chars()
            .map(|c| self.encode_char(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(encode_list(letters))
    }

    /// The codec's natural-number cache
    pub fn nat_cache(&self) -> &NatCache {
        &self.nats
    }
}

pub fn encode_bool(b: bool) -> Term {
    Term::Bool(b)
}

pub fn decode_bool(term: &Term) -> Result<bool, Error> {
    match term {
        Term::Bool(b) => Ok(*b),
        other => Err(Error::TypeError(format!(
            "expected boolean, found {}",
            other.kind()
        ))),
    }
}

/// Count the successors of a natural term
pub fn decode_nat(term: &Term) -> Result<u64, Error> {
    term.nat_depth().ok_or_else(|| {
        Error::TypeError(format!("expected natural, found {}", term.kind()))
    })
}

/// Build a nil/cons chain mirroring the order of `items`
pub fn encode_list<I>(items: I) -> Term
where
    I: IntoIterator<Item = Term>,
{
    let items: Vec<Term> = items.into_iter().collect();
    items
        .into_iter()
        .rev()
        .fold(Term::Nil, |tail, head| cons(head, tail))
}

pub fn decode_list(term: &Term) -> Result<Vec<Term>, Error> {
    term.list_iter()
        .map(|item| item.cloned())
        .collect()
}

pub fn decode_char(term: &Term) -> Result<char, Error> {
    let offset = decode_nat(term)?;
    u8::try_from(offset)
        .ok()
        .filter(|offset| *offset < 26)
        .map(|offset| char::from(b'A' + offset))
        .ok_or_else(|| Error::TypeError(format!("natural {offset} is not a letter offset")))
}

pub fn decode_string(term: &Term) -> Result<String, Error> {
    term.list_iter()
        .map(|item| item.and_then(decode_char))
        .collect()
}

pub fn encode_pair((x, y): (Term, Term)) -> Term {
    pair(x, y)
}

pub fn decode_pair(term: &Term) -> Result<(Term, Term), Error> {
    match term {
        Term::Pair(x, y) => Ok((Term::clone(x), Term::clone(y))),
        other => Err(Error::TypeError(format!(
            "expected pair, found {}",
            other.kind()
        ))),
    }
}

pub fn encode_triple((x, y, z): (Term, Term, Term)) -> Term {
    triple(x, y, z)
}

pub fn decode_triple(term: &Term) -> Result<(Term, Term, Term), Error> {
    match term {
        Term::Triple(x, y, z) => Ok((Term::clone(x), Term::clone(y), Term::clone(z))),
        other => Err(Error::TypeError(format!(
            "expected triple, found {}",
            other.kind()
        ))),
    }
}

/// Encode `-1`, `0` or `1` as less, equal or greater
pub fn encode_ord(ord: i64) -> Result<Term, Error> {
    match ord {
        -1 => Ok(Term::Ord(Ordering::Less)),
        0 => Ok(Term::Ord(Ordering::Equal)),
        1 => Ok(Term::Ord(Ordering::Greater)),
        other => Err(Error::InvalidInput(format!(
            "can only encode -1, 0, or 1 as an ordering, got {other}"
        ))),
    }
}

/// Decode an ordering to `-1`, `0` or `1`
pub fn decode_ord(term: &Term) -> Result<i8, Error> {
    match term {
        Term::Ord(ord) => Ok(*ord as i8),
        other => Err(Error::TypeError(format!(
            "expected ordering, found {}",
            other.kind()
        ))),
    }
}
