//! Registry of named library operations over encoded terms.
//!
//! Each operation is a pure function from terms to a term, implemented natively
//! and registered once under the name an encoded program would use:
//!
//! ```text
//! (nat-cmp 3 5)                    => lt
//! (foldr cons nil xs)              => xs
//! (group-by nat-eq [1 1 2 1 1])    => [[1 1] [2] [1 1]]
//! (sort-by nat-cmp [3 1 2])        => [1 2 3]
//! (list-nat-cmp [1 2] [1 2 3])     => eq
//! ```
//!
//! ## Higher-order operations
//!
//! Operations such as `foldr`, `map`, `filter` and `sort-by` take a
//! [`Term::Function`] as their first argument and call it through
//! [`apply`]. The function's result is checked for the expected shape:
//! predicates must return booleans, comparators must return orderings.
//!
//! ## Adding New Operations
//!
//! 1. **Implement the function** with typed parameters (`Term`, `bool`, `u64`,
//!    `Ordering` or `i64`) and a result convertible into a `Term`
//! 2. **Add it to LIBRARY_OPS** with its name and arity
//! 3. **Add tests** covering the operation's contract and its type errors

use crate::Error;
use crate::codec::{decode_list, decode_triple, encode_list};
use crate::env::apply;
use crate::intooperation::{IntoOperation, OperationFn};
use crate::term::{Term, cons, pair, succ, triple};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Definition of a library operation
#[derive(Clone)]
pub struct LibraryOp {
    /// Name the operation is bound to in the term environment
    pub name: &'static str,
    /// Expected number of arguments
    pub arity: usize,
    op: Arc<OperationFn>,
}

impl std::fmt::Debug for LibraryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LibraryOp({}/{})", self.name, self.arity)
    }
}

impl PartialEq for LibraryOp {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl LibraryOp {
    /// Check the argument count, run the operation and name it in any error
    pub fn call(&self, args: Vec<Term>) -> Result<Term, Error> {
        if args.len() != self.arity {
            return Err(Error::arity_error_for(self.arity, args.len(), self.name));
        }
        (self.op)(args).map_err(|err| err.with_operation(self.name))
    }

    /// This operation as a function term
    pub fn to_term(&'static self) -> Term {
        Term::Function {
            id: self.name.to_owned(),
            func: Arc::new(move |args: Vec<Term>| self.call(args)),
        }
    }
}

//
// Shared helpers
//

/// Collect the elements of a list term, borrowing them
fn list_items(list: &Term) -> Result<Vec<&Term>, Error> {
    list.list_iter().collect()
}

/// Apply a predicate function and require a boolean result
fn apply_predicate(pred: &Term, args: Vec<Term>) -> Result<bool, Error> {
    bool::try_from(apply(pred, args)?)
}

/// Apply a comparator function and require an ordering result
fn apply_comparator(cmp: &Term, a: &Term, b: &Term) -> Result<Ordering, Error> {
    Ordering::try_from(apply(cmp, vec![a.clone(), b.clone()])?)
}

/// Three-way comparison of two natural terms.
///
/// Walks both successor chains in lockstep, so the cost is bounded by the
/// smaller of the two numbers.
pub fn compare_nats(a: &Term, b: &Term) -> Result<Ordering, Error> {
    let (mut a, mut b) = (a, b);
    loop {
        match (a, b) {
            (Term::Zero, Term::Zero) => return Ok(Ordering::Equal),
            (Term::Zero, Term::Succ(_)) => return Ok(Ordering::Less),
            (Term::Succ(_), Term::Zero) => return Ok(Ordering::Greater),
            (Term::Succ(pa), Term::Succ(pb)) => {
                a = &**pa;
                b = &**pb;
            }
            (Term::Zero | Term::Succ(_), other) | (other, _) => {
                return Err(Error::TypeError(format!(
                    "expected natural, found {}",
                    other.kind()
                )));
            }
        }
    }
}

/// Lexicographic comparison of two lists of naturals, position by position up
/// to the shorter length.
///
/// Lists that agree on every shared position compare equal even when their
/// lengths differ: `[1 2]` and `[1 2 3]` are equal.
pub fn compare_nat_lists(xs: &Term, ys: &Term) -> Result<Ordering, Error> {
    for (x, y) in xs.list_iter().zip(ys.list_iter()) {
        match compare_nats(x?, y?)? {
            Ordering::Equal => continue,
            unequal => return Ok(unequal),
        }
    }
    // Surface an improper tail on either side even when the prefix matched
    list_items(xs)?;
    list_items(ys)?;
    Ok(Ordering::Equal)
}

/// Stable merge sort with a fallible comparator.
///
/// On ties the element from the left half is taken first, which keeps equal
/// elements in their original relative order.
fn merge_sort_by<F>(items: Vec<Term>, cmp: &mut F) -> Result<Vec<Term>, Error>
where
    F: FnMut(&Term, &Term) -> Result<Ordering, Error>,
{
    if items.len() <= 1 {
        return Ok(items);
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, cmp)?;
    let right = merge_sort_by(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r)? != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    Ok(merged)
}

//
// Library Function Implementations
//

fn lib_not(b: bool) -> bool {
    !b
}

fn lib_and(a: bool, b: bool) -> bool {
    a && b
}

fn lib_or(a: bool, b: bool) -> bool {
    a || b
}

fn lib_succ(n: Term) -> Result<Term, Error> {
    match n {
        Term::Zero | Term::Succ(_) => Ok(succ(n)),
        other => Err(Error::TypeError(format!(
            "expected natural, found {}",
            other.kind()
        ))),
    }
}

fn lib_nat_cmp(a: Term, b: Term) -> Result<Ordering, Error> {
    compare_nats(&a, &b)
}

// Macro to generate the boolean comparisons derived from `nat-cmp`
macro_rules! nat_comparison {
    ($name:ident, $test:expr) => {
        fn $name(a: Term, b: Term) -> Result<bool, Error> {
            compare_nats(&a, &b).map($test)
        }
    };
}

nat_comparison!(lib_nat_eq, Ordering::is_eq);
nat_comparison!(lib_nat_ne, Ordering::is_ne);
nat_comparison!(lib_nat_lt, Ordering::is_lt);
nat_comparison!(lib_nat_le, Ordering::is_le);
nat_comparison!(lib_nat_gt, Ordering::is_gt);
nat_comparison!(lib_nat_ge, Ordering::is_ge);

fn lib_cons(head: Term, tail: Term) -> Result<Term, Error> {
    match tail {
        Term::Nil | Term::Cons(..) => Ok(cons(head, tail)),
        other => Err(Error::TypeError(format!(
            "cons requires a list as second argument, found {}",
            other.kind()
        ))),
    }
}

fn lib_pair(x: Term, y: Term) -> Term {
    pair(x, y)
}

fn lib_triple(x: Term, y: Term, z: Term) -> Term {
    triple(x, y, z)
}

// Macro to generate positional accessors for pairs and triples
macro_rules! accessor {
    ($name:ident, $pattern:pat => $slot:ident, $kind:literal) => {
        fn $name(term: Term) -> Result<Term, Error> {
            match &term {
                $pattern => Ok(Term::clone($slot)),
                other => Err(Error::TypeError(format!(
                    concat!("expected ", $kind, ", found {}"),
                    other.kind()
                ))),
            }
        }
    };
}

accessor!(lib_pair_fst, Term::Pair(x, _) => x, "pair");
accessor!(lib_pair_snd, Term::Pair(_, y) => y, "pair");
accessor!(lib_triple_fst, Term::Triple(x, _, _) => x, "triple");
accessor!(lib_triple_snd, Term::Triple(_, y, _) => y, "triple");
accessor!(lib_triple_thd, Term::Triple(_, _, z) => z, "triple");

fn lib_triple_map_fst(f: Term, t: Term) -> Result<Term, Error> {
    let (x, y, z) = decode_triple(&t)?;
    Ok(triple(apply(&f, vec![x])?, y, z))
}

fn lib_triple_map_snd(f: Term, t: Term) -> Result<Term, Error> {
    let (x, y, z) = decode_triple(&t)?;
    Ok(triple(x, apply(&f, vec![y])?, z))
}

fn lib_triple_map_thd(f: Term, t: Term) -> Result<Term, Error> {
    let (x, y, z) = decode_triple(&t)?;
    Ok(triple(x, y, apply(&f, vec![z])?))
}

fn lib_foldr(f: Term, z: Term, xs: Term) -> Result<Term, Error> {
    let items = list_items(&xs)?;
    items
        .into_iter()
        .rev()
        .try_fold(z, |acc, x| apply(&f, vec![x.clone(), acc]))
}

fn lib_concat(xs: Term, ys: Term) -> Result<Term, Error> {
    // Validate the second list too, the result must be a proper list
    list_items(&ys)?;
    let items = list_items(&xs)?;
    Ok(items
        .into_iter()
        .rev()
        .fold(ys, |tail, head| cons(head.clone(), tail)))
}

fn lib_zip_with(f: Term, xs: Term, ys: Term) -> Result<Term, Error> {
    let xs = list_items(&xs)?;
    let ys = list_items(&ys)?;
    let combined = xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| apply(&f, vec![x.clone(), y.clone()]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_list(combined))
}

fn lib_map(f: Term, xs: Term) -> Result<Term, Error> {
    let mapped = xs
        .list_iter()
        .map(|x| apply(&f, vec![x?.clone()]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_list(mapped))
}

fn lib_filter(pred: Term, xs: Term) -> Result<Term, Error> {
    let mut kept = Vec::new();
    for x in xs.list_iter() {
        let x = x?;
        if apply_predicate(&pred, vec![x.clone()])? {
            kept.push(x.clone());
        }
    }
    Ok(encode_list(kept))
}

fn lib_any(pred: Term, xs: Term) -> Result<bool, Error> {
    for x in xs.list_iter() {
        if apply_predicate(&pred, vec![x?.clone()])? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn lib_all(pred: Term, xs: Term) -> Result<bool, Error> {
    for x in xs.list_iter() {
        if !apply_predicate(&pred, vec![x?.clone()])? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn lib_pairs(xs: Term) -> Result<Term, Error> {
    let items = list_items(&xs)?;
    let mut result = Vec::new();
    for (i, x) in items.iter().enumerate() {
        for y in &items[i + 1..] {
            result.push(pair((*x).clone(), (*y).clone()));
        }
    }
    Ok(encode_list(result))
}

fn lib_group_by(eq: Term, xs: Term) -> Result<Term, Error> {
    let mut groups: Vec<Vec<Term>> = Vec::new();
    for x in xs.list_iter() {
        let x = x?;
        // Each element is compared with the first element of the current run
        let joins_current = match groups.last().and_then(|run| run.first()) {
            Some(first) => apply_predicate(&eq, vec![first.clone(), x.clone()])?,
            None => false,
        };
        match groups.last_mut() {
            Some(run) if joins_current => run.push(x.clone()),
            _ => groups.push(vec![x.clone()]),
        }
    }
    Ok(encode_list(groups.into_iter().map(encode_list)))
}

fn lib_list_nat_cmp(xs: Term, ys: Term) -> Result<Ordering, Error> {
    compare_nat_lists(&xs, &ys)
}

fn lib_list_nat_eq(xs: Term, ys: Term) -> Result<bool, Error> {
    compare_nat_lists(&xs, &ys).map(Ordering::is_eq)
}

fn lib_sort_by(cmp: Term, xs: Term) -> Result<Term, Error> {
    let items = decode_list(&xs)?;
    let sorted = merge_sort_by(items, &mut |a, b| apply_comparator(&cmp, a, b))?;
    Ok(encode_list(sorted))
}

fn lib_take(n: u64, xs: Term) -> Result<Term, Error> {
    let n = usize::try_from(n).unwrap_or(usize::MAX);
    let taken = xs
        .list_iter()
        .take(n)
        .map(|x| x.cloned())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_list(taken))
}

/// Global registry of all library operations.
///
/// Every entry is wired through the typed adapter layer once, at first use.
static LIBRARY_OPS: LazyLock<Vec<LibraryOp>> = LazyLock::new(|| {
    fn op<Args, F>(name: &'static str, arity: usize, f: F) -> LibraryOp
    where
        F: IntoOperation<Args>,
    {
        LibraryOp {
            name,
            arity,
            op: f.into_operation(),
        }
    }

    vec![
        // Boolean operations
        op::<(bool,), _>("not", 1, lib_not),
        op::<(bool, bool), _>("and", 2, lib_and),
        op::<(bool, bool), _>("or", 2, lib_or),
        // Natural numbers
        op::<(Term,), _>("succ", 1, lib_succ),
        op::<(Term, Term), _>("nat-cmp", 2, lib_nat_cmp),
        op::<(Term, Term), _>("nat-eq", 2, lib_nat_eq),
        op::<(Term, Term), _>("nat-ne", 2, lib_nat_ne),
        op::<(Term, Term), _>("nat-lt", 2, lib_nat_lt),
        op::<(Term, Term), _>("nat-le", 2, lib_nat_le),
        op::<(Term, Term), _>("nat-gt", 2, lib_nat_gt),
        op::<(Term, Term), _>("nat-ge", 2, lib_nat_ge),
        // Pairs and triples
        op::<(Term, Term), _>("pair", 2, lib_pair),
        op::<(Term,), _>("pair-fst", 1, lib_pair_fst),
        op::<(Term,), _>("pair-snd", 1, lib_pair_snd),
        op::<(Term, Term, Term), _>("triple", 3, lib_triple),
        op::<(Term,), _>("triple-fst", 1, lib_triple_fst),
        op::<(Term,), _>("triple-snd", 1, lib_triple_snd),
        op::<(Term,), _>("triple-thd", 1, lib_triple_thd),
        op::<(Term, Term), _>("triple-map-fst", 2, lib_triple_map_fst),
        op::<(Term, Term), _>("triple-map-snd", 2, lib_triple_map_snd),
        op::<(Term, Term), _>("triple-map-thd", 2, lib_triple_map_thd),
        // List operations
        op::<(Term, Term), _>("cons", 2, lib_cons),
        op::<(Term, Term, Term), _>("foldr", 3, lib_foldr),
        op::<(Term, Term), _>("concat", 2, lib_concat),
        op::<(Term, Term, Term), _>("zipWith", 3, lib_zip_with),
        op::<(Term, Term), _>("map", 2, lib_map),
        op::<(Term, Term), _>("filter", 2, lib_filter),
        op::<(Term, Term), _>("any", 2, lib_any),
        op::<(Term, Term), _>("all", 2, lib_all),
        op::<(Term,), _>("pairs", 1, lib_pairs),
        op::<(Term, Term), _>("group-by", 2, lib_group_by),
        op::<(Term, Term), _>("sort-by", 2, lib_sort_by),
        op::<(u64, Term), _>("take", 2, lib_take),
        // List comparisons
        op::<(Term, Term), _>("list-nat-cmp", 2, lib_list_nat_cmp),
        op::<(Term, Term), _>("list-nat-eq", 2, lib_list_nat_eq),
    ]
});

/// Lazy static map from name to LibraryOp (private - use find_op)
static LIBRARY_BY_NAME: LazyLock<HashMap<&'static str, &'static LibraryOp>> =
    LazyLock::new(|| {
        let ops: &'static [LibraryOp] = LIBRARY_OPS.as_slice();
        ops.iter().map(|op| (op.name, op)).collect()
    });

/// All library operations, in registration order
pub fn library_ops() -> &'static [LibraryOp] {
    LIBRARY_OPS.as_slice()
}

/// Find a library operation by name
pub fn find_op(name: &str) -> Option<&'static LibraryOp> {
    LIBRARY_BY_NAME.get(name).copied()
}
