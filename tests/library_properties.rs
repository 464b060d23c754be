//! Property-based tests for the library operations.
//!
//! Each operation is driven through the term environment and compared against
//! the equivalent computation on native Rust values.

use derangements::Error;
use derangements::codec::{
    Codec, decode_bool, decode_list, decode_nat, decode_ord, decode_triple, encode_list,
    encode_triple,
};
use derangements::env::{Environment, create_term_env};
use derangements::term::Term;
use proptest::prelude::*;
use std::cmp::Ordering;

fn call(env: &Environment, name: &str, args: Vec<Term>) -> Term {
    env.call(name, args)
        .unwrap_or_else(|err| panic!("{name} failed: {err}"))
}

fn op(env: &Environment, name: &str) -> Term {
    env.lookup(name)
        .unwrap_or_else(|err| panic!("{err}"))
        .clone()
}

fn hosts(xs: &[i64]) -> Term {
    encode_list(xs.iter().copied().map(Term::from))
}

fn decode_hosts(term: &Term) -> Vec<i64> {
    decode_list(term)
        .unwrap_or_else(|err| panic!("{err}"))
        .into_iter()
        .map(|t| i64::try_from(t).unwrap_or_else(|err| panic!("{err}")))
        .collect()
}

fn nats(codec: &mut Codec, xs: &[i64]) -> Term {
    codec
        .encode_nats(xs.iter().copied())
        .unwrap_or_else(|err| panic!("{err}"))
}

fn decode_nats(term: &Term) -> Vec<u64> {
    decode_list(term)
        .unwrap_or_else(|err| panic!("{err}"))
        .iter()
        .map(|t| decode_nat(t).unwrap_or_else(|err| panic!("{err}")))
        .collect()
}

/// Reference lexicographic comparison that treats an exhausted side as equal
fn cmp_shared_prefix(xs: &[i64], ys: &[i64]) -> Ordering {
    xs.iter()
        .zip(ys)
        .map(|(x, y)| x.cmp(y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn small_ints() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..=100, 0..20)
}

// =============================================================================
// Natural Numbers
// =============================================================================

proptest! {
    /// nat-cmp agrees with integer comparison
    #[test]
    fn prop_nat_cmp(n in 0i64..=100, m in 0i64..=100) {
        let env = create_term_env();
        let mut codec = Codec::new();
        let args = vec![codec.encode_nat(n)?, codec.encode_nat(m)?];
        let ord = decode_ord(&call(&env, "nat-cmp", args))?;
        prop_assert_eq!(ord, n.cmp(&m) as i8);
    }

    /// Every derived comparison matches its integer counterpart
    #[test]
    fn prop_derived_nat_comparisons(n in 0i64..=50, m in 0i64..=50) {
        let env = create_term_env();
        let mut codec = Codec::new();
        let (tn, tm) = (codec.encode_nat(n)?, codec.encode_nat(m)?);
        let check = |name: &str| decode_bool(&call(&env, name, vec![tn.clone(), tm.clone()]));
        prop_assert_eq!(check("nat-eq")?, n == m);
        prop_assert_eq!(check("nat-ne")?, n != m);
        prop_assert_eq!(check("nat-lt")?, n < m);
        prop_assert_eq!(check("nat-le")?, n <= m);
        prop_assert_eq!(check("nat-gt")?, n > m);
        prop_assert_eq!(check("nat-ge")?, n >= m);
    }
}

// =============================================================================
// Triples
// =============================================================================

proptest! {
    /// Mapping each slot applies the function to that slot only
    #[test]
    fn prop_triple_mappers(x in -10_000i64..10_000, y in -10_000i64..10_000, z in -10_000i64..10_000) {
        let env = create_term_env();
        let f = Term::operation::<(i64,), _>("inc", |n: i64| n + 1);
        let g = Term::operation::<(i64,), _>("square", |n: i64| n * n);
        let h = Term::operation::<(i64,), _>("negate", |n: i64| -n);

        let t = encode_triple((x.into(), y.into(), z.into()));
        let t = call(&env, "triple-map-fst", vec![f, t]);
        let t = call(&env, "triple-map-snd", vec![g, t]);
        let t = call(&env, "triple-map-thd", vec![h, t]);

        let (a, b, c) = decode_triple(&t)?;
        prop_assert_eq!(
            (i64::try_from(a)?, i64::try_from(b)?, i64::try_from(c)?),
            (x + 1, y * y, -z)
        );
    }
}

// =============================================================================
// Lists
// =============================================================================

proptest! {
    /// foldr with cons and nil rebuilds the list
    #[test]
    fn prop_foldr_identity(xs in small_ints()) {
        let env = create_term_env();
        let list = hosts(&xs);
        let rebuilt = call(&env, "foldr", vec![op(&env, "cons"), op(&env, "nil"), list.clone()]);
        prop_assert_eq!(rebuilt, list);
    }

    /// foldr with addition sums the list
    #[test]
    fn prop_foldr_sum(xs in small_ints()) {
        let env = create_term_env();
        let add = Term::operation::<(i64, i64), _>("add", |a: i64, b: i64| a + b);
        let sum = call(&env, "foldr", vec![add, Term::from(0i64), hosts(&xs)]);
        prop_assert_eq!(i64::try_from(sum)?, xs.iter().sum::<i64>());
    }

    #[test]
    fn prop_concat(xs in small_ints(), ys in small_ints()) {
        let env = create_term_env();
        let joined = call(&env, "concat", vec![hosts(&xs), hosts(&ys)]);
        let expected: Vec<i64> = xs.iter().chain(&ys).copied().collect();
        prop_assert_eq!(decode_hosts(&joined), expected);
    }

    /// zipWith stops at the shorter list
    #[test]
    fn prop_zip_with_sum(xs in small_ints(), ys in small_ints()) {
        let env = create_term_env();
        let add = Term::operation::<(i64, i64), _>("add", |a: i64, b: i64| a + b);
        let summed = call(&env, "zipWith", vec![add, hosts(&xs), hosts(&ys)]);
        let expected: Vec<i64> = xs.iter().zip(&ys).map(|(x, y)| x + y).collect();
        prop_assert_eq!(decode_hosts(&summed), expected);
    }

    #[test]
    fn prop_map_square(xs in small_ints()) {
        let env = create_term_env();
        let square = Term::operation::<(i64,), _>("square", |n: i64| n * n);
        let mapped = call(&env, "map", vec![square, hosts(&xs)]);
        let expected: Vec<i64> = xs.iter().map(|x| x * x).collect();
        prop_assert_eq!(decode_hosts(&mapped), expected);
    }

    #[test]
    fn prop_filter_threshold(xs in small_ints(), threshold in 0i64..=100) {
        let env = create_term_env();
        let below = Term::operation::<(i64,), _>("below", move |n: i64| n < threshold);
        let kept = call(&env, "filter", vec![below, hosts(&xs)]);
        let expected: Vec<i64> = xs.iter().copied().filter(|x| *x < threshold).collect();
        prop_assert_eq!(decode_hosts(&kept), expected);
    }

    #[test]
    fn prop_any_all_threshold(
        xs in prop::collection::vec(-20i64..=10, 0..20),
        threshold in -10i64..=20,
    ) {
        let env = create_term_env();
        let above = Term::operation::<(i64,), _>("above", move |n: i64| n > threshold);
        let at_least = Term::operation::<(i64,), _>("at-least", move |n: i64| n >= threshold);
        prop_assert_eq!(
            decode_bool(&call(&env, "any", vec![above, hosts(&xs)]))?,
            xs.iter().any(|x| *x > threshold)
        );
        prop_assert_eq!(
            decode_bool(&call(&env, "all", vec![at_least, hosts(&xs)]))?,
            xs.iter().all(|x| *x >= threshold)
        );
    }

    /// pairs yields every i < j combination in order
    #[test]
    fn prop_pairs(xs in prop::collection::vec(0i64..=100, 0..10)) {
        let env = create_term_env();
        let combos = call(&env, "pairs", vec![hosts(&xs)]);
        let actual: Vec<(i64, i64)> = decode_list(&combos)?
            .into_iter()
            .map(|p| -> Result<(i64, i64), Error> {
                let fst = call(&env, "pair-fst", vec![p.clone()]);
                let snd = call(&env, "pair-snd", vec![p]);
                Ok((i64::try_from(fst)?, i64::try_from(snd)?))
            })
            .collect::<Result<_, _>>()?;

        let mut expected = Vec::new();
        for i in 0..xs.len() {
            for j in i + 1..xs.len() {
                expected.push((xs[i], xs[j]));
            }
        }
        prop_assert_eq!(actual, expected);
    }

    /// group-by with equality splits the list into maximal runs
    #[test]
    fn prop_group_by_equality(xs in prop::collection::vec(0i64..=5, 0..20)) {
        let env = create_term_env();
        let same = Term::operation::<(i64, i64), _>("same", |a: i64, b: i64| a == b);
        let grouped = call(&env, "group-by", vec![same, hosts(&xs)]);
        let actual: Vec<Vec<i64>> = decode_list(&grouped)?.iter().map(decode_hosts).collect();

        let mut expected: Vec<Vec<i64>> = Vec::new();
        for &x in &xs {
            match expected.last_mut() {
                Some(run) if run[0] == x => run.push(x),
                _ => expected.push(vec![x]),
            }
        }
        prop_assert_eq!(actual, expected);
    }

    /// list-nat-cmp compares the shared prefix only
    #[test]
    fn prop_list_nat_cmp(
        xs in prop::collection::vec(0i64..=10, 0..8),
        ys in prop::collection::vec(0i64..=10, 0..8),
    ) {
        let env = create_term_env();
        let mut codec = Codec::new();
        let args = vec![nats(&mut codec, &xs), nats(&mut codec, &ys)];
        let ord = decode_ord(&call(&env, "list-nat-cmp", args))?;
        prop_assert_eq!(ord, cmp_shared_prefix(&xs, &ys) as i8);
    }

    #[test]
    fn prop_sort_by_nat_cmp(xs in prop::collection::vec(0i64..=10, 0..=7)) {
        let env = create_term_env();
        let mut codec = Codec::new();
        let sorted = call(&env, "sort-by", vec![op(&env, "nat-cmp"), nats(&mut codec, &xs)]);
        let mut expected: Vec<u64> = xs.iter().map(|x| *x as u64).collect();
        expected.sort_unstable();
        prop_assert_eq!(decode_nats(&sorted), expected);
    }
}

#[test]
fn test_any_all_fixed() {
    let env = create_term_env();
    let over_five = || Term::operation::<(i64,), _>("over-five", |n: i64| n > 5);
    let cases: Vec<(&str, Vec<i64>, bool)> = vec![
        ("any", vec![], false),
        ("any", vec![1, 2, 3], false),
        ("any", vec![1, 6, 3], true),
        ("all", vec![], true),
        ("all", vec![6, 7, 8], true),
        ("all", vec![6, 4, 8], false),
    ];
    for (name, xs, expected) in cases {
        let result = call(&env, name, vec![over_five(), hosts(&xs)]);
        assert_eq!(result, Term::Bool(expected), "{name} {xs:?}");
    }
}
