//! Derangement search expressed entirely through encoded terms.
//!
//! Every step below runs a library operation looked up by name in an
//! [`Environment`]; Rust only supplies the small glue closures that the
//! operations take as arguments.
//!
//! ```text
//! words  ──map (pair (sort-by nat-cmp w) w)──► [(key, word)]
//!        ──sort-by (list-nat-cmp on key)─────► sorted by key, stable
//!        ──group-by (list-nat-eq on key)─────► runs of anagrams
//!        ──map (map pair-snd)────────────────► [[word]]
//!        ──map pairs─────────────────────────► [[(x, y)]]
//!        ──map (filter deranged)─────────────► [[(x, y)]]
//!        ──filter (any const-true)───────────► non-empty groups only
//! ```
//!
//! `deranged (x, y)` is `all id (zipWith nat-ne (take window x) (take window y))`.

use crate::Error;
use crate::anagram::{DerangementPair, FinderConfig, ensure_uniform_length, ensure_window};
use crate::codec::{Codec, decode_list, decode_pair, decode_string, encode_list};
use crate::env::{Environment, apply};
use crate::term::Term;
use log::debug;

/// Function terms the pipeline looks up once and shares between its closures
#[derive(Clone)]
struct Ops {
    pair: Term,
    fst: Term,
    snd: Term,
    map: Term,
    filter: Term,
    any: Term,
    all: Term,
    zip_with: Term,
    take: Term,
    sort_by: Term,
    nat_cmp: Term,
    nat_ne: Term,
    list_nat_cmp: Term,
    list_nat_eq: Term,
}

impl Ops {
    fn lookup(env: &Environment) -> Result<Self, Error> {
        let get = |name: &str| env.lookup(name).cloned();
        Ok(Ops {
            pair: get("pair")?,
            fst: get("pair-fst")?,
            snd: get("pair-snd")?,
            map: get("map")?,
            filter: get("filter")?,
            any: get("any")?,
            all: get("all")?,
            zip_with: get("zipWith")?,
            take: get("take")?,
            sort_by: get("sort-by")?,
            nat_cmp: get("nat-cmp")?,
            nat_ne: get("nat-ne")?,
            list_nat_cmp: get("list-nat-cmp")?,
            list_nat_eq: get("list-nat-eq")?,
        })
    }

    /// `word -> (sort-by nat-cmp word, word)`
    fn keyed_by_letters(&self) -> Term {
        let ops = self.clone();
        Term::operation::<(Term,), _>(
            "keyed-by-letters",
            move |word: Term| -> Result<Term, Error> {
                let key = apply(&ops.sort_by, vec![ops.nat_cmp.clone(), word.clone()])?;
                apply(&ops.pair, vec![key, word])
            },
        )
    }

    /// Compare two `(key, word)` pairs on their keys with `comparison`
    fn on_keys(&self, id: &str, comparison: &Term) -> Term {
        let (fst, comparison) = (self.fst.clone(), comparison.clone());
        Term::operation::<(Term, Term), _>(
            id,
            move |a: Term, b: Term| -> Result<Term, Error> {
                let ka = apply(&fst, vec![a])?;
                let kb = apply(&fst, vec![b])?;
                apply(&comparison, vec![ka, kb])
            },
        )
    }

    /// Lift a per-element function over a list: `xs -> map f xs`
    fn map_each(&self, id: &str, f: Term) -> Term {
        let map = self.map.clone();
        Term::operation::<(Term,), _>(id, move |xs: Term| apply(&map, vec![f.clone(), xs]))
    }

    /// `xs -> filter pred xs`
    fn filter_each(&self, id: &str, pred: Term) -> Term {
        let filter = self.filter.clone();
        Term::operation::<(Term,), _>(id, move |xs: Term| {
            apply(&filter, vec![pred.clone(), xs])
        })
    }

    /// True when the two words of a pair differ at every windowed position
    fn deranged(&self, window: Term) -> Term {
        let ops = self.clone();
        let id = Term::operation::<(Term,), _>("id", |b: Term| b);
        Term::operation::<(Term,), _>(
            "deranged",
            move |p: Term| -> Result<Term, Error> {
                let x = apply(&ops.fst, vec![p.clone()])?;
                let y = apply(&ops.snd, vec![p])?;
                let x = apply(&ops.take, vec![window.clone(), x])?;
                let y = apply(&ops.take, vec![window.clone(), y])?;
                let differs = apply(&ops.zip_with, vec![ops.nat_ne.clone(), x, y])?;
                apply(&ops.all, vec![id.clone(), differs])
            },
        )
    }

    /// True for any list with at least one element
    fn non_empty(&self) -> Term {
        let any = self.any.clone();
        let const_true = Term::operation::<(Term,), _>("const-true", |_: Term| true);
        Term::operation::<(Term,), _>("non-empty", move |xs: Term| {
            apply(&any, vec![const_true.clone(), xs])
        })
    }
}

/// Group derangement pairs by anagram class using only library operations.
///
/// Groups come out ordered by their sorted-letter key, pairs within a group in
/// `(i < j)` enumeration order of the words' input positions. Classes without
/// any derangement pair are dropped.
///
/// All words must have the same length: `list-nat-eq` only compares the
/// shared prefix of two keys, so mixed lengths would merge distinct classes.
pub fn derangement_groups<S: AsRef<str>>(
    env: &Environment,
    codec: &mut Codec,
    words: &[S],
    config: &FinderConfig,
) -> Result<Vec<Vec<DerangementPair>>, Error> {
    ensure_window(words, config.window)?;
    ensure_uniform_length(words)?;

    let ops = Ops::lookup(env)?;
    let window = i64::try_from(config.window)
        .map_err(|_| Error::InvalidInput(format!("window {} is too large", config.window)))
        .and_then(|n| codec.encode_nat(n))?;

    let encoded = words
        .iter()
        .map(|word| codec.encode_string(word.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "encoded {} words, nat cache reaches {}",
        encoded.len(),
        codec.nat_cache().cached_up_to()
    );

    let keyed = env.call("map", vec![ops.keyed_by_letters(), encode_list(encoded)])?;
    let sorted = env.call(
        "sort-by",
        vec![ops.on_keys("by-key", &ops.list_nat_cmp), keyed],
    )?;
    let classes = env.call(
        "group-by",
        vec![ops.on_keys("same-key", &ops.list_nat_eq), sorted],
    )?;
    let classes = env.call(
        "map",
        vec![ops.map_each("words-of", ops.snd.clone()), classes],
    )?;
    let candidates = env.call("map", vec![env.lookup("pairs")?.clone(), classes])?;
    let deranged = env.call(
        "map",
        vec![
            ops.filter_each("keep-deranged", ops.deranged(window)),
            candidates,
        ],
    )?;
    let groups = env.call("filter", vec![ops.non_empty(), deranged])?;

    let groups = decode_groups(&groups)?;
    debug!(
        "pipeline found {} groups with {} pairs",
        groups.len(),
        groups.iter().map(Vec::len).sum::<usize>()
    );
    Ok(groups)
}

fn decode_groups(groups: &Term) -> Result<Vec<Vec<DerangementPair>>, Error> {
    let mut decoded = Vec::new();
    for group in decode_list(groups)? {
        let mut pairs = Vec::new();
        for p in decode_list(&group)? {
            let (x, y) = decode_pair(&p)?;
            pairs.push(DerangementPair(decode_string(&x)?, decode_string(&y)?));
        }
        decoded.push(pairs);
    }
    Ok(decoded)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::anagram::find_derangements;
    use crate::env::create_term_env;
    use pretty_assertions::assert_eq;

    fn run(words: &[&str], window: usize) -> Result<Vec<Vec<DerangementPair>>, Error> {
        let env = create_term_env();
        let mut codec = Codec::new();
        derangement_groups(&env, &mut codec, words, &FinderConfig { window })
    }

    fn pair(x: &str, y: &str) -> DerangementPair {
        DerangementPair(x.to_owned(), y.to_owned())
    }

    #[test]
    fn test_four_letter_scenario() {
        let groups = run(&["STOP", "SPOT", "POTS", "TOPS"], 4).unwrap();
        assert_eq!(
            groups,
            vec![vec![
                pair("STOP", "POTS"),
                pair("STOP", "TOPS"),
                pair("SPOT", "POTS"),
                pair("SPOT", "TOPS"),
            ]]
        );
    }

    #[test]
    fn test_groups_are_ordered_by_key() {
        // ANGER/RANGE has key AEGNR, HEART/EARTH has key AEHRT
        let words = ["HEART", "RANGE", "LEMON", "EARTH", "MELON", "ANGER"];
        let groups = run(&words, 5).unwrap();
        assert_eq!(
            groups,
            vec![
                vec![pair("RANGE", "ANGER")],
                vec![pair("HEART", "EARTH")],
            ]
        );
    }

    #[test]
    fn test_agrees_with_direct_finder() {
        let words = [
            "STALE", "STEAL", "TALES", "SLATE", "LEAST", "TEALS", "HEART", "EARTH", "HATER",
            "APPLE",
        ];
        let mut from_pipeline: Vec<DerangementPair> =
            run(&words, 5).unwrap().into_iter().flatten().collect();
        let mut direct = find_derangements(&words, &FinderConfig::default()).unwrap();
        from_pipeline.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        direct.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        assert_eq!(from_pipeline, direct);
    }

    #[test]
    fn test_no_derangements() {
        let none: Vec<Vec<DerangementPair>> = Vec::new();
        assert_eq!(run(&["LEMON", "MELON", "APPLE"], 5).unwrap(), none);
        assert_eq!(run(&[], 5).unwrap(), none);
    }

    #[test]
    fn test_invalid_words() {
        assert!(matches!(
            run(&["STOP", "POTS"], 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            run(&["stop", "pots"], 4),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mixed_lengths_are_rejected() {
        // keys AB and ABC agree on their shared prefix
        assert!(matches!(run(&["BA", "ACB"], 2), Err(Error::InvalidInput(_))));
        assert_eq!(
            find_derangements(&["BA", "ACB"], &FinderConfig { window: 2 }).unwrap(),
            Vec::<DerangementPair>::new()
        );

        let env = create_term_env();
        let mut codec = Codec::new();
        let ab = codec.encode_nats([0, 1]).unwrap();
        let abc = codec.encode_nats([0, 1, 2]).unwrap();
        assert_eq!(
            env.call("list-nat-eq", vec![ab, abc]).unwrap(),
            Term::Bool(true)
        );
    }

    #[test]
    fn test_missing_library_operation() {
        let env = Environment::new();
        let mut codec = Codec::new();
        assert_eq!(
            derangement_groups(&env, &mut codec, &["STOP"], &FinderConfig { window: 4 }),
            Err(Error::UnboundOperation("pair".into()))
        );
    }
}
