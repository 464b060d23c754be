//! Direct anagram derangement search.
//!
//! Words are bucketed by their letters sorted into code point order. Within each
//! bucket every `(i < j)` pair of words is checked, and a pair is reported when
//! the two words differ at every position of the comparison window:
//!
//! ```text
//! STOP SPOT POTS TOPS     bucket key "OPST"
//! STOP/POTS               S≠P T≠O O≠T P≠S  => derangement
//! STOP/SPOT               S=S              => rejected
//! ```
//!
//! Buckets are visited in the order their first word appeared and words keep
//! their input order inside a bucket, so the output is deterministic.

use crate::{DERANGEMENT_WINDOW, Error};
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::iter::FusedIterator;

/// Settings shared by the direct finder and the encoded pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    /// Number of leading positions that must all differ
    pub window: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        FinderConfig {
            window: DERANGEMENT_WINDOW,
        }
    }
}

/// Two anagrams that share no letter at any position of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerangementPair(pub String, pub String);

impl fmt::Display for DerangementPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

/// Canonical bucket key: the word's letters sorted by code point
pub fn anagram_key(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

/// Words grouped by anagram key, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnagramBuckets {
    index: HashMap<String, usize>,
    buckets: Vec<(String, Vec<String>)>,
}

impl AnagramBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `word` to the bucket for its key, creating the bucket if needed
    pub fn insert(&mut self, word: &str) {
        let key = anagram_key(word);
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(word.to_owned()),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![word.to_owned()]));
            }
        }
    }

    /// Words sharing `key`, in input order
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// `(key, words)` for every bucket, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets
            .iter()
            .map(|(key, words)| (key.as_str(), words.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AnagramBuckets {
    fn from_iter<I: IntoIterator<Item = S>>(words: I) -> Self {
        let mut buckets = AnagramBuckets::new();
        for word in words {
            buckets.insert(word.as_ref());
        }
        buckets
    }
}

/// Iterator over all `(items[i], items[j])` with `i < j`, see [`pairs`]
pub struct Pairs<'a, T> {
    items: &'a [T],
    i: usize,
    j: usize,
}

/// Enumerate index combinations `i < j`: outer index ascending, then inner
pub fn pairs<T>(items: &[T]) -> Pairs<'_, T> {
    Pairs { items, i: 0, j: 1 }
}

impl<'a, T> Iterator for Pairs<'a, T> {
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.items.len() {
            if self.j < self.items.len() {
                let pair = (&self.items[self.i], &self.items[self.j]);
                self.j += 1;
                return Some(pair);
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

impl<T> FusedIterator for Pairs<'_, T> {}

/// True if `x` and `y` differ at every one of the first `window` positions.
///
/// Both words must have at least `window` characters, see [`ensure_window`].
pub fn is_derangement(x: &str, y: &str, window: usize) -> bool {
    x.chars()
        .zip(y.chars())
        .take(window)
        .all(|(a, b)| a != b)
}

/// Reject any word too short for the comparison window
pub fn ensure_window<S: AsRef<str>>(words: &[S], window: usize) -> Result<(), Error> {
    match words
        .iter()
        .map(AsRef::as_ref)
        .find(|word| word.chars().count() < window)
    {
        Some(word) => Err(Error::InvalidInput(format!(
            "word {word:?} is shorter than the comparison window of {window}"
        ))),
        None => Ok(()),
    }
}

/// Reject a word list whose words do not all have the same number of letters
///
/// `list-nat-eq` treats lists that agree on their shared prefix as equal, so
/// the encoded pipeline would group `BA` with `ACB`. Uniform lengths keep its
/// grouping identical to bucketing by [`anagram_key`].
pub fn ensure_uniform_length<S: AsRef<str>>(words: &[S]) -> Result<(), Error> {
    let mut lengths = words.iter().map(|word| (word.as_ref(), word.as_ref().chars().count()));
    let Some((_, expected)) = lengths.next() else {
        return Ok(());
    };
    match lengths.find(|&(_, len)| len != expected) {
        Some((word, len)) => Err(Error::InvalidInput(format!(
            "word {word:?} has {len} letters, expected {expected} like the first word"
        ))),
        None => Ok(()),
    }
}

/// Every derangement pair in `words`, bucket by bucket in enumeration order
pub fn find_derangements<S: AsRef<str>>(
    words: &[S],
    config: &FinderConfig,
) -> Result<Vec<DerangementPair>, Error> {
    ensure_window(words, config.window)?;

    let buckets: AnagramBuckets = words.iter().collect();
    debug!(
        "bucketed {} words into {} anagram classes",
        words.len(),
        buckets.len()
    );

    let mut found = Vec::new();
    for (key, anagrams) in buckets.iter() {
        for (x, y) in pairs(anagrams) {
            if is_derangement(x, y, config.window) {
                trace!("{key}: {x} / {y} is a derangement");
                found.push(DerangementPair(x.clone(), y.clone()));
            }
        }
    }

    debug!("found {} derangement pairs", found.len());
    Ok(found)
}
