//! Word lists stored as a JSON array of strings, e.g. `["STOP", "POTS"]`.

use crate::Error;
use log::debug;
use std::fs;
use std::path::Path;

fn parse_error(err: serde_json::Error) -> String {
    format!("expected a JSON array of strings: {err}")
}

/// Parse a JSON array of words
pub fn parse_word_list(json: &str) -> Result<Vec<String>, Error> {
    serde_json::from_str(json).map_err(|err| Error::LoadError(parse_error(err)))
}

/// Read and parse a word list file
pub fn load_word_list(path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|err| Error::LoadError(format!("{}: {err}", path.display())))?;
    let words: Vec<String> = serde_json::from_str(&contents).map_err(|err| {
        Error::LoadError(format!("{}: {}", path.display(), parse_error(err)))
    })?;
    debug!("loaded {} words from {}", words.len(), path.display());
    Ok(words)
}
