use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;

use crate::error::WordListError;

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

/// A single target word: what is shown and how it is canonically typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: String,
    pub display: String,
    pub romaji: String,
}

impl WordRecord {
    pub fn new(id: impl Into<String>, display: impl Into<String>, romaji: &str) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            romaji: canonical_romaji(romaji),
        }
    }

    /// Parse a `DISPLAY=ROMAJI` pair as given on the command line.
    pub fn parse_pair(id: impl Into<String>, pair: &str) -> Result<Self, WordListError> {
        let Some((display, romaji)) = pair.split_once('=') else {
            return Err(WordListError::MissingSeparator(pair.to_string()));
        };
        let display = display.trim();
        if display.is_empty() || romaji.trim().is_empty() {
            return Err(WordListError::EmptyField(pair.to_string()));
        }
        Ok(Self::new(id, display, romaji))
    }

    /// Number of characters in the canonical romanization.
    pub fn romaji_len(&self) -> usize {
        self.romaji.chars().count()
    }
}

/// Whitespace stripped, lowercased.
pub fn canonical_romaji(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Deserialize, Debug)]
struct WordSetFile {
    #[allow(dead_code)]
    name: String,
    words: Vec<WordSetEntry>,
}

#[derive(Deserialize, Debug)]
struct WordSetEntry {
    display: String,
    romaji: String,
}

/// Names of the word sets embedded in the binary.
pub fn builtin_sets() -> Vec<String> {
    let mut names: Vec<String> = WORDS_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .filter_map(|s| s.to_str())
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Load an embedded word set by name. Ids are assigned by position.
pub fn load_builtin(name: &str) -> Result<Vec<WordRecord>, WordListError> {
    let file = WORDS_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| WordListError::UnknownSet(name.to_string()))?;
    let text = file
        .contents_utf8()
        .ok_or_else(|| WordListError::NotUtf8(name.to_string()))?;
    let set: WordSetFile = from_str(text)?;

    Ok(set
        .words
        .into_iter()
        .enumerate()
        .map(|(i, w)| WordRecord::new((i + 1).to_string(), w.display, &w.romaji))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_new_canonicalizes_romaji() {
        let w = WordRecord::new("1", "こんにちは", " Kon Nichi wa ");
        assert_eq!(w.romaji, "konnichiwa");
        assert_eq!(w.romaji_len(), 10);
    }

    #[test]
    fn test_parse_pair_splits_on_first_equals() {
        let w = WordRecord::parse_pair("7", "油=abura").unwrap();
        assert_eq!(w.id, "7");
        assert_eq!(w.display, "油");
        assert_eq!(w.romaji, "abura");
    }

    #[test]
    fn test_parse_pair_rejects_missing_separator() {
        assert_matches!(
            WordRecord::parse_pair("1", "abura"),
            Err(WordListError::MissingSeparator(_))
        );
    }

    #[test]
    fn test_parse_pair_rejects_empty_romaji() {
        assert_matches!(
            WordRecord::parse_pair("1", "油=  "),
            Err(WordListError::EmptyField(_))
        );
    }

    #[test]
    fn test_default_set_is_embedded() {
        let words = load_builtin("default").unwrap();
        assert!(!words.is_empty());
        assert_eq!(words[0].display, "こんにちは");
        assert_eq!(words[0].romaji, "konnichiwa");
        assert!(words.iter().all(|w| !w.romaji.contains(' ')));
    }

    #[test]
    fn test_builtin_sets_lists_embedded_files() {
        let sets = builtin_sets();
        assert!(sets.contains(&"default".to_string()));
        assert!(sets.contains(&"pro".to_string()));
    }

    #[test]
    fn test_unknown_set_is_an_error() {
        assert_matches!(
            load_builtin("klingon"),
            Err(WordListError::UnknownSet(name)) if name == "klingon"
        );
    }
}
