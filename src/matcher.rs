use std::ops::Bound;
use std::sync::Arc;

use crate::variation::VariationSet;

/// Result of matching one normalized fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to score (empty fragment).
    Empty,
    /// Candidate is a strict prefix of an accepted spelling.
    Correct { keystrokes: usize },
    /// Candidate is no accepted spelling's prefix; nothing was committed.
    Incorrect,
    /// Candidate equals an accepted spelling; the word is done.
    Complete { keystrokes: usize, variation: String },
}

impl Outcome {
    pub fn is_scoring(&self) -> bool {
        !matches!(self, Outcome::Empty)
    }
}

/// Incremental prefix matcher for one target word.
#[derive(Debug, Clone)]
pub struct Matcher {
    canonical: String,
    variations: Arc<VariationSet>,
    active: String,
    typed: String,
}

impl Matcher {
    pub fn new(canonical: &str, variations: Arc<VariationSet>) -> Self {
        Self {
            canonical: canonical.to_string(),
            active: canonical.to_string(),
            variations,
            typed: String::new(),
        }
    }

    /// Feed an already-normalized fragment.
    pub fn submit(&mut self, normalized: &str) -> Outcome {
        if normalized.is_empty() {
            return Outcome::Empty;
        }

        let candidate = format!("{}{}", self.typed, normalized);
        let Some(matched) = self.resolve(&candidate) else {
            return Outcome::Incorrect;
        };
        let keystrokes = normalized.chars().count();

        if candidate == matched {
            self.typed = candidate;
            self.active = matched.clone();
            Outcome::Complete {
                keystrokes,
                variation: matched,
            }
        } else {
            self.typed = candidate;
            self.active = matched;
            Outcome::Correct { keystrokes }
        }
    }

    /// Canonical spelling wins whenever it still fits; otherwise an exact
    /// member, then the first member (in set order) extending the candidate.
    fn resolve(&self, candidate: &str) -> Option<String> {
        if self.canonical.starts_with(candidate) {
            return Some(self.canonical.clone());
        }
        if self.variations.contains(candidate) {
            return Some(candidate.to_string());
        }
        // Members sharing a prefix sort contiguously right after it.
        self.variations
            .range::<str, _>((Bound::Included(candidate), Bound::Unbounded))
            .next()
            .filter(|v| v.starts_with(candidate))
            .cloned()
    }

    pub fn typed_prefix(&self) -> &str {
        &self.typed
    }

    /// The spelling currently being followed.
    pub fn active_variation(&self) -> &str {
        &self.active
    }

    /// Untyped remainder of the active spelling.
    pub fn remaining(&self) -> &str {
        self.active.get(self.typed.len()..).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variation::expand;
    use assert_matches::assert_matches;

    fn matcher(romaji: &str) -> Matcher {
        Matcher::new(romaji, Arc::new(expand(romaji)))
    }

    #[test]
    fn test_canonical_char_by_char() {
        let mut m = matcher("abura");
        for c in ["a", "b", "u", "r"] {
            assert_matches!(m.submit(c), Outcome::Correct { keystrokes: 1 });
        }
        assert_eq!(m.typed_prefix(), "abur");
        assert_eq!(m.remaining(), "a");
        assert_matches!(m.submit("a"), Outcome::Complete { keystrokes: 1, ref variation } if variation == "abura");
    }

    #[test]
    fn test_switches_to_alternate_spelling() {
        let mut m = matcher("shika");
        assert_matches!(m.submit("s"), Outcome::Correct { .. });
        assert_eq!(m.active_variation(), "shika");
        assert_matches!(m.submit("i"), Outcome::Correct { .. });
        assert_eq!(m.typed_prefix(), "si");
        assert_eq!(m.active_variation(), "sica");
        assert_eq!(m.remaining(), "ca");
        assert_matches!(m.submit("k"), Outcome::Correct { .. });
        assert_eq!(m.active_variation(), "sika");
        assert_matches!(m.submit("a"), Outcome::Complete { ref variation, .. } if variation == "sika");
    }

    #[test]
    fn test_mismatch_leaves_prefix_untouched() {
        let mut m = matcher("abura");
        m.submit("ab");
        assert_eq!(m.submit("x"), Outcome::Incorrect);
        assert_eq!(m.submit("xyzzy"), Outcome::Incorrect);
        assert_eq!(m.typed_prefix(), "ab");
        assert_eq!(m.active_variation(), "abura");
    }

    #[test]
    fn test_multi_char_fragment_counts_every_char() {
        let mut m = matcher("konnichiwa");
        assert_matches!(m.submit("konni"), Outcome::Correct { keystrokes: 5 });
        assert_matches!(m.submit("tiwa"), Outcome::Complete { keystrokes: 4, .. });
    }

    #[test]
    fn test_empty_fragment_is_not_scored() {
        let mut m = matcher("abura");
        assert_eq!(m.submit(""), Outcome::Empty);
        assert!(!Outcome::Empty.is_scoring());
        assert_eq!(m.typed_prefix(), "");
    }

    #[test]
    fn test_empty_romaji_never_matches() {
        let mut m = matcher("");
        assert_eq!(m.submit("a"), Outcome::Incorrect);
        assert_eq!(m.submit("b"), Outcome::Incorrect);
    }

    #[test]
    fn test_word_final_n_completes_on_canonical() {
        let mut m = matcher("kan");
        m.submit("ka");
        assert_matches!(m.submit("n"), Outcome::Complete { ref variation, .. } if variation == "kan");
    }

    #[test]
    fn test_every_variation_completes_exactly_once() {
        for word in ["konnichiwa", "chuushajou", "fujisan", "tsukue", "shashin"] {
            let set = expand(word);
            for v in set.iter() {
                // a doubled word-final "n" is unreachable: the single "n" completes first
                if set.iter().any(|o| o != v && v.starts_with(o.as_str())) {
                    continue;
                }
                let mut m = Matcher::new(word, Arc::new(set.clone()));
                let chars: Vec<char> = v.chars().collect();
                let mut completes = 0;
                for (i, c) in chars.iter().enumerate() {
                    match m.submit(&c.to_string()) {
                        Outcome::Complete { .. } => {
                            completes += 1;
                            assert_eq!(i, chars.len() - 1, "{word}: {v} completed early");
                        }
                        Outcome::Incorrect => panic!("{word}: {v} rejected at {i}"),
                        _ => {}
                    }
                }
                assert_eq!(completes, 1, "{word}: {v}");
            }
        }
    }
}
