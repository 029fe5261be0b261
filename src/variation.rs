use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::warn;

/// Upper bound on the number of spellings kept for one word.
pub const MAX_VARIATIONS: usize = 4096;

/// Romanizations longer than this are not expanded at all.
pub const MAX_EXPANDABLE_LEN: usize = 64;

/// Every spelling accepted for a word, in lexicographic order.
pub type VariationSet = BTreeSet<String>;

/// (source spelling, alternate spelling) for the same sound.
const RULES: &[(&str, &str)] = &[
    ("shi", "si"),
    ("chi", "ti"),
    ("tsu", "tu"),
    ("fu", "hu"),
    ("sha", "sya"),
    ("shu", "syu"),
    ("sho", "syo"),
    ("cha", "tya"),
    ("chu", "tyu"),
    ("cho", "tyo"),
    ("ja", "zya"),
    ("ju", "zyu"),
    ("jo", "zyo"),
    ("ji", "zi"),
    ("ka", "ca"),
    ("n", "nn"),
];

// Longest step a single expansion can take: a rule source (3 bytes) or one
// literal utf-8 character (up to 4 bytes).
const MAX_STEP: usize = 4;

/// Every spelling of `canonical` accepted as fully correct input: `shi` may be
/// typed `si`, `chi` as `ti`, a moraic `n` doubled, and so on.
pub fn expand(canonical: &str) -> VariationSet {
    expand_capped(canonical, MAX_VARIATIONS)
}

/// Expand with an explicit ceiling. The canonical spelling is always kept;
/// anything past `cap` is dropped.
///
/// Suffixes are built from the end. Once the set for some suffix is full,
/// the part before it is kept canonical instead of being branched further.
pub fn expand_capped(canonical: &str, cap: usize) -> VariationSet {
    let cap = cap.max(1);

    if canonical.len() > MAX_EXPANDABLE_LEN {
        warn!(
            len = canonical.len(),
            "romaji too long to expand, accepting canonical spelling only"
        );
        return BTreeSet::from([canonical.to_string()]);
    }

    // Expansions of canonical[offset..], filled from the end. Only the
    // next MAX_STEP offsets are ever read, so older entries are dropped.
    let mut suffixes: BTreeMap<usize, VariationSet> = BTreeMap::new();
    suffixes.insert(canonical.len(), BTreeSet::from([String::new()]));

    let mut truncated = false;
    let offsets: Vec<usize> = canonical.char_indices().map(|(i, _)| i).collect();

    for &offset in offsets.iter().rev() {
        let rest = &canonical[offset..];
        let mut acc = BTreeSet::new();
        acc.insert(rest.to_string());

        let mut matched = false;
        for &(source, alternate) in RULES {
            if !rest.starts_with(source) {
                continue;
            }
            matched = true;
            let tails = &suffixes[&(offset + source.len())];
            truncated |= !combine(&mut acc, &[source, alternate], tails, cap);
        }

        if !matched {
            let literal_len = rest.chars().next().map_or(1, char::len_utf8);
            let tails = &suffixes[&(offset + literal_len)];
            truncated |= !combine(&mut acc, &[&rest[..literal_len]], tails, cap);
        }

        if acc.len() >= cap && offset > 0 {
            warn!(romaji = canonical, cap, offset, "variation set full, rest kept canonical");
            let head = &canonical[..offset];
            return acc.into_iter().map(|tail| format!("{head}{tail}")).collect();
        }

        suffixes.insert(offset, acc);
        suffixes.retain(|&k, _| k <= offset + MAX_STEP);
    }

    if truncated {
        warn!(romaji = canonical, cap, "variation set truncated");
    }

    suffixes.remove(&0).unwrap_or_else(|| BTreeSet::from([String::new()]))
}

/// Insert every `head + tail` into `acc`. Returns false if the cap cut it short.
fn combine(acc: &mut VariationSet, heads: &[&str], tails: &VariationSet, cap: usize) -> bool {
    for tail in tails {
        for head in heads {
            let candidate = format!("{head}{tail}");
            if acc.contains(&candidate) {
                continue;
            }
            if acc.len() >= cap {
                return false;
            }
            acc.insert(candidate);
        }
    }
    true
}

/// Memoizes expansions by canonical romaji so a looping word queue does not
/// re-expand words it has already seen.
#[derive(Debug, Default)]
pub struct VariationCache {
    sets: HashMap<String, Arc<VariationSet>>,
}

impl VariationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, canonical: &str) -> Arc<VariationSet> {
        if let Some(set) = self.sets.get(canonical) {
            return Arc::clone(set);
        }
        let set = Arc::new(expand(canonical));
        self.sets.insert(canonical.to_string(), Arc::clone(&set));
        set
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}
