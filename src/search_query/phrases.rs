use std::collections::HashMap;

/// Case-insensitive lookup over the known special phrases of one split.
pub struct PhraseIndex<'a> {
    by_lower: HashMap<String, Vec<(usize, &'a str)>>,
    len: usize,
}

/// A known phrase resolved from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a> {
    /// Position of the first case-insensitive match in the known list.
    pub slot: usize,
    pub canonical: &'a str,
}

impl<'a> PhraseIndex<'a> {
    pub fn new<S: AsRef<str>>(known: &'a [S]) -> Self {
        let mut by_lower: HashMap<String, Vec<(usize, &'a str)>> = HashMap::new();
        for (pos, phrase) in known.iter().enumerate() {
            let phrase = phrase.as_ref();
            by_lower
                .entry(phrase.to_lowercase())
                .or_default()
                .push((pos, phrase));
        }
        PhraseIndex {
            by_lower,
            len: known.len(),
        }
    }

    /// Number of phrases in the known list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Resolve `candidate` to its canonical spelling.
    ///
    /// An exact-case entry wins over other case variants, otherwise the first
    /// entry in list order is used.
    pub fn resolve(&self, candidate: &str) -> Option<Resolved<'a>> {
        let entries = self.by_lower.get(&candidate.to_lowercase())?;
        let (slot, first) = *entries.first()?;
        let canonical = entries
            .iter()
            .find(|(_, phrase)| *phrase == candidate)
            .map(|(_, phrase)| *phrase)
            .unwrap_or(first);
        Some(Resolved { slot, canonical })
    }
}
