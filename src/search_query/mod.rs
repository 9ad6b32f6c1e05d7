mod lexer;
mod phrases;

use serde::{Deserialize, Serialize};

use lexer::Token;
use phrases::PhraseIndex;

/// Axes whose values must be one of the known phrases (topics, bookshelves, system tags).
pub const PHRASE_AXES: &[&str] = &["topic", "bookshelf", "system", "level"];

/// Axes that accept any single-word value.
pub const FACET_AXES: &[&str] = &["uploader", "copyright", "country", "harvestState"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisKind {
    Phrase,
    Facet,
}

fn axis_kind(axis: &str) -> Option<AxisKind> {
    if PHRASE_AXES.contains(&axis) {
        Some(AxisKind::Phrase)
    } else if FACET_AXES.contains(&axis) {
        Some(AxisKind::Facet)
    } else {
        None
    }
}

/// Splits a word such as `topic:Math` into its axis and the text after the colon.
/// Axis keywords are case sensitive.
fn split_axis(token: &Token) -> Option<(&str, AxisKind, &str)> {
    let Token::Word(word) = token else {
        return None;
    };
    let (axis, value) = word.split_once(':')?;
    axis_kind(axis).map(|kind| (axis, kind, value))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    /// Everything that was not recognized, whitespace normalized.
    pub free_text: String,
    /// Recognized `axis:value` phrases in canonical casing.
    pub matched: Vec<String>,
}

struct Found {
    slot: usize,
    seq: usize,
    phrase: String,
}

/// Separate recognized `axis:value` phrases from free text.
///
/// Behavior:
/// - Quoted text is kept as one unit, quotes included
/// - Whitespace after the colon is ignored (`topic: Math`)
/// - Multi-word values take the longest run of words that is a known phrase
/// - Matching is case-insensitive; the spelling from `known` is returned
/// - `matched` follows the order of `known`; facet values (`uploader:` ...) come last
/// - Anything unrecognized stays in `free_text`, including its axis prefix
pub fn split<S: AsRef<str>>(input: &str, known: &[S]) -> SplitResult {
    let index = PhraseIndex::new(known);
    let mut tokens = lexer::tokenize(input);
    let mut found: Vec<Found> = Vec::new();

    // Removing a phrase can make its neighbours adjacent, so repeat until
    // nothing more is extracted.
    loop {
        let consumed = extract(&tokens, &index, &mut found);
        if !consumed.iter().any(|c| *c) {
            break;
        }
        tokens = tokens
            .into_iter()
            .zip(consumed)
            .filter(|(_, c)| !c)
            .map(|(t, _)| t)
            .collect();
    }

    found.sort_by_key(|f| (f.slot, f.seq));

    let free_text = tokens
        .iter()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ");

    log::debug!("split {input:?} -> free_text={free_text:?} matched={}", found.len());

    SplitResult {
        free_text,
        matched: found.into_iter().map(|f| f.phrase).collect(),
    }
}

/// One pass over `tokens`. Returns which tokens were absorbed into phrases.
fn extract(tokens: &[Token], index: &PhraseIndex, found: &mut Vec<Found>) -> Vec<bool> {
    let mut consumed = vec![false; tokens.len()];
    let mut i = 0;

    while i < tokens.len() {
        let Some((axis, kind, head)) = split_axis(&tokens[i]) else {
            i += 1;
            continue;
        };

        // `topic: Math` puts the value in the following token
        let offset = usize::from(head.is_empty());

        let hit = match kind {
            AxisKind::Facet => facet_value(tokens, i, head)
                .map(|value| (format!("{axis}:{value}"), 1)),
            AxisKind::Phrase => longest_phrase(tokens, i, axis, head, index),
        };

        let Some((candidate, words)) = hit else {
            i += 1;
            continue;
        };

        let (slot, phrase) = match index.resolve(&candidate) {
            Some(resolved) => (resolved.slot, resolved.canonical.to_string()),
            // only facets get here: their values need not be known
            None => (index.len(), candidate),
        };

        let last = i + words - 1 + offset;
        consumed[i..=last].iter_mut().for_each(|c| *c = true);

        if !found.iter().any(|f| f.phrase == phrase) {
            let seq = found.len();
            found.push(Found { slot, seq, phrase });
        }

        i = last + 1;
    }

    consumed
}

/// Inner text of a terminated quoted unit.
fn unquoted(token: Option<&Token>) -> Option<&str> {
    match token {
        Some(Token::Quoted(quoted)) if quoted.len() >= 2 && quoted.ends_with('"') => {
            Some(&quoted[1..quoted.len() - 1])
        }
        _ => None,
    }
}

/// A single word, or a quoted unit directly after `axis:`.
fn facet_value<'t>(tokens: &'t [Token], i: usize, head: &'t str) -> Option<&'t str> {
    if !head.is_empty() {
        return Some(head);
    }
    if let Some(value) = unquoted(tokens.get(i + 1)) {
        return Some(value).filter(|v| !v.trim().is_empty());
    }
    match tokens.get(i + 1) {
        Some(Token::Word(next)) if split_axis(&tokens[i + 1]).is_none() => Some(next.as_str()),
        _ => None,
    }
}

/// Value words following an axis token: `head` plus the plain words up to the
/// next axis token or quoted unit. A quoted unit directly after `axis:` is a
/// value of its own.
fn value_words<'t>(tokens: &'t [Token], i: usize, head: &'t str) -> Vec<&'t str> {
    if head.is_empty() {
        if let Some(value) = unquoted(tokens.get(i + 1)) {
            return vec![value];
        }
    }

    let mut words = Vec::new();
    if !head.is_empty() {
        words.push(head);
    }
    for token in &tokens[i + 1..] {
        if token.is_quoted() || split_axis(token).is_some() {
            break;
        }
        words.push(token.text());
    }
    words
}

fn longest_phrase(
    tokens: &[Token],
    i: usize,
    axis: &str,
    head: &str,
    index: &PhraseIndex,
) -> Option<(String, usize)> {
    let words = value_words(tokens, i, head);
    (1..=words.len()).rev().find_map(|n| {
        let candidate = format!("{axis}:{}", words[..n].join(" "));
        index.resolve(&candidate).map(|_| (candidate, n))
    })
}
