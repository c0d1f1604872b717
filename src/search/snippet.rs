//! Highlighted snippets
//!
//! Occurrences of the query lemmas are located in the page text and
//! visited in random order. Each visited occurrence seeds a cluster that
//! absorbs the occurrences following it closely, is widened by a few words
//! on either side and has its matched words wrapped in `<b>`. Fragments are
//! returned longest first, so which matches are shown varies between calls.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::error::LemmaError;
use crate::lemma::Lemmatizer;

/// Default number of fragments in a snippet
pub const DEFAULT_FRAGMENTS: usize = 3;

/// Words of context kept before a cluster
const WORDS_BEFORE: usize = 4;

/// Words of context kept after a cluster
const WORDS_AFTER: usize = 3;

/// Largest gap, in characters, between a cluster end and an absorbed match
const MAX_GAP: usize = 5;

/// Build a snippet of at most `max_fragments` fragments
pub fn build_snippet(
    lemmatizer: &Lemmatizer,
    text: &str,
    lemmas: &HashSet<String>,
    max_fragments: usize,
) -> Result<String, LemmaError> {
    build_snippet_with_rng(lemmatizer, text, lemmas, max_fragments, &mut rand::thread_rng())
}

/// [`build_snippet`] with a caller-supplied random source
pub fn build_snippet_with_rng<R: Rng + ?Sized>(
    lemmatizer: &Lemmatizer,
    text: &str,
    lemmas: &HashSet<String>,
    max_fragments: usize,
    rng: &mut R,
) -> Result<String, LemmaError> {
    let mut offsets = lemmatizer.occurrences(text, lemmas)?;
    offsets.shuffle(rng);

    let chars: Vec<char> = text.chars().collect();
    let mut fragments = Vec::new();
    let mut i = 0;

    while i < offsets.len() && fragments.len() < max_fragments {
        let start = offsets[i];
        let mut end = word_end(&chars, start);

        let mut next = i + 1;
        while next < offsets.len() && offsets[next] > end && offsets[next] - end < MAX_GAP {
            end = word_end(&chars, offsets[next]);
            next += 1;
        }
        i = next;

        fragments.push(fragment(&chars, start, end));
    }

    fragments.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    Ok(fragments.join(" "))
}

/// Render one cluster with its context
fn fragment(chars: &[char], start: usize, end: usize) -> String {
    let from = words_back(chars, start, WORDS_BEFORE);
    let to = words_forward(chars, end, WORDS_AFTER);

    let before: String = chars[from..start].iter().collect();
    let matched: String = chars[start..end].iter().collect();
    let after: String = chars[end..to].iter().collect();

    format!("...{}<b>{matched}</b>{}...", before.trim_start(), after.trim_end())
}

/// Index just past the word starting at `start`
fn word_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_alphanumeric())
        .map_or(chars.len(), |p| start + p)
}

/// Start of the `n`-th whitespace-separated word before `pos`
fn words_back(chars: &[char], mut pos: usize, n: usize) -> usize {
    for _ in 0..n {
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
    }
    pos
}

/// End of the `n`-th whitespace-separated word after `pos`
fn words_forward(chars: &[char], mut pos: usize, n: usize) -> usize {
    for _ in 0..n {
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }
        while pos < chars.len() && !chars[pos].is_whitespace() {
            pos += 1;
        }
    }
    pos
}
