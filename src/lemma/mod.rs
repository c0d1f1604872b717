//! Lemmatization of natural-language text
//!
//! The [`Lemmatizer`] lowercases text, replaces everything except Cyrillic
//! and Latin letters with spaces, splits on whitespace and sends each token
//! to the morphology backend of its script. Tokens of mixed script, tokens
//! of a single letter and function words contribute nothing.
//!
//! # Example
//!
//! ```
//! use sitesearch::lemma::Lemmatizer;
//!
//! let lemmatizer = Lemmatizer::new();
//! let counts = lemmatizer.lemma_frequencies("Cats and dogs, dogs!").unwrap();
//! assert_eq!(counts.get("dog"), Some(&2));
//! assert!(!counts.contains_key("and"));
//! ```

pub mod english;
pub mod morphology;
pub mod russian;

use std::collections::{HashMap, HashSet};

pub use english::EnglishMorphology;
pub use morphology::{Language, Morphology, WordClass, WordForm};
pub use russian::RussianMorphology;

use crate::error::LemmaError;
use morphology::is_cyrillic_letter;

/// Text to lemma normalizer for Russian and English
pub struct Lemmatizer {
    russian: Box<dyn Morphology>,
    english: Box<dyn Morphology>,
}

impl Lemmatizer {
    /// Create a lemmatizer with the built-in backends
    pub fn new() -> Self {
        Self::with_backends(
            Box::new(RussianMorphology::new()),
            Box::new(EnglishMorphology::new()),
        )
    }

    /// Create a lemmatizer with custom backends
    pub fn with_backends(russian: Box<dyn Morphology>, english: Box<dyn Morphology>) -> Self {
        Self { russian, english }
    }

    fn backend(&self, language: Language) -> &dyn Morphology {
        match language {
            Language::Russian => self.russian.as_ref(),
            Language::English => self.english.as_ref(),
        }
    }

    /// Count lemma occurrences in `text`
    ///
    /// # Errors
    ///
    /// Propagates the first morphology error; no partial map is returned.
    pub fn lemma_frequencies(&self, text: &str) -> Result<HashMap<String, usize>, LemmaError> {
        let mut counts = HashMap::new();
        for token in tokens(text) {
            for lemma in self.lemmas_of(&token)? {
                *counts.entry(lemma).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Lemmas of `text` in order of appearance, duplicates kept
    pub fn lemma_sequence(&self, text: &str) -> Result<Vec<String>, LemmaError> {
        let mut sequence = Vec::new();
        for token in tokens(text) {
            sequence.extend(self.lemmas_of(&token)?);
        }
        Ok(sequence)
    }

    /// Canonical forms of a single word
    ///
    /// Returns an empty list for words of an unsupported script, words of
    /// one letter and function words.
    pub fn lemmas_of(&self, word: &str) -> Result<Vec<String>, LemmaError> {
        let word = word.to_lowercase();
        let Some(language) = Language::detect(&word) else {
            return Ok(Vec::new());
        };
        if word.chars().count() <= 1 {
            return Ok(Vec::new());
        }

        let forms = self.backend(language).analyze(&word)?;
        if forms.iter().any(|f| language.is_closed_class(f.class)) {
            return Ok(Vec::new());
        }

        let mut lemmas: Vec<String> = Vec::with_capacity(forms.len());
        for form in forms {
            if !lemmas.contains(&form.normal_form) {
                lemmas.push(form.normal_form);
            }
        }
        Ok(lemmas)
    }

    /// Character offsets of every word in `text` whose lemma is `lemma`
    pub fn occurrence_offsets(&self, text: &str, lemma: &str) -> Result<Vec<usize>, LemmaError> {
        let wanted = HashSet::from([lemma.to_string()]);
        self.occurrences(text, &wanted)
    }

    /// Character offsets of every word in `text` whose lemmas intersect `lemmas`
    ///
    /// Words are delimited by any character that is neither a letter nor a
    /// digit; offsets count characters, not bytes, and are ascending.
    pub fn occurrences(
        &self,
        text: &str,
        lemmas: &HashSet<String>,
    ) -> Result<Vec<usize>, LemmaError> {
        let mut offsets = Vec::new();
        if lemmas.is_empty() {
            return Ok(offsets);
        }

        let mut word = String::new();
        let mut word_start = 0;
        for (index, c) in text.chars().chain(std::iter::once(' ')).enumerate() {
            if c.is_alphanumeric() {
                if word.is_empty() {
                    word_start = index;
                }
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                if self.lemmas_of(&word)?.iter().any(|l| lemmas.contains(l)) {
                    offsets.push(word_start);
                }
                word.clear();
            }
        }
        Ok(offsets)
    }
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, blank out non-letters and split into tokens
fn tokens(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || is_cyrillic_letter(c) || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}
