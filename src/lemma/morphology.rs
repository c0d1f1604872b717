//! Morphological analysis interface
//!
//! A [`Morphology`] backend turns one lowercase word of its language into
//! the word's normal forms together with a grammatical class. The
//! lemmatizer uses the class to drop function words.

use crate::error::LemmaError;

/// Languages with a morphology backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Detect the language of a lowercase token by its script
    ///
    /// Returns `None` for empty, mixed-script or non-letter tokens.
    pub fn detect(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }
        if token.chars().all(is_cyrillic_letter) {
            Some(Self::Russian)
        } else if token.chars().all(|c| c.is_ascii_lowercase()) {
            Some(Self::English)
        } else {
            None
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Russian => "russian",
            Self::English => "english",
        }
    }

    /// Function-word classes that never become lemmas in this language
    pub fn is_closed_class(&self, class: WordClass) -> bool {
        match self {
            Self::Russian => matches!(
                class,
                WordClass::Preposition
                    | WordClass::Conjunction
                    | WordClass::Interjection
                    | WordClass::Particle
                    | WordClass::Introductory
            ),
            Self::English => matches!(
                class,
                WordClass::Pronoun
                    | WordClass::Conjunction
                    | WordClass::Particle
                    | WordClass::Preposition
                    | WordClass::Interjection
                    | WordClass::Article
                    | WordClass::Auxiliary
            ),
        }
    }
}

/// Lowercase Cyrillic letters handled by the Russian backend
pub fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'ё')
}

/// Grammatical class reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    Preposition,
    Conjunction,
    Interjection,
    Particle,
    Introductory,
    Pronoun,
    Article,
    Auxiliary,
    /// Any open-class word: noun, verb, adjective, adverb, numeral
    Content,
}

/// One reading of a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordForm {
    /// Dictionary (normal) form
    pub normal_form: String,

    /// Grammatical class of this reading
    pub class: WordClass,
}

impl WordForm {
    pub fn new(normal_form: impl Into<String>, class: WordClass) -> Self {
        Self {
            normal_form: normal_form.into(),
            class,
        }
    }
}

/// Language-specific morphological analyzer
pub trait Morphology: Send + Sync {
    /// Language handled by this backend
    fn language(&self) -> Language;

    /// Analyze one lowercase word of this backend's alphabet
    ///
    /// # Errors
    ///
    /// Returns `LemmaError::MalformedToken` if the word contains characters
    /// outside the backend's alphabet.
    fn analyze(&self, word: &str) -> Result<Vec<WordForm>, LemmaError>;

    /// Reject words the backend cannot analyze
    fn check_alphabet(&self, word: &str) -> Result<(), LemmaError> {
        if Language::detect(word) == Some(self.language()) {
            Ok(())
        } else {
            Err(LemmaError::MalformedToken {
                token: word.to_string(),
                language: self.language().name(),
            })
        }
    }
}
