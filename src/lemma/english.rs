//! Latin-script morphology backend
//!
//! Normal forms come from an irregular-form table and inflectional suffix
//! rules, so `cats` becomes `cat` while derivational words such as
//! `independent` stay intact.

use std::collections::HashMap;

use super::morphology::{Language, Morphology, WordClass, WordForm};
use crate::error::LemmaError;

const ARTICLES: &[&str] = &["a", "an", "the"];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us",
    "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves", "this", "that",
    "these", "those", "who", "whom", "whose", "which", "what", "whatever", "whoever",
    "whichever", "someone", "somebody", "something", "anyone", "anybody", "anything",
    "everyone", "everybody", "everything", "nobody", "nothing", "none", "oneself",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "unless",
    "whereas", "while", "whether", "if", "than", "either", "neither", "both",
];

const PREPOSITIONS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "amid", "among", "amongst",
    "around", "as", "at", "before", "behind", "below", "beneath", "beside", "besides",
    "between", "beyond", "by", "despite", "down", "during", "except", "for", "from", "in",
    "inside", "into", "near", "of", "off", "on", "onto", "out", "outside", "over", "per",
    "since", "through", "throughout", "till", "to", "toward", "towards", "under",
    "underneath", "until", "up", "upon", "via", "with", "within", "without",
];

const PARTICLES: &[&str] = &["not", "no"];

const INTERJECTIONS: &[&str] = &[
    "oh", "ah", "wow", "hey", "hello", "hi", "alas", "oops", "ouch", "hmm", "yes", "yeah",
    "ok", "okay", "bye", "hurray", "ugh",
];

const AUXILIARIES: &[&str] = &[
    "be", "am", "is", "are", "was", "were", "been", "being", "do", "does", "did", "done",
    "doing", "have", "has", "had", "having", "will", "would", "shall", "should", "can",
    "could", "may", "might", "must", "ought",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("goes", "go"),
    ("went", "go"),
    ("gone", "go"),
    ("ran", "run"),
    ("said", "say"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("saw", "see"),
    ("seen", "see"),
    ("came", "come"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("got", "get"),
    ("gotten", "get"),
    ("gave", "give"),
    ("given", "give"),
    ("found", "find"),
    ("told", "tell"),
    ("wrote", "write"),
    ("written", "write"),
    ("bought", "buy"),
    ("brought", "bring"),
];

/// Words ending in `s` that are not plurals
const S_EXCEPTIONS: &[&str] = &[
    "news", "always", "perhaps", "series", "species", "physics", "mathematics", "politics",
    "economics", "lens", "whereas", "thus", "yes", "canvas", "atlas", "chaos", "gas",
];

/// English analyzer using dictionaries and suffix rules
pub struct EnglishMorphology {
    closed: HashMap<&'static str, WordClass>,
    irregular: HashMap<&'static str, &'static str>,
}

impl EnglishMorphology {
    pub fn new() -> Self {
        let mut closed = HashMap::new();
        let lists: [(&[&'static str], WordClass); 7] = [
            (ARTICLES, WordClass::Article),
            (PRONOUNS, WordClass::Pronoun),
            (CONJUNCTIONS, WordClass::Conjunction),
            (PREPOSITIONS, WordClass::Preposition),
            (PARTICLES, WordClass::Particle),
            (INTERJECTIONS, WordClass::Interjection),
            (AUXILIARIES, WordClass::Auxiliary),
        ];
        for (words, class) in lists {
            for word in words {
                closed.entry(*word).or_insert(class);
            }
        }

        Self {
            closed,
            irregular: IRREGULAR.iter().copied().collect(),
        }
    }

    /// Reduce an inflected form to its dictionary form
    fn normal_form(&self, word: &str) -> String {
        if let Some(base) = self.irregular.get(word) {
            return (*base).to_string();
        }
        if S_EXCEPTIONS.contains(&word) || !word.ends_with('s') || word.len() <= 3 {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 2 {
                return format!("{stem}y");
            }
        }
        for suffix in ["sses", "shes", "ches", "xes", "zzes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }

        word[..word.len() - 1].to_string()
    }
}

impl Default for EnglishMorphology {
    fn default() -> Self {
        Self::new()
    }
}

impl Morphology for EnglishMorphology {
    fn language(&self) -> Language {
        Language::English
    }

    fn analyze(&self, word: &str) -> Result<Vec<WordForm>, LemmaError> {
        self.check_alphabet(word)?;

        if let Some(class) = self.closed.get(word) {
            return Ok(vec![WordForm::new(word, *class)]);
        }

        Ok(vec![WordForm::new(self.normal_form(word), WordClass::Content)])
    }
}
