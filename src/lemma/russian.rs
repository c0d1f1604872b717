//! Cyrillic morphology backend
//!
//! Function words are recognised from a closed-class dictionary; every
//! other word is normalised with the Snowball Russian algorithm so that
//! inflected forms of one word share a single lemma.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

use super::morphology::{Language, Morphology, WordClass, WordForm};
use crate::error::LemmaError;

const PREPOSITIONS: &[&str] = &[
    "без", "безо", "близ", "в", "вблизи", "вдоль", "вместо", "вне", "внутри", "во", "возле",
    "вокруг", "вопреки", "вследствие", "для", "до", "за", "из", "изо", "к", "ко", "кроме",
    "между", "меж", "мимо", "на", "над", "надо", "насчет", "о", "об", "обо", "около", "от",
    "ото", "перед", "передо", "пред", "по", "под", "подо", "подле", "после", "посреди", "при",
    "про", "против", "ради", "с", "сверх", "свыше", "сквозь", "со", "согласно", "среди",
    "средь", "у", "через", "чрез", "благодаря", "навстречу", "поперек",
];

const CONJUNCTIONS: &[&str] = &[
    "а", "будто", "да", "зато", "и", "ибо", "или", "иль", "либо", "но", "однако", "пока",
    "поскольку", "словно", "также", "тоже", "хотя", "чем", "что", "чтоб", "чтобы", "если",
    "нежели", "причем", "притом", "едва", "дабы", "когда", "как",
];

const PARTICLES: &[&str] = &[
    "б", "бы", "ведь", "вон", "вот", "даже", "же", "ж", "именно", "ка", "ли", "лишь", "не",
    "неужели", "нет", "ни", "разве", "пусть", "пускай", "уж", "только", "то", "нибудь",
    "будто", "авось", "исключительно",
];

const INTERJECTIONS: &[&str] = &[
    "ага", "ай", "алло", "ах", "браво", "эй", "эх", "ну", "ого", "ой", "ох", "увы", "ура",
    "ух", "фу", "тьфу", "ба", "ишь",
];

const INTRODUCTORY: &[&str] = &[
    "безусловно", "вероятно", "видимо", "возможно", "впрочем", "итак", "кажется", "конечно",
    "кстати", "наверное", "например", "несомненно", "очевидно", "пожалуй", "разумеется",
    "следовательно", "словом", "значит", "естественно", "наконец",
];

/// Russian analyzer backed by a Snowball stemmer
pub struct RussianMorphology {
    stemmer: Stemmer,
    closed: HashMap<&'static str, WordClass>,
}

impl RussianMorphology {
    pub fn new() -> Self {
        let mut closed = HashMap::new();
        // Later lists do not override earlier ones, so ambiguous words keep
        // the class of the list they appear in first.
        let lists: [(&[&'static str], WordClass); 5] = [
            (PREPOSITIONS, WordClass::Preposition),
            (CONJUNCTIONS, WordClass::Conjunction),
            (PARTICLES, WordClass::Particle),
            (INTERJECTIONS, WordClass::Interjection),
            (INTRODUCTORY, WordClass::Introductory),
        ];
        for (words, class) in lists {
            for word in words {
                closed.entry(*word).or_insert(class);
            }
        }

        Self {
            stemmer: Stemmer::create(Algorithm::Russian),
            closed,
        }
    }
}

impl Default for RussianMorphology {
    fn default() -> Self {
        Self::new()
    }
}

impl Morphology for RussianMorphology {
    fn language(&self) -> Language {
        Language::Russian
    }

    fn analyze(&self, word: &str) -> Result<Vec<WordForm>, LemmaError> {
        self.check_alphabet(word)?;

        let folded = word.replace('ё', "е");

        if let Some(class) = self.closed.get(folded.as_str()) {
            return Ok(vec![WordForm::new(folded, *class)]);
        }

        let normal = self.stemmer.stem(&folded).into_owned();
        Ok(vec![WordForm::new(normal, WordClass::Content)])
    }
}
