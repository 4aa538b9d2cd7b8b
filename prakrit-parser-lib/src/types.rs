use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CategoryError;

/// Declares a closed grammatical category with a stable lowercase code, used
/// for serde, parsing attested records and keying the terminology table.
macro_rules! category_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal {
        $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $code)] $variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            /// Category name as used in terminology maps and records.
            pub const CATEGORY: &'static str = $label;

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = CategoryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($code => Ok($name::$variant),)+
                    _ => Err(CategoryError::UnknownValue {
                        category: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

category_enum!(
    /// Word class of an analysis.
    WordClass, "class" {
        Verb => "verb",
        Noun => "noun",
        Participle => "participle",
    }
);

category_enum!(
    /// Word class of an inventory entry. Participle bases are irregular
    /// participle stems listed in their own right (e.g. {kaya} "done").
    RootClass, "root_class" {
        Verb => "verb",
        Noun => "noun",
        ParticipleBase => "participle_base",
    }
);

category_enum!(Tense, "tense" {
    Present => "present",
    Past => "past",
    Future => "future",
});

category_enum!(Mood, "mood" {
    Indicative => "indicative",
    Imperative => "imperative",
    Optative => "optative",
});

category_enum!(Voice, "voice" {
    Active => "active",
    Passive => "passive",
});

category_enum!(Person, "person" {
    First => "first",
    Second => "second",
    Third => "third",
});

category_enum!(
    /// The dual exists for terminology completeness; Prakrit lost it, so
    /// tuples carrying it are rejected.
    Number, "number" {
        Singular => "singular",
        Dual => "dual",
        Plural => "plural",
    }
);

category_enum!(
    /// Grammatical case (vibhakti).
    Case, "case" {
        Nominative => "nominative",
        Accusative => "accusative",
        Instrumental => "instrumental",
        Dative => "dative",
        Ablative => "ablative",
        Genitive => "genitive",
        Locative => "locative",
        Vocative => "vocative",
    }
);

category_enum!(Gender, "gender" {
    Masculine => "masculine",
    Feminine => "feminine",
    Neuter => "neuter",
});

category_enum!(ParticipleKind, "participle" {
    Absolutive => "absolutive",
    Purposive => "purposive",
    Present => "present",
    PastPassive => "past_passive",
});

category_enum!(
    /// Prakrit dialect. `General` marks endings shared by the literary
    /// dialects without a distinctive regional shape.
    #[derive(Default)]
    Dialect, "dialect" {
        #[default]
        General => "general",
        Maharashtri => "maharashtri",
        Shauraseni => "shauraseni",
        Magadhi => "magadhi",
        ArdhaMagadhi => "ardha_magadhi",
    }
);

impl ParticipleKind {
    /// Absolutives and purposives are indeclinable; the others are declined
    /// like nouns.
    pub fn is_declinable(self) -> bool {
        matches!(self, ParticipleKind::Present | ParticipleKind::PastPassive)
    }
}

/// Finite verb categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbCategories {
    pub tense: Tense,
    pub mood: Mood,
    pub voice: Voice,
    pub person: Person,
    pub number: Number,
}

/// Nominal declension: case, gender, number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declension {
    pub case: Case,
    pub gender: Gender,
    pub number: Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipleCategories {
    pub kind: ParticipleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declension: Option<Declension>,
}

/// Grammatical category tuple, one shape per word class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "lowercase")]
pub enum Categories {
    Verb(VerbCategories),
    Noun(Declension),
    Participle(ParticipleCategories),
}

impl Categories {
    pub fn verb(
        tense: Tense,
        mood: Mood,
        voice: Voice,
        person: Person,
        number: Number,
    ) -> Result<Self, CategoryError> {
        let c = Categories::Verb(VerbCategories {
            tense,
            mood,
            voice,
            person,
            number,
        });
        c.validate()?;
        Ok(c)
    }

    pub fn noun(case: Case, gender: Gender, number: Number) -> Result<Self, CategoryError> {
        let c = Categories::Noun(Declension {
            case,
            gender,
            number,
        });
        c.validate()?;
        Ok(c)
    }

    pub fn participle(
        kind: ParticipleKind,
        declension: Option<Declension>,
    ) -> Result<Self, CategoryError> {
        let c = Categories::Participle(ParticipleCategories { kind, declension });
        c.validate()?;
        Ok(c)
    }

    /// Check that the tuple is a valid combination for its word class.
    pub fn validate(&self) -> Result<(), CategoryError> {
        match self {
            Categories::Verb(v) => {
                if v.number == Number::Dual {
                    return Err(CategoryError::InvalidCombination("Prakrit verbs have no dual"));
                }
                if v.mood != Mood::Indicative && v.tense != Tense::Present {
                    return Err(CategoryError::InvalidCombination(
                        "imperative and optative moods are formed on the present only",
                    ));
                }
                Ok(())
            }
            Categories::Noun(d) => validate_declension(d),
            Categories::Participle(p) => match (p.kind.is_declinable(), &p.declension) {
                (true, Some(d)) => validate_declension(d),
                (true, None) => Err(CategoryError::InvalidCombination(
                    "declinable participle without case, gender and number",
                )),
                (false, Some(_)) => Err(CategoryError::InvalidCombination(
                    "indeclinable participle cannot carry a declension",
                )),
                (false, None) => Ok(()),
            },
        }
    }

    pub fn word_class(&self) -> WordClass {
        match self {
            Categories::Verb(_) => WordClass::Verb,
            Categories::Noun(_) => WordClass::Noun,
            Categories::Participle(_) => WordClass::Participle,
        }
    }

    /// `(category name, code)` pairs in a fixed order.
    pub fn fields(&self) -> Vec<(&'static str, &'static str)> {
        match self {
            Categories::Verb(v) => vec![
                (Tense::CATEGORY, v.tense.code()),
                (Mood::CATEGORY, v.mood.code()),
                (Voice::CATEGORY, v.voice.code()),
                (Person::CATEGORY, v.person.code()),
                (Number::CATEGORY, v.number.code()),
            ],
            Categories::Noun(d) => declension_fields(d),
            Categories::Participle(p) => {
                let mut out = vec![(ParticipleKind::CATEGORY, p.kind.code())];
                if let Some(d) = &p.declension {
                    out.extend(declension_fields(d));
                }
                out
            }
        }
    }

    pub fn declension(&self) -> Option<&Declension> {
        match self {
            Categories::Verb(_) => None,
            Categories::Noun(d) => Some(d),
            Categories::Participle(p) => p.declension.as_ref(),
        }
    }
}

fn validate_declension(d: &Declension) -> Result<(), CategoryError> {
    if d.number == Number::Dual {
        return Err(CategoryError::InvalidCombination("Prakrit nominals have no dual"));
    }
    Ok(())
}

fn declension_fields(d: &Declension) -> Vec<(&'static str, &'static str)> {
    vec![
        (Case::CATEGORY, d.case.code()),
        (Gender::CATEGORY, d.gender.code()),
        (Number::CATEGORY, d.number.code()),
    ]
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Attested,
    RuleDerived,
}

/// Input script detected by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Devanagari,
    Iast,
    HarvardKyoto,
}

/// Rule-side facts the scorer needs for rule-derived candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleEvidence {
    /// Total length of the stripped pattern(s).
    pub pattern_len: usize,
    pub specificity: u8,
    /// True if the rule constrains the stem-final segment.
    pub constrained: bool,
    /// True if the root was reached through a final-segment alternation.
    pub fuzzy: bool,
}

/// One analysis hypothesis for a surface form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub form: String,
    /// Root spelling (lemma). `None` for attested forms without a root.
    pub root: Option<String>,
    /// Inventory entry the root was matched against, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<u32>,
    pub source: Source,
    pub categories: Categories,
    pub dialect: Dialect,
    pub confidence: f64,
    pub sandhi_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip)]
    pub evidence: Option<RuleEvidence>,
}

impl Candidate {
    pub fn word_class(&self) -> WordClass {
        self.categories.word_class()
    }
}

/// Inventory data for the root or stem behind an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryEntry {
    /// Inventory spelling, which for a participle base is the base itself.
    pub headword: String,
    pub headword_devanagari: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanskrit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conjugation: Option<u8>,
    /// Set when only a nasal spelling variant of the root was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_variant: Option<String>,
}

/// A ranked candidate together with its classical terminology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub word_class: WordClass,
    pub classical_terms: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<DictionaryEntry>,
}

/// Non-fatal conditions met while producing a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// A character outside the script mapping was dropped.
    UnsupportedCharacter { ch: char, position: usize },
    /// An attested-form source failed or timed out.
    SourceUnavailable { service: String, reason: String },
    /// A Sanskrit-only sound (e.g. vocalic R, visarga) in the input.
    NonPrakritPhoneme { segment: String },
    /// Neither source produced an analysis.
    Unanalyzable,
}

/// Full response for one surface form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub input: String,
    pub normalized: String,
    pub devanagari: String,
    pub script: Script,
    pub analyses: Vec<Analysis>,
    pub total: usize,
    pub unanalyzable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// One row of the attested-form table, as returned by a lookup source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestedRecord {
    pub form: String,
    #[serde(default)]
    pub root: Option<String>,
    pub word_class: String,
    #[serde(default)]
    pub tense: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub case: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub participle_kind: Option<String>,
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub source: String,
}

/// Raw inventory entry loaded from embedded JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootEntry {
    pub id: u32,
    pub name: String,
    pub word_class: String,
    #[serde(default)]
    pub dialects: Vec<String>,
    #[serde(default)]
    pub conjugation: Option<u8>,
    #[serde(default)]
    pub irregular: bool,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub participle_kind: Option<String>,
    /// For participle bases: the verb root they belong to.
    #[serde(default)]
    pub base_of: Option<String>,
    #[serde(default)]
    pub sanskrit: Option<String>,
}

/// Raw embedded data from build.rs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedData {
    pub roots: Vec<RootEntry>,
    pub forms: Vec<AttestedRecord>,
}
