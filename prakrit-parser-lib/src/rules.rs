// The ending rule table.
//
// Rules are grouped in families (finite verb, noun, indeclinable participle,
// participle stem). Within a family they are tried in a fixed total order:
// specificity descending, then pattern length descending, then declaration
// order. A rule that matches blocks the shorter patterns it contains, so
// `-nti` does not also yield a `-ti` or `-i` reading of the same form.

use once_cell::sync::Lazy;
use tracing::warn;

use crate::error::CategoryError;
use crate::sandhi::{self, Junction};
use crate::types::*;

static STANDARD: Lazy<RuleSet> = Lazy::new(|| RuleSet::from_rules(standard_rules()));

const SHORT_VOWELS: &[char] = &['a', 'i', 'u'];
const LONG_VOWELS: &[char] = &['A', 'I', 'U'];
const STEM_VOWELS: &[char] = &['a', 'A', 'i', 'I', 'u', 'U', 'e'];
const I_U_STEMS: &[char] = &['i', 'u'];

const GEN: &[Dialect] = &[Dialect::General];
const MAH: &[Dialect] = &[Dialect::Maharashtri];
const SAU: &[Dialect] = &[Dialect::Shauraseni];
const MAG: &[Dialect] = &[Dialect::Magadhi];
const AMG: &[Dialect] = &[Dialect::ArdhaMagadhi];
const SAU_MAG: &[Dialect] = &[Dialect::Shauraseni, Dialect::Magadhi];
const MAH_SAU: &[Dialect] = &[Dialect::Maharashtri, Dialect::Shauraseni];

const SG: &[Number] = &[Number::Singular];
const PL: &[Number] = &[Number::Plural];
const SG_PL: &[Number] = &[Number::Singular, Number::Plural];

const M: &[Gender] = &[Gender::Masculine];
const F: &[Gender] = &[Gender::Feminine];
const N: &[Gender] = &[Gender::Neuter];
const MN: &[Gender] = &[Gender::Masculine, Gender::Neuter];
const MFN: &[Gender] = &[Gender::Masculine, Gender::Feminine, Gender::Neuter];

const S1: &[(Person, Number)] = &[(Person::First, Number::Singular)];
const S2: &[(Person, Number)] = &[(Person::Second, Number::Singular)];
const S3: &[(Person, Number)] = &[(Person::Third, Number::Singular)];
const P1: &[(Person, Number)] = &[(Person::First, Number::Plural)];
const P2: &[(Person, Number)] = &[(Person::Second, Number::Plural)];
const P3: &[(Person, Number)] = &[(Person::Third, Number::Plural)];
const EVERY_SLOT: &[(Person, Number)] = &[
    (Person::First, Number::Singular),
    (Person::Second, Number::Singular),
    (Person::Third, Number::Singular),
    (Person::First, Number::Plural),
    (Person::Second, Number::Plural),
    (Person::Third, Number::Plural),
];

type VerbForm = (Tense, Mood, Voice);
const PRESENT: VerbForm = (Tense::Present, Mood::Indicative, Voice::Active);
const PASSIVE: VerbForm = (Tense::Present, Mood::Indicative, Voice::Passive);
const IMPERATIVE: VerbForm = (Tense::Present, Mood::Imperative, Voice::Active);
const OPTATIVE: VerbForm = (Tense::Present, Mood::Optative, Voice::Active);
const FUTURE: VerbForm = (Tense::Future, Mood::Indicative, Voice::Active);
const PAST: VerbForm = (Tense::Past, Mood::Indicative, Voice::Active);

/// What an ending matches at the end of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// A literal suffix.
    Literal(&'static str),
    /// No suffix: the form itself must end in one of these segments.
    StemFinal(&'static [char]),
}

impl Pattern {
    /// Number of characters the pattern strips.
    pub fn len(&self) -> usize {
        match self {
            Pattern::Literal(s) => s.len(),
            Pattern::StemFinal(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The suffix text; empty for stem-final templates.
    pub fn text(&self) -> &'static str {
        match self {
            Pattern::Literal(s) => s,
            Pattern::StemFinal(_) => "",
        }
    }
}

/// Condition on the stem-final segment left after stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Any,
    FinalIn(&'static [char]),
    FinalConsonant,
    FinalVowel,
}

impl Precondition {
    pub fn admits(&self, remainder: &str) -> bool {
        let Some(last) = remainder.chars().last() else {
            return false;
        };
        match self {
            Precondition::Any => true,
            Precondition::FinalIn(set) => set.contains(&last),
            Precondition::FinalConsonant => !sandhi::is_vowel(last),
            Precondition::FinalVowel => sandhi::is_vowel(last),
        }
    }

    pub fn is_constrained(&self) -> bool {
        !matches!(self, Precondition::Any)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleFamily {
    Verb,
    Noun,
    /// Indeclinable participles (absolutive, purposive).
    Participle,
    /// Suffixes forming declinable participle stems (`has-anta`, `bhaN-ia`).
    ParticipleStem,
}

/// Categories contributed by a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategories {
    Verb(VerbCategories),
    Noun(Declension),
    Participle(ParticipleKind),
}

impl RuleCategories {
    fn validate(&self) -> Result<(), CategoryError> {
        match *self {
            RuleCategories::Verb(v) => Categories::Verb(v).validate(),
            RuleCategories::Noun(d) => Categories::Noun(d).validate(),
            // Stem-forming suffixes get their declension from the case ending.
            RuleCategories::Participle(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingRule {
    /// Declaration order in the table.
    pub order: usize,
    pub pattern: Pattern,
    pub precondition: Precondition,
    pub junction: Junction,
    pub family: RuleFamily,
    pub categories: RuleCategories,
    pub dialect: Dialect,
    pub specificity: u8,
    /// Patterns of the same family this rule suppresses when it matches.
    pub blocks: &'static [&'static str],
}

/// A rule that matched a form, with the stem part left over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'r> {
    pub rule: &'r EndingRule,
    pub remainder: String,
}

/// An ordered, validated rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<EndingRule>,
}

impl RuleSet {
    /// The built-in Prakrit ending table.
    pub fn standard() -> &'static RuleSet {
        &STANDARD
    }

    /// Validate and order a table. Rules with an invalid category combination
    /// are dropped.
    pub fn from_rules(rules: Vec<EndingRule>) -> Self {
        let mut rules: Vec<EndingRule> = rules
            .into_iter()
            .filter(|r| match r.categories.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(pattern = r.pattern.text(), error = %e, "dropping ending rule");
                    false
                }
            })
            .collect();
        rules.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| b.pattern.len().cmp(&a.pattern.len()))
                .then_with(|| a.order.cmp(&b.order))
        });
        Self { rules }
    }

    pub fn rules(&self) -> &[EndingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules of `family` that match `form`, in table order. Every match
    /// counts as productive, so blocks always apply.
    pub fn matches(&self, form: &str, family: RuleFamily) -> Vec<RuleMatch<'_>> {
        let mut out = Vec::new();
        self.visit_matches(form, family, |m| {
            out.push(m);
            true
        });
        out
    }

    /// Feed each rule of `family` that matches `form` to `visit`, in table
    /// order. `visit` returns whether the match produced a reading; only then
    /// are the rule's blocked patterns skipped for the rest of the walk.
    pub fn visit_matches<'s, F>(&'s self, form: &str, family: RuleFamily, mut visit: F)
    where
        F: FnMut(RuleMatch<'s>) -> bool,
    {
        let mut blocked: Vec<&str> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.family == family) {
            if let Pattern::Literal(suffix) = rule.pattern {
                if blocked.contains(&suffix) {
                    continue;
                }
            }
            let Some(remainder) = rule.strip(form) else {
                continue;
            };
            let m = RuleMatch {
                rule,
                remainder: remainder.to_string(),
            };
            if visit(m) {
                blocked.extend(rule.blocks.iter().copied());
            }
        }
    }
}

impl EndingRule {
    /// The stem left after removing this rule's ending from `form`, if the
    /// ending and the precondition both fit.
    pub fn strip<'f>(&self, form: &'f str) -> Option<&'f str> {
        let remainder = match self.pattern {
            Pattern::Literal(suffix) => {
                if suffix.len() >= form.len() || !form.ends_with(suffix) {
                    return None;
                }
                &form[..form.len() - suffix.len()]
            }
            Pattern::StemFinal(finals) => {
                if !form.chars().last().is_some_and(|c| finals.contains(&c)) {
                    return None;
                }
                form
            }
        };
        self.precondition.admits(remainder).then_some(remainder)
    }
}

/// Accumulates rules in declaration order, expanding multi-valued entries into
/// one rule per category tuple.
#[derive(Default)]
struct Table {
    rules: Vec<EndingRule>,
}

impl Table {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        pattern: Pattern,
        precondition: Precondition,
        junction: Junction,
        family: RuleFamily,
        categories: RuleCategories,
        dialect: Dialect,
        specificity: u8,
        blocks: &'static [&'static str],
    ) {
        let order = self.rules.len();
        self.rules.push(EndingRule {
            order,
            pattern,
            precondition,
            junction,
            family,
            categories,
            dialect,
            specificity,
            blocks,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn verb(
        &mut self,
        suffix: &'static str,
        junction: Junction,
        specificity: u8,
        (tense, mood, voice): VerbForm,
        slots: &[(Person, Number)],
        dialects: &[Dialect],
        blocks: &'static [&'static str],
    ) {
        for &(person, number) in slots {
            for &dialect in dialects {
                let cats = VerbCategories {
                    tense,
                    mood,
                    voice,
                    person,
                    number,
                };
                self.push(
                    Pattern::Literal(suffix),
                    Precondition::Any,
                    junction,
                    RuleFamily::Verb,
                    RuleCategories::Verb(cats),
                    dialect,
                    specificity,
                    blocks,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn noun(
        &mut self,
        pattern: Pattern,
        precondition: Precondition,
        junction: Junction,
        specificity: u8,
        cases: &[Case],
        numbers: &[Number],
        genders: &[Gender],
        dialects: &[Dialect],
        blocks: &'static [&'static str],
    ) {
        for &case in cases {
            for &number in numbers {
                for &gender in genders {
                    for &dialect in dialects {
                        let d = Declension {
                            case,
                            gender,
                            number,
                        };
                        self.push(
                            pattern,
                            precondition,
                            junction,
                            RuleFamily::Noun,
                            RuleCategories::Noun(d),
                            dialect,
                            specificity,
                            blocks,
                        );
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn participle(
        &mut self,
        family: RuleFamily,
        suffix: &'static str,
        precondition: Precondition,
        junction: Junction,
        specificity: u8,
        kind: ParticipleKind,
        dialect: Dialect,
    ) {
        self.push(
            Pattern::Literal(suffix),
            precondition,
            junction,
            family,
            RuleCategories::Participle(kind),
            dialect,
            specificity,
            &[],
        );
    }
}

fn standard_rules() -> Vec<EndingRule> {
    use Case::*;
    use Junction::*;
    use ParticipleKind::*;
    use Precondition::*;

    let mut t = Table::default();

    // Present indicative, active.
    t.verb("mi", Thematic, 2, PRESENT, S1, GEN, &["i"]);
    t.verb("si", Thematic, 2, PRESENT, S2, GEN, &["i"]);
    t.verb("se", Thematic, 2, PRESENT, S2, GEN, &["e"]);
    t.verb("di", Thematic, 2, PRESENT, S3, SAU_MAG, &["i"]);
    t.verb("ti", Thematic, 2, PRESENT, S3, AMG, &["i"]);
    t.verb("i", Thematic, 1, PRESENT, S3, MAH, &[]);
    t.verb("e", Thematic, 1, PRESENT, S3, MAH, &[]);
    t.verb("mo", Thematic, 2, PRESENT, P1, GEN, &[]);
    t.verb("mu", Thematic, 2, PRESENT, P1, GEN, &["u"]);
    t.verb("ma", Thematic, 2, PRESENT, P1, GEN, &[]);
    t.verb("ha", Thematic, 2, PRESENT, P2, GEN, &[]);
    t.verb("tha", Thematic, 3, PRESENT, P2, GEN, &["ha"]);
    t.verb("nti", Thematic, 3, PRESENT, P3, GEN, &["ti", "i"]);
    t.verb("Mti", Thematic, 3, PRESENT, P3, GEN, &["ti", "i"]);
    t.verb("nte", Thematic, 3, PRESENT, P3, GEN, &["e"]);

    // Present passive: the -ijja- / -Ia- stem takes the personal ending.
    t.verb("ijjanti", Direct, 6, PASSIVE, P3, MAH, &["nti", "ti", "i"]);
    t.verb("ijjai", Direct, 5, PASSIVE, S3, MAH, &["i"]);
    t.verb("Iadi", Direct, 5, PASSIVE, S3, SAU, &["di", "i"]);

    // Imperative.
    t.verb("ntu", Thematic, 3, IMPERATIVE, P3, GEN, &["u"]);
    t.verb("du", Thematic, 2, IMPERATIVE, S3, SAU_MAG, &["u"]);
    t.verb("u", Thematic, 1, IMPERATIVE, S3, MAH, &[]);
    t.verb("hi", Thematic, 2, IMPERATIVE, S2, GEN, &["i"]);
    t.verb("su", Thematic, 2, IMPERATIVE, S2, GEN, &["u"]);
    t.verb("mu", Thematic, 2, IMPERATIVE, P1, GEN, &["u"]);

    // Optative: one ending for every person and number.
    t.verb("ejja", Direct, 4, OPTATIVE, EVERY_SLOT, MAH, &[]);
    t.verb("ejjA", Direct, 4, OPTATIVE, EVERY_SLOT, MAH, &[]);

    // Future.
    t.verb("issanti", Direct, 7, FUTURE, P3, GEN, &["nti", "ti", "i"]);
    t.verb("hinti", Thematic, 5, FUTURE, P3, GEN, &["nti", "ti", "i"]);
    t.verb("ssadi", Thematic, 5, FUTURE, S3, SAU, &["di", "i"]);
    t.verb("himi", Thematic, 4, FUTURE, S1, GEN, &["mi", "i"]);
    t.verb("hisi", Thematic, 4, FUTURE, S2, GEN, &["si", "i"]);
    t.verb("himo", Thematic, 4, FUTURE, P1, GEN, &["mo"]);
    t.verb("ssaM", Thematic, 4, FUTURE, S1, GEN, &[]);
    t.verb("hii", Thematic, 3, FUTURE, S3, MAH, &["i"]);

    // Past: Prakrit keeps one form for every person and number.
    t.verb("hIa", Thematic, 3, PAST, EVERY_SLOT, GEN, &["Ia"]);
    t.verb("sI", Thematic, 2, PAST, EVERY_SLOT, GEN, &[]);
    t.verb("hI", Thematic, 2, PAST, EVERY_SLOT, GEN, &[]);
    t.verb("Ia", Direct, 2, PAST, EVERY_SLOT, GEN, &[]);

    // Noun case endings.
    let stem_vowel = FinalIn(STEM_VOWELS);
    t.noun(Pattern::Literal("hinto"), stem_vowel, Lengthened, 5, &[Ablative], SG_PL, MFN, GEN, &["o", "to", "nto"]);
    t.noun(Pattern::Literal("hiMto"), stem_vowel, Lengthened, 5, &[Ablative], SG_PL, MFN, GEN, &["o", "to", "Mto"]);
    t.noun(Pattern::Literal("sunto"), stem_vowel, Lengthened, 5, &[Ablative], PL, MFN, GEN, &["o", "to", "nto"]);
    t.noun(Pattern::Literal("suMto"), stem_vowel, Lengthened, 5, &[Ablative], PL, MFN, GEN, &["o", "to", "Mto"]);
    t.noun(Pattern::Literal("ssiM"), FinalIn(SHORT_VOWELS), Direct, 4, &[Locative], SG, MN, AMG, &["M", "iM"]);
    t.noun(Pattern::Literal("hiM"), stem_vowel, Lengthened, 3, &[Instrumental], PL, MFN, GEN, &["M", "iM"]);
    t.noun(Pattern::Literal("hi~"), stem_vowel, Lengthened, 3, &[Instrumental], PL, MFN, GEN, &["~", "i~"]);
    t.noun(Pattern::Literal("ssa"), FinalIn(SHORT_VOWELS), Direct, 3, &[Dative, Genitive], SG, MN, GEN, &["a"]);
    t.noun(Pattern::Literal("mmi"), FinalIn(SHORT_VOWELS), Direct, 3, &[Locative], SG, MN, MAH, &["i"]);
    t.noun(Pattern::Literal("tto"), stem_vowel, Shortened, 3, &[Ablative], SG_PL, MFN, GEN, &["o", "to"]);
    t.noun(Pattern::Literal("suM"), stem_vowel, Lengthened, 3, &[Locative], PL, MFN, GEN, &["M", "uM"]);
    t.noun(Pattern::Literal("NaM"), stem_vowel, Lengthened, 3, &[Dative, Genitive], PL, MFN, GEN, &["M", "aM"]);
    t.noun(Pattern::Literal("iM"), FinalIn(LONG_VOWELS), Lengthened, 2, &[Nominative, Accusative], PL, N, GEN, &["M"]);
    t.noun(Pattern::Literal("i~"), FinalIn(LONG_VOWELS), Lengthened, 2, &[Nominative, Accusative], PL, N, GEN, &["~"]);
    t.noun(Pattern::Literal("Ni"), FinalIn(LONG_VOWELS), Lengthened, 2, &[Nominative, Accusative], PL, N, GEN, &["i"]);
    t.noun(Pattern::Literal("hi"), stem_vowel, Lengthened, 2, &[Instrumental], PL, MFN, GEN, &["i"]);
    t.noun(Pattern::Literal("su"), stem_vowel, Lengthened, 2, &[Locative], PL, MFN, GEN, &["u"]);
    t.noun(Pattern::Literal("Na"), stem_vowel, Lengthened, 2, &[Dative, Genitive], PL, MFN, GEN, &["a"]);
    t.noun(Pattern::Literal("No"), FinalIn(I_U_STEMS), Direct, 2, &[Nominative, Accusative], PL, M, GEN, &["o"]);
    t.noun(Pattern::Literal("No"), FinalIn(I_U_STEMS), Direct, 2, &[Dative, Genitive], SG, M, GEN, &["o"]);
    t.noun(Pattern::Literal("o"), FinalConsonant, StemVowelA, 1, &[Nominative], SG, M, MAH_SAU, &[]);
    t.noun(Pattern::Literal("o"), FinalIn(LONG_VOWELS), Direct, 1, &[Nominative, Accusative], PL, F, GEN, &[]);
    t.noun(Pattern::Literal("e"), FinalConsonant, StemVowelA, 1, &[Nominative], SG, M, MAG, &[]);
    t.noun(Pattern::Literal("e"), FinalConsonant, StemVowelA, 1, &[Locative], SG, MN, GEN, &[]);
    t.noun(Pattern::Literal("e"), FinalConsonant, StemVowelA, 1, &[Accusative], PL, M, GEN, &[]);
    t.noun(Pattern::Literal("e"), FinalIn(LONG_VOWELS), Direct, 1, &[Instrumental, Genitive, Locative], SG, F, GEN, &[]);
    t.noun(Pattern::Literal("M"), FinalVowel, Direct, 1, &[Accusative], SG, MFN, GEN, &[]);
    t.noun(Pattern::Literal("M"), FinalIn(SHORT_VOWELS), Direct, 1, &[Nominative], SG, N, GEN, &[]);
    t.noun(Pattern::StemFinal(LONG_VOWELS), Any, Direct, 0, &[Nominative, Vocative], SG, F, GEN, &[]);
    t.noun(Pattern::StemFinal(&['A']), Any, Direct, 0, &[Nominative], PL, F, GEN, &[]);

    // Indeclinable participles.
    t.participle(RuleFamily::Participle, "ittA", FinalConsonant, Direct, 5, Absolutive, Dialect::General);
    t.participle(RuleFamily::Participle, "ttA", FinalVowel, Thematic, 5, Absolutive, Dialect::General);
    t.participle(RuleFamily::Participle, "tUNa", FinalVowel, Thematic, 5, Absolutive, Dialect::General);
    t.participle(RuleFamily::Participle, "iUNa", FinalConsonant, Direct, 5, Absolutive, Dialect::Maharashtri);
    t.participle(RuleFamily::Participle, "UNa", FinalVowel, Thematic, 4, Absolutive, Dialect::Maharashtri);
    t.participle(RuleFamily::Participle, "ituM", FinalConsonant, Direct, 5, Purposive, Dialect::General);
    t.participle(RuleFamily::Participle, "tuM", FinalVowel, Thematic, 4, Purposive, Dialect::General);
    t.participle(RuleFamily::Participle, "iuM", FinalConsonant, Direct, 4, Purposive, Dialect::Maharashtri);

    // Participle stems, declined with the noun endings above.
    t.participle(RuleFamily::ParticipleStem, "amANa", FinalConsonant, Direct, 6, Present, Dialect::General);
    t.participle(RuleFamily::ParticipleStem, "emANa", FinalConsonant, Direct, 6, Present, Dialect::General);
    t.participle(RuleFamily::ParticipleStem, "anta", FinalConsonant, Direct, 5, Present, Dialect::General);
    t.participle(RuleFamily::ParticipleStem, "enta", FinalConsonant, Direct, 5, Present, Dialect::General);
    t.participle(RuleFamily::ParticipleStem, "ia", FinalConsonant, Direct, 4, PastPassive, Dialect::General);

    t.rules
}
