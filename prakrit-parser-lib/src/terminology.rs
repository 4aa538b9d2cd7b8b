// Classical (Sanskrit grammatical) terms for each category value, in
// Harvard-Kyoto.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::error::UnmappedCategory;
use crate::types::{Categories, Dialect, WordClass};

const TERMS: &[(&str, &str, &str)] = &[
    ("class", "verb", "AkhyAta"),
    ("class", "noun", "nAman"),
    ("class", "participle", "kRdanta"),
    ("tense", "present", "vartamAna-kAla"),
    ("tense", "past", "bhUta-kAla"),
    ("tense", "future", "bhaviSya-kAla"),
    ("mood", "indicative", "nizcayArtha"),
    ("mood", "imperative", "AjJArtha"),
    ("mood", "optative", "vidhiliG"),
    ("voice", "active", "kartari-prayoga"),
    ("voice", "passive", "karmaNi-prayoga"),
    ("person", "first", "uttama-puruSa"),
    ("person", "second", "madhyama-puruSa"),
    ("person", "third", "prathama-puruSa"),
    ("number", "singular", "eka-vacana"),
    ("number", "dual", "dvi-vacana"),
    ("number", "plural", "bahu-vacana"),
    ("case", "nominative", "prathamA-vibhakti"),
    ("case", "accusative", "dvitIyA-vibhakti"),
    ("case", "instrumental", "tRtIyA-vibhakti"),
    ("case", "dative", "caturthI-vibhakti"),
    ("case", "ablative", "paJcamI-vibhakti"),
    ("case", "genitive", "SaSThI-vibhakti"),
    ("case", "locative", "saptamI-vibhakti"),
    ("case", "vocative", "saMbodhana"),
    ("gender", "masculine", "puMliGga"),
    ("gender", "feminine", "strIliGga"),
    ("gender", "neuter", "napuMsakaliGga"),
    ("participle", "absolutive", "sambandhaka-kRdanta"),
    ("participle", "purposive", "kriyArthaka-kRdanta"),
    ("participle", "present", "vartamAna-kRdanta"),
    ("participle", "past_passive", "bhUta-kRdanta"),
    ("dialect", "general", "sAmAnya-prAkRta"),
    ("dialect", "maharashtri", "mahArASTrI"),
    ("dialect", "shauraseni", "zaurasenI"),
    ("dialect", "magadhi", "mAgadhI"),
    ("dialect", "ardha_magadhi", "ardhamAgadhI"),
];

static TABLE: Lazy<HashMap<(&'static str, &'static str), &'static str>> = Lazy::new(|| {
    TERMS
        .iter()
        .map(|&(category, value, term)| ((category, value), term))
        .collect()
});

/// The classical term for one category value.
pub fn classical_term(
    category: &'static str,
    value: &'static str,
) -> Result<&'static str, UnmappedCategory> {
    TABLE
        .get(&(category, value))
        .copied()
        .ok_or(UnmappedCategory { category, value })
}

/// Map a category tuple (plus word class and dialect) to classical terms,
/// keyed by category name.
pub fn to_classical_terms(
    categories: &Categories,
    dialect: Dialect,
) -> Result<BTreeMap<&'static str, &'static str>, UnmappedCategory> {
    let mut out = BTreeMap::new();
    let class = categories.word_class();
    out.insert(WordClass::CATEGORY, classical_term(WordClass::CATEGORY, class.code())?);
    for (category, value) in categories.fields() {
        out.insert(category, classical_term(category, value)?);
    }
    out.insert(Dialect::CATEGORY, classical_term(Dialect::CATEGORY, dialect.code())?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn codes<T: Copy>(all: &[T], code: fn(T) -> &'static str) -> Vec<&'static str> {
        all.iter().map(|v| code(*v)).collect()
    }

    #[test]
    fn test_every_value_mapped() {
        let categories: Vec<(&'static str, Vec<&'static str>)> = vec![
            (WordClass::CATEGORY, codes(WordClass::ALL, WordClass::code)),
            (Tense::CATEGORY, codes(Tense::ALL, Tense::code)),
            (Mood::CATEGORY, codes(Mood::ALL, Mood::code)),
            (Voice::CATEGORY, codes(Voice::ALL, Voice::code)),
            (Person::CATEGORY, codes(Person::ALL, Person::code)),
            (Number::CATEGORY, codes(Number::ALL, Number::code)),
            (Case::CATEGORY, codes(Case::ALL, Case::code)),
            (Gender::CATEGORY, codes(Gender::ALL, Gender::code)),
            (ParticipleKind::CATEGORY, codes(ParticipleKind::ALL, ParticipleKind::code)),
            (Dialect::CATEGORY, codes(Dialect::ALL, Dialect::code)),
        ];
        for (category, values) in categories {
            for value in values {
                assert!(
                    TABLE.contains_key(&(category, value)),
                    "missing term for {category}={value}"
                );
            }
        }
    }

    #[test]
    fn test_verb_terms() {
        let c = Categories::verb(
            Tense::Present,
            Mood::Indicative,
            Voice::Active,
            Person::Third,
            Number::Singular,
        )
        .unwrap();
        let terms = to_classical_terms(&c, Dialect::Shauraseni).unwrap();
        assert_eq!(terms["tense"], "vartamAna-kAla");
        assert_eq!(terms["person"], "prathama-puruSa");
        assert_eq!(terms["number"], "eka-vacana");
        assert_eq!(terms["dialect"], "zaurasenI");
        assert!(!terms.contains_key("case"));
    }

    #[test]
    fn test_declined_participle_terms() {
        let d = Declension {
            case: Case::Genitive,
            gender: Gender::Neuter,
            number: Number::Singular,
        };
        let c = Categories::participle(ParticipleKind::PastPassive, Some(d)).unwrap();
        let terms = to_classical_terms(&c, Dialect::General).unwrap();
        assert_eq!(terms["participle"], "bhUta-kRdanta");
        assert_eq!(terms["case"], "SaSThI-vibhakti");
        assert_eq!(terms["class"], "kRdanta");
    }

    #[test]
    fn test_unmapped_is_error() {
        let err = classical_term("case", "sociative").unwrap_err();
        assert_eq!(err.category, "case");
        assert_eq!(err.value, "sociative");
    }
}
