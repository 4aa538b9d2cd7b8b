// Output formatting for analysis results.

use crate::types::*;

fn class_tag(class: WordClass) -> &'static str {
    match class {
        WordClass::Verb => "v",
        WordClass::Noun => "n",
        WordClass::Participle => "ptc",
    }
}

/// Convert an analysis to bracketed `{part:tag}` component format.
///
/// Format:
///   Root:    `{kar:v}` (form itself when the root is unknown)
///   Ending:  `{-edi:present:indicative:active:third:singular}` (leading dash)
///   Dialect: ` (shauraseni)` appended unless general
pub fn to_bracketed(a: &Analysis) -> String {
    let c = &a.candidate;
    let root = c.root.as_deref().unwrap_or(&c.form);
    let mut parts = vec![format!("{{{root}:{}}}", class_tag(a.word_class))];

    let codes: Vec<&str> = c.categories.fields().into_iter().map(|(_, v)| v).collect();
    match &c.ending {
        Some(ending) => parts.push(format!("{{-{ending}:{}}}", codes.join(":"))),
        None => parts.push(format!("{{:{}}}", codes.join(":"))),
    }

    let mut out = parts.join(", ");
    if c.dialect != Dialect::General {
        out.push_str(&format!(" ({})", c.dialect));
    }
    out
}

/// Format the top analysis of a result; the normalized form with `?` when
/// nothing was found.
pub fn result_to_bracketed(result: &AnalysisResult) -> String {
    result
        .analyses
        .first()
        .map(to_bracketed)
        .unwrap_or_else(|| format!("{{{}:?}}", result.normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn analysis(root: Option<&str>, ending: Option<&str>, categories: Categories, dialect: Dialect) -> Analysis {
        Analysis {
            word_class: categories.word_class(),
            candidate: Candidate {
                form: "karedi".to_string(),
                root: root.map(str::to_string),
                root_id: None,
                source: Source::RuleDerived,
                categories,
                dialect,
                confidence: 0.7,
                sandhi_applied: false,
                ending: ending.map(str::to_string),
                notes: vec![],
                evidence: None,
            },
            classical_terms: BTreeMap::new(),
            dictionary: None,
        }
    }

    #[test]
    fn test_bracketed_verb() {
        let c = Categories::verb(
            Tense::Present,
            Mood::Indicative,
            Voice::Active,
            Person::Third,
            Number::Singular,
        )
        .unwrap();
        let a = analysis(Some("kar"), Some("edi"), c, Dialect::Shauraseni);
        assert_eq!(
            to_bracketed(&a),
            "{kar:v}, {-edi:present:indicative:active:third:singular} (shauraseni)"
        );
    }

    #[test]
    fn test_bracketed_attested_noun() {
        let c = Categories::noun(Case::Genitive, Gender::Masculine, Number::Singular).unwrap();
        let a = analysis(Some("deva"), None, c, Dialect::General);
        assert_eq!(to_bracketed(&a), "{deva:n}, {:genitive:masculine:singular}");
    }

    #[test]
    fn test_bracketed_participle_without_root() {
        let c = Categories::participle(ParticipleKind::Absolutive, None).unwrap();
        let a = analysis(None, Some("UNa"), c, Dialect::General);
        assert_eq!(to_bracketed(&a), "{karedi:ptc}, {-UNa:absolutive}");
    }

    #[test]
    fn test_result_without_analyses() {
        let result = AnalysisResult {
            input: "tvk".to_string(),
            normalized: "tvk".to_string(),
            devanagari: String::new(),
            script: Script::HarvardKyoto,
            analyses: vec![],
            total: 0,
            unanalyzable: true,
            annotations: vec![Annotation::Unanalyzable],
        };
        assert_eq!(result_to_bracketed(&result), "{tvk:?}");
    }
}
