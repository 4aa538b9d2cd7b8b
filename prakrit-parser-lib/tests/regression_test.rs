// Regression tests for known analyses and edge cases.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use prakrit_parser_lib::error::LookupError;
use prakrit_parser_lib::lookup::EmbeddedForms;
use prakrit_parser_lib::output::result_to_bracketed;
use prakrit_parser_lib::types::*;
use prakrit_parser_lib::{
    AnalysisRequest, Analyzer, AttestedIndex, Config, FallbackPolicy, Feedback, FeedbackChoice,
    FormLookup,
};

fn analyzer() -> Analyzer {
    Analyzer::new()
}

fn present_3sg(c: &Candidate) -> bool {
    matches!(
        c.categories,
        Categories::Verb(VerbCategories {
            tense: Tense::Present,
            mood: Mood::Indicative,
            person: Person::Third,
            number: Number::Singular,
            ..
        })
    )
}

struct Down {
    calls: AtomicUsize,
}

impl FormLookup for Down {
    fn name(&self) -> &str {
        "down"
    }

    fn query(&self, _form: &str, _timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::Transport("connection refused".into()))
    }
}

#[test]
fn karedi_is_attested_first() {
    let result = analyzer().analyze_word("karedi");
    let top = &result.analyses[0].candidate;
    assert_eq!(top.source, Source::Attested);
    assert_eq!(top.confidence, 1.0);
    assert_eq!(top.root.as_deref(), Some("kar"));
    assert_eq!(top.dialect, Dialect::Shauraseni);
    assert!(present_3sg(top), "karedi should be present 3sg");
}

#[test]
fn hasadi_is_rule_derived() {
    let result = analyzer().analyze_word("hasadi");
    assert!(!result.unanalyzable);
    assert!(result
        .analyses
        .iter()
        .all(|a| a.candidate.source == Source::RuleDerived && a.candidate.confidence < 1.0));
    let top = &result.analyses[0].candidate;
    assert_eq!(top.root.as_deref(), Some("has"));
    assert!(present_3sg(top), "hasadi should be present 3sg");
    assert_eq!(top.ending.as_deref(), Some("di"));
}

#[test]
fn gibberish_is_unanalyzable() {
    let result = analyzer().analyze_word("tvk");
    assert!(result.unanalyzable);
    assert_eq!(result.total, 0);
    assert!(result.annotations.contains(&Annotation::Unanalyzable));
    assert_eq!(result_to_bracketed(&result), "{tvk:?}");
}

#[test]
fn unsupported_character_is_dropped_and_reported() {
    let result = analyzer().analyze_word("करे!दि");
    assert_eq!(result.normalized, "karedi");
    assert_eq!(result.script, Script::Devanagari);
    assert!(result
        .annotations
        .contains(&Annotation::UnsupportedCharacter { ch: '!', position: 3 }));
    assert_eq!(result.analyses[0].candidate.source, Source::Attested);
}

#[test]
fn devanagari_and_hk_agree() {
    let a = analyzer();
    let deva = a.analyze_word("करेदि");
    let hk = a.analyze_word("karedi");
    assert_eq!(deva.normalized, hk.normalized);
    assert_eq!(deva.analyses, hk.analyses);
}

#[test]
fn unavailable_source_still_derives() {
    let down = Down {
        calls: AtomicUsize::new(0),
    };
    let index = AttestedIndex::new(Some(Box::new(down)), None, FallbackPolicy::Never);
    let a = analyzer().with_index(index);
    let result = a.analyze_word("karedi");
    assert!(!result.unanalyzable);
    assert!(result
        .analyses
        .iter()
        .all(|an| an.candidate.source == Source::RuleDerived));
    assert!(result
        .annotations
        .iter()
        .any(|an| matches!(an, Annotation::SourceUnavailable { service, .. } if service == "down")));
}

#[test]
fn unavailable_primary_uses_embedded_fallback() {
    let index = AttestedIndex::new(
        Some(Box::new(Down {
            calls: AtomicUsize::new(0),
        })),
        Some(Box::new(EmbeddedForms::embedded())),
        FallbackPolicy::OnUnavailable,
    );
    let result = analyzer().with_index(index).analyze_word("karedi");
    assert_eq!(result.analyses[0].candidate.source, Source::Attested);
    assert!(result
        .annotations
        .iter()
        .any(|an| matches!(an, Annotation::SourceUnavailable { .. })));
}

#[test]
fn ranking_is_deterministic() {
    let a = analyzer();
    for word in ["karedi", "hasadi", "devassa", "mAlAe", "kayassa"] {
        assert_eq!(a.analyze_word(word), a.analyze_word(word), "{word} ranked differently");
    }
}

#[test]
fn categories_are_valid_and_named() {
    let a = analyzer();
    for word in ["karedi", "devassa", "vaNaM", "kayaM", "hasittA", "hasanto", "devA"] {
        for an in a.analyze_word(word).analyses {
            assert!(an.candidate.categories.validate().is_ok(), "{word}: invalid categories");
            assert_eq!(an.word_class, an.candidate.categories.word_class());
            assert!(an.classical_terms.contains_key("class"));
            assert!(an.classical_terms.contains_key("dialect"));
        }
    }
}

#[test]
fn dual_record_never_surfaces() {
    let result = analyzer().analyze_word("devA");
    assert!(result.analyses.iter().all(|an| an
        .candidate
        .categories
        .declension()
        .map_or(true, |d| d.number != Number::Dual)));
}

#[test]
fn attested_participle_reports_verb() {
    let result = analyzer().analyze_word("kayaM");
    let top = &result.analyses[0];
    assert_eq!(top.candidate.source, Source::Attested);
    assert_eq!(top.word_class, WordClass::Participle);
    assert_eq!(top.candidate.root.as_deref(), Some("kar"));
}

#[test]
fn batch_keeps_request_order() {
    let words = ["karedi", "tvk", "hasadi", "devassa", "mAlAe", "hodi", "vaNaM", "gao"];
    let requests: Vec<AnalysisRequest> = words.iter().map(|w| AnalysisRequest::new(*w)).collect();
    let a = analyzer();
    let results = a.analyze_batch(&requests);
    assert_eq!(results.len(), words.len());
    for (word, result) in words.iter().zip(&results) {
        assert_eq!(result.input, *word);
        assert_eq!(*result, a.analyze_word(word));
    }
}

#[test]
fn shared_analyzer_across_threads() {
    let a = analyzer();
    let expected = a.analyze_word("devassa");
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| a.analyze_word("devassa"))).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn feedback_reaches_configured_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.jsonl");
    let config = Config {
        feedback_path: Some(path.clone()),
        ..Config::default()
    };
    let a = Analyzer::from_config(&config).unwrap();
    a.submit_feedback(&Feedback {
        form: "karedi".into(),
        choice: FeedbackChoice::Candidate(0),
        note: String::new(),
    });
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn short_ending_survives_unresolved_long_one() {
    let a = analyzer();
    for (word, root) in [("putto", "putta"), ("NayaraM", "Nayara")] {
        let result = a.analyze_word(word);
        assert!(!result.unanalyzable, "{word} should be analysable");
        assert!(
            result.analyses.iter().any(|an| an.candidate.source == Source::RuleDerived
                && an.candidate.root.as_deref() == Some(root)
                && an.candidate.categories.declension().is_some_and(|d| d.case == Case::Nominative)),
            "{word} should have a nominative reading of {root}"
        );
    }
}

#[test]
fn analyses_carry_dictionary_data() {
    let result = analyzer().analyze_word("devassa");
    let entry = result.analyses[0].dictionary.as_ref().unwrap();
    assert_eq!(entry.headword, "deva");
    assert_eq!(entry.headword_devanagari, "देव");
    assert_eq!(entry.sanskrit.as_deref(), Some("deva"));
}
