// The analysis pipeline: normalize, look up attested forms, derive by rule,
// then merge, rank and annotate.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::config::Config;
use crate::confidence;
use crate::error::{ConfigError, UnmappedCategory};
use crate::feedback::{Feedback, FeedbackSink, JsonLinesSink, NullSink};
use crate::inventory::RootInventory;
use crate::lookup::{self, AttestedIndex, EmbeddedForms, FormLookup, HttpLookup};
use crate::morphology;
use crate::rules::RuleSet;
use crate::script::{self, NormalizedForm};
use crate::terminology;
use crate::types::*;

/// One surface form to analyze, with an optional dialect hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub form: String,
    pub dialect: Option<Dialect>,
}

impl AnalysisRequest {
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            dialect: None,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }
}

/// Maps a category tuple and dialect to classical terms.
pub type TermMapper =
    fn(&Categories, Dialect) -> Result<BTreeMap<&'static str, &'static str>, UnmappedCategory>;

/// Shared, read-only analyzer. Safe to use from many threads at once.
pub struct Analyzer {
    inventory: &'static RootInventory,
    rules: &'static RuleSet,
    index: AttestedIndex,
    feedback: Box<dyn FeedbackSink>,
    terms: TermMapper,
    request_timeout: Duration,
}

impl Analyzer {
    /// Analyzer over the embedded inventory and attested forms.
    pub fn new() -> Self {
        Self {
            inventory: RootInventory::embedded(),
            rules: RuleSet::standard(),
            index: AttestedIndex::embedded(),
            feedback: Box::new(NullSink),
            terms: terminology::to_classical_terms,
            request_timeout: Duration::from_millis(Config::default().request_timeout_ms),
        }
    }

    /// Build from configuration: remote lookup if an endpoint is set, the
    /// embedded dataset as fallback, and a JSON-lines feedback log if a path
    /// is set.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let primary: Option<Box<dyn FormLookup>> = match &config.lookup.endpoint {
            Some(endpoint) => Some(Box::new(HttpLookup::new(
                endpoint.clone(),
                config.lookup.auth_token(),
            )?)),
            None => None,
        };
        let index = AttestedIndex::new(
            primary,
            Some(Box::new(EmbeddedForms::embedded())),
            config.lookup.fallback,
        )
        .with_timeout(config.lookup.timeout())
        .with_retry(config.lookup.retry);

        let feedback: Box<dyn FeedbackSink> = match &config.feedback_path {
            Some(path) => Box::new(JsonLinesSink::open(path).map_err(|e| match e {
                crate::error::FeedbackError::Io(io) => ConfigError::Io(io),
                other => ConfigError::Io(std::io::Error::other(other.to_string())),
            })?),
            None => Box::new(NullSink),
        };

        Ok(Self::new()
            .with_index(index)
            .with_feedback(feedback)
            .with_request_timeout(config.request_timeout()))
    }

    pub fn with_index(mut self, index: AttestedIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_feedback(mut self, sink: Box<dyn FeedbackSink>) -> Self {
        self.feedback = sink;
        self
    }

    /// Replace the classical terminology table.
    pub fn with_terminology(mut self, terms: TermMapper) -> Self {
        self.terms = terms;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn inventory(&self) -> &RootInventory {
        self.inventory
    }

    /// Analyze a single word with no dialect hint.
    pub fn analyze_word(&self, word: &str) -> AnalysisResult {
        self.analyze(&AnalysisRequest::new(word))
    }

    /// Analyze one request. Never fails: problems surface as annotations.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let deadline = Instant::now() + self.request_timeout;
        let normalized = script::normalize(&request.form);
        let form = normalized.form;

        let mut annotations: Vec<Annotation> = normalized
            .issues
            .iter()
            .map(|u| Annotation::UnsupportedCharacter {
                ch: u.ch,
                position: u.position,
            })
            .collect();
        annotations.extend(
            script::non_prakrit_segments(&form)
                .into_iter()
                .map(|segment| Annotation::NonPrakritPhoneme { segment }),
        );

        let mut candidates = Vec::new();
        if !form.is_empty() {
            let found = self.index.lookup(&form, deadline);
            annotations.extend(found.unavailable.iter().map(|u| Annotation::SourceUnavailable {
                service: u.service.clone(),
                reason: u.reason.to_string(),
            }));
            candidates = lookup::attested_candidates(&form, &found.records, self.inventory);
            candidates.extend(morphology::derive(
                &form,
                self.inventory,
                self.rules,
                request.dialect,
            ));
        }

        confidence::collapse_duplicates(&mut candidates);
        confidence::rank(&mut candidates, self.inventory);

        let mut analyses = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Err(e) = candidate.categories.validate() {
                warn!(form = %form, error = %e, "dropping candidate with invalid categories");
                continue;
            }
            match (self.terms)(&candidate.categories, candidate.dialect) {
                Ok(classical_terms) => analyses.push(Analysis {
                    word_class: candidate.word_class(),
                    dictionary: dictionary_entry(self.inventory, &candidate),
                    candidate,
                    classical_terms,
                }),
                Err(e) => error!(form = %form, error = %e, "terminology table gap"),
            }
        }

        let unanalyzable = analyses.is_empty();
        if unanalyzable {
            annotations.push(Annotation::Unanalyzable);
        }
        debug!(input = %request.form, form = %form, analyses = analyses.len(), "analyzed");

        AnalysisResult {
            input: request.form.clone(),
            devanagari: script::to_devanagari(&form),
            normalized: form.as_str().to_string(),
            script: normalized.script,
            total: analyses.len(),
            analyses,
            unanalyzable,
            annotations,
        }
    }

    /// Analyze independent requests in parallel. Results keep request order.
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        if requests.len() <= 1 {
            return requests.iter().map(|r| self.analyze(r)).collect();
        }
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(requests.len());
        let chunk = requests.len().div_ceil(workers);
        thread::scope(|s| {
            let handles: Vec<_> = requests
                .chunks(chunk)
                .map(|part| s.spawn(move || part.iter().map(|r| self.analyze(r)).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Forward feedback to the sink. Failures are logged, never returned.
    pub fn submit_feedback(&self, feedback: &Feedback) {
        if let Err(e) = self.feedback.record(feedback) {
            warn!(form = %feedback.form, error = %e, "could not record feedback");
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Inventory data for a candidate's root. Falls back to nasal spelling
/// variants when the candidate names a root without an inventory id.
fn dictionary_entry(inventory: &RootInventory, candidate: &Candidate) -> Option<DictionaryEntry> {
    let (root, matched_variant) = match candidate.root_id.and_then(|id| inventory.get(id)) {
        Some(root) => (root, None),
        None => {
            let spelling = candidate.root.as_deref()?;
            lookup::nasal_variants(spelling).into_iter().find_map(|variant| {
                let root = inventory.lookup(&variant).into_iter().next()?;
                Some((root, (variant != spelling).then_some(variant)))
            })?
        }
    };
    Some(DictionaryEntry {
        headword: root.spelling.clone(),
        headword_devanagari: NormalizedForm::new(&root.spelling)
            .map(|f| script::to_devanagari(&f))
            .unwrap_or_default(),
        sanskrit: root.sanskrit.clone(),
        conjugation: root.conjugation,
        matched_variant,
    })
}
