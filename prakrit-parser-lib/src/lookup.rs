// Attested-form lookup: an optional remote service plus the embedded dataset,
// behind one contract.
//
// The remote service is a blocking HTTP endpoint that answers
// `POST {"form": ...}` with a JSON array of records. A failed or slow source
// never fails the request: it is reported as unavailable and analysis goes on
// with whatever else answered.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::confidence::ATTESTED_SCORE;
use crate::error::{CategoryError, LookupError, SourceUnavailable};
use crate::inventory::{embedded_data, RootInventory};
use crate::script::NormalizedForm;
use crate::types::*;

static EMBEDDED_FORMS: Lazy<EmbeddedForms> =
    Lazy::new(|| EmbeddedForms::from_records(embedded_data().forms.clone()));

/// A source of attested forms. An empty answer means "not attested".
pub trait FormLookup: Send + Sync {
    /// Short name used in annotations and logs.
    fn name(&self) -> &str;

    /// Exact-match query, to finish within `timeout`.
    fn query(&self, form: &str, timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError>;
}

impl<T: FormLookup + ?Sized> FormLookup for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, form: &str, timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
        (**self).query(form, timeout)
    }
}

impl<T: FormLookup + ?Sized> FormLookup for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, form: &str, timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
        (**self).query(form, timeout)
    }
}

/// The attested-form dataset compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedForms {
    by_form: HashMap<String, Vec<AttestedRecord>>,
}

impl EmbeddedForms {
    pub fn embedded() -> &'static EmbeddedForms {
        &EMBEDDED_FORMS
    }

    pub fn from_records(records: Vec<AttestedRecord>) -> Self {
        let mut by_form: HashMap<String, Vec<AttestedRecord>> = HashMap::new();
        for r in records {
            by_form.entry(r.form.clone()).or_default().push(r);
        }
        Self { by_form }
    }

    /// Number of distinct forms.
    pub fn len(&self) -> usize {
        self.by_form.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_form.is_empty()
    }
}

impl FormLookup for EmbeddedForms {
    fn name(&self) -> &str {
        "embedded"
    }

    fn query(&self, form: &str, _timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
        Ok(self.by_form.get(form).cloned().unwrap_or_default())
    }
}

/// Remote lookup service over HTTP (blocking client).
pub struct HttpLookup {
    endpoint: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpLookup {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token,
            client,
        })
    }
}

fn transport_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Transport(e.to_string())
    }
}

impl FormLookup for HttpLookup {
    fn name(&self) -> &str {
        &self.endpoint
    }

    fn query(&self, form: &str, timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
        let body = serde_json::json!({ "form": form });
        let mut request = self.client.post(&self.endpoint).timeout(timeout).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        response
            .json::<Vec<AttestedRecord>>()
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

/// When the embedded dataset is consulted alongside a configured primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only the primary answers.
    Never,
    /// The fallback answers when the primary failed.
    #[default]
    OnUnavailable,
    /// Both are always queried.
    Always,
}

/// Records found for a form, plus the sources that could not answer.
#[derive(Debug, Clone, Default)]
pub struct AttestedLookup {
    pub records: Vec<AttestedRecord>,
    pub unavailable: Vec<SourceUnavailable>,
}

/// The attested-form index: primary source, fallback source and the policy
/// tying them together.
pub struct AttestedIndex {
    primary: Option<Box<dyn FormLookup>>,
    fallback: Option<Box<dyn FormLookup>>,
    policy: FallbackPolicy,
    timeout: Duration,
    retry: bool,
}

impl AttestedIndex {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Embedded dataset only.
    pub fn embedded() -> Self {
        Self {
            primary: None,
            fallback: Some(Box::new(EmbeddedForms::embedded())),
            policy: FallbackPolicy::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            retry: true,
        }
    }

    pub fn new(
        primary: Option<Box<dyn FormLookup>>,
        fallback: Option<Box<dyn FormLookup>>,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            primary,
            fallback,
            policy,
            timeout: Self::DEFAULT_TIMEOUT,
            retry: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Look up `form` and its nasal spelling variants, finishing by `deadline`.
    pub fn lookup(&self, form: &NormalizedForm, deadline: Instant) -> AttestedLookup {
        let variants = nasal_variants(form.as_str());
        let mut out = AttestedLookup::default();

        let mut primary_failed = false;
        if let Some(primary) = &self.primary {
            match self.query_variants(primary.as_ref(), &variants, deadline) {
                Ok(records) => out.records.extend(records),
                Err(reason) => {
                    warn!(source = primary.name(), error = %reason, "attested-form source unavailable");
                    primary_failed = true;
                    out.unavailable.push(SourceUnavailable {
                        service: primary.name().to_string(),
                        reason,
                    });
                }
            }
        }

        let use_fallback = self.primary.is_none()
            || match self.policy {
                FallbackPolicy::Never => false,
                FallbackPolicy::OnUnavailable => primary_failed,
                FallbackPolicy::Always => true,
            };
        if let Some(fallback) = self.fallback.as_ref().filter(|_| use_fallback) {
            match self.query_variants(fallback.as_ref(), &variants, deadline) {
                Ok(records) => out.records.extend(records),
                Err(reason) => {
                    warn!(source = fallback.name(), error = %reason, "fallback source unavailable");
                    out.unavailable.push(SourceUnavailable {
                        service: fallback.name().to_string(),
                        reason,
                    });
                }
            }
        }

        debug!(form = %form, records = out.records.len(), "attested lookup done");
        out
    }

    /// First variant with records wins. A source failure stops the walk.
    fn query_variants(
        &self,
        source: &dyn FormLookup,
        variants: &[String],
        deadline: Instant,
    ) -> Result<Vec<AttestedRecord>, LookupError> {
        for variant in variants {
            let records = self.query_with_retry(source, variant, deadline)?;
            if !records.is_empty() {
                return Ok(records);
            }
        }
        Ok(Vec::new())
    }

    fn query_with_retry(
        &self,
        source: &dyn FormLookup,
        form: &str,
        deadline: Instant,
    ) -> Result<Vec<AttestedRecord>, LookupError> {
        let attempts = if self.retry { 2 } else { 1 };
        let mut last_error = LookupError::Timeout;
        for attempt in 1..=attempts {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LookupError::Timeout);
            }
            match source.query(form, remaining.min(self.timeout)) {
                Ok(records) => return Ok(records),
                Err(e) => {
                    debug!(source = source.name(), attempt, error = %e, "lookup attempt failed");
                    let transient = e.is_transient();
                    last_error = e;
                    if !transient {
                        break;
                    }
                }
            }
        }
        Err(last_error)
    }
}

impl Default for AttestedIndex {
    fn default() -> Self {
        Self::embedded()
    }
}

// ---------------------------------------------------------------------------
// Spelling variants
// ---------------------------------------------------------------------------

/// Homorganic nasal for a following consonant, if any.
fn homorganic_nasal(next: char) -> Option<char> {
    match next {
        'k' | 'g' => Some('G'),
        'c' | 'j' => Some('J'),
        'T' | 'D' => Some('N'),
        't' | 'd' | 'n' => Some('n'),
        'p' | 'b' | 'm' => Some('m'),
        _ => None,
    }
}

/// The form, then its anusvara/class-nasal respellings, then its n/N
/// respellings. The form itself always comes first; no duplicates.
pub fn nasal_variants(form: &str) -> Vec<String> {
    let chars: Vec<char> = form.chars().collect();
    let mut variants = vec![form.to_string()];
    let mut push = |v: String| {
        if !variants.contains(&v) {
            variants.push(v);
        }
    };

    // Anusvara written as the class nasal (saMta -> santa).
    let as_nasal: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| match (c, chars.get(i + 1).copied().and_then(homorganic_nasal)) {
            ('M', Some(nasal)) => nasal,
            _ => c,
        })
        .collect();
    push(as_nasal);

    // Class nasal written as anusvara (santa -> saMta).
    let as_anusvara: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| match chars.get(i + 1).copied().and_then(homorganic_nasal) {
            Some(nasal) if nasal == c => 'M',
            _ => c,
        })
        .collect();
    push(as_anusvara);

    push(form.replace('N', "n"));
    push(form.replace('n', "N"));
    variants
}

// ---------------------------------------------------------------------------
// Records to candidates
// ---------------------------------------------------------------------------

fn field<T>(value: &Option<String>, name: &'static str, class: WordClass) -> Result<T, CategoryError>
where
    T: std::str::FromStr<Err = CategoryError>,
{
    value
        .as_deref()
        .ok_or(CategoryError::Missing {
            field: name,
            class: class.code().to_string(),
        })?
        .parse()
}

fn optional<T>(value: &Option<String>) -> Result<Option<T>, CategoryError>
where
    T: std::str::FromStr<Err = CategoryError>,
{
    value.as_deref().map(str::parse).transpose()
}

/// Parse a record's category fields. Mood and voice default to indicative
/// active when a source leaves them out.
pub fn record_categories(record: &AttestedRecord) -> Result<Categories, CategoryError> {
    let class: WordClass = record.word_class.parse()?;
    match class {
        WordClass::Verb => Categories::verb(
            field(&record.tense, "tense", class)?,
            optional(&record.mood)?.unwrap_or(Mood::Indicative),
            optional(&record.voice)?.unwrap_or(Voice::Active),
            field(&record.person, "person", class)?,
            field(&record.number, "number", class)?,
        ),
        WordClass::Noun => Categories::noun(
            field(&record.case, "case", class)?,
            field(&record.gender, "gender", class)?,
            field(&record.number, "number", class)?,
        ),
        WordClass::Participle => {
            let kind = field(&record.participle_kind, "participle_kind", class)?;
            let declension = match optional::<Case>(&record.case)? {
                Some(case) => Some(Declension {
                    case,
                    gender: field(&record.gender, "gender", class)?,
                    number: field(&record.number, "number", class)?,
                }),
                None => None,
            };
            Categories::participle(kind, declension)
        }
    }
}

fn root_classes(class: WordClass) -> &'static [RootClass] {
    match class {
        WordClass::Verb => &[RootClass::Verb],
        WordClass::Noun => &[RootClass::Noun],
        WordClass::Participle => &[RootClass::ParticipleBase, RootClass::Verb],
    }
}

/// Turn lookup records into attested candidates. Records with unparsable or
/// invalid categories are skipped and logged.
pub fn attested_candidates(
    form: &NormalizedForm,
    records: &[AttestedRecord],
    inventory: &RootInventory,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for record in records {
        let parsed = record_categories(record).and_then(|categories| {
            let dialect = optional::<Dialect>(&record.dialect)?.unwrap_or_default();
            Ok((categories, dialect))
        });
        let (categories, dialect) = match parsed {
            Ok(v) => v,
            Err(e) => {
                warn!(form = %record.form, error = %e, "skipping attested record");
                continue;
            }
        };

        let root = record.root.as_deref().and_then(|spelling| {
            root_classes(categories.word_class())
                .iter()
                .find_map(|&class| inventory.lookup_by_class(spelling, class).into_iter().next())
        });

        let mut notes = Vec::new();
        if !record.source.is_empty() {
            notes.push(format!("attested in {}", record.source));
        }
        if record.form != form.as_str() {
            notes.push(format!("spelled {}", record.form));
        }

        out.push(Candidate {
            form: form.as_str().to_string(),
            root: root
                .map(|r| r.lemma().to_string())
                .or_else(|| record.root.clone()),
            root_id: root.map(|r| r.id),
            source: Source::Attested,
            categories,
            dialect,
            confidence: ATTESTED_SCORE,
            sandhi_applied: false,
            ending: None,
            notes,
            evidence: None,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing {
        calls: AtomicUsize,
        error: LookupError,
    }

    impl FormLookup for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn query(&self, _form: &str, _timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
    }

    /// Fails on the first call, then answers from the embedded data.
    struct Flaky {
        calls: AtomicUsize,
    }

    impl FormLookup for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn query(&self, form: &str, timeout: Duration) -> Result<Vec<AttestedRecord>, LookupError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(LookupError::Timeout);
            }
            EmbeddedForms::embedded().query(form, timeout)
        }
    }

    fn form(s: &str) -> NormalizedForm {
        NormalizedForm::new(s).unwrap()
    }

    fn soon() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[test]
    fn test_embedded_forms_loaded() {
        let forms = EmbeddedForms::embedded();
        assert!(!forms.is_empty());
        let records = forms.query("karedi", Duration::ZERO).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "embedded");
    }

    #[test]
    fn test_embedded_index_finds_karedi() {
        let index = AttestedIndex::embedded();
        let found = index.lookup(&form("karedi"), soon());
        assert_eq!(found.records.len(), 1);
        assert!(found.unavailable.is_empty());
        assert!(index.lookup(&form("hasadi"), soon()).records.is_empty());
    }

    #[test]
    fn test_failing_primary_falls_back() {
        let primary = Failing {
            calls: AtomicUsize::new(0),
            error: LookupError::Transport("connection refused".into()),
        };
        let index = AttestedIndex::new(
            Some(Box::new(primary)),
            Some(Box::new(EmbeddedForms::embedded())),
            FallbackPolicy::OnUnavailable,
        );
        let found = index.lookup(&form("karedi"), soon());
        assert_eq!(found.records.len(), 1);
        assert_eq!(found.unavailable.len(), 1);
        assert_eq!(found.unavailable[0].service, "failing");
    }

    #[test]
    fn test_never_policy_skips_fallback() {
        let primary = Failing {
            calls: AtomicUsize::new(0),
            error: LookupError::Timeout,
        };
        let index = AttestedIndex::new(
            Some(Box::new(primary)),
            Some(Box::new(EmbeddedForms::embedded())),
            FallbackPolicy::Never,
        );
        let found = index.lookup(&form("karedi"), soon());
        assert!(found.records.is_empty());
        assert_eq!(found.unavailable[0].reason, LookupError::Timeout);
    }

    #[test]
    fn test_retry_once_on_transient_error() {
        let flaky = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
        });
        let index = AttestedIndex::new(Some(Box::new(Arc::clone(&flaky))), None, FallbackPolicy::Never);
        let found = index.lookup(&form("karedi"), soon());
        assert_eq!(found.records.len(), 1);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_retry_on_status_error() {
        let failing = Arc::new(Failing {
            calls: AtomicUsize::new(0),
            error: LookupError::Status(500),
        });
        let index = AttestedIndex::new(Some(Box::new(Arc::clone(&failing))), None, FallbackPolicy::Never);
        let found = index.lookup(&form("karedi"), soon());
        assert_eq!(found.unavailable.len(), 1);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_deadline_is_timeout() {
        let failing = Arc::new(Failing {
            calls: AtomicUsize::new(0),
            error: LookupError::Status(500),
        });
        let index = AttestedIndex::new(Some(Box::new(Arc::clone(&failing))), None, FallbackPolicy::Never);
        let found = index.lookup(&form("karedi"), Instant::now());
        assert_eq!(found.unavailable[0].reason, LookupError::Timeout);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nasal_variants() {
        let v = nasal_variants("karaMti");
        assert_eq!(v[0], "karaMti");
        assert!(v.contains(&"karanti".to_string()));
        let v = nasal_variants("gacchanti");
        assert!(v.contains(&"gacchaMti".to_string()));
        assert!(v.contains(&"gacchaNti".to_string()));
        let mut dedup = v.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), v.len());
    }

    #[test]
    fn test_anusvara_variant_finds_record() {
        let index = AttestedIndex::embedded();
        let found = index.lookup(&form("karaMti"), soon());
        assert_eq!(found.records.len(), 1);
        assert_eq!(found.records[0].form, "karanti");
    }

    #[test]
    fn test_attested_candidates() {
        let inv = RootInventory::embedded();
        let records = EmbeddedForms::embedded().query("karedi", Duration::ZERO).unwrap();
        let cands = attested_candidates(&form("karedi"), &records, inv);
        assert_eq!(cands.len(), 1);
        let c = &cands[0];
        assert_eq!(c.source, Source::Attested);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.root.as_deref(), Some("kar"));
        assert_eq!(c.dialect, Dialect::Shauraseni);
        assert!(c.root_id.is_some());
    }

    #[test]
    fn test_attested_without_inventory_root() {
        let inv = RootInventory::embedded();
        let records = EmbeddedForms::embedded().query("AsI", Duration::ZERO).unwrap();
        let cands = attested_candidates(&form("AsI"), &records, inv);
        assert_eq!(cands[0].root.as_deref(), Some("as"));
        assert!(cands[0].root_id.is_none());
    }

    #[test]
    fn test_participle_record_reports_verb() {
        let inv = RootInventory::embedded();
        let records = EmbeddedForms::embedded().query("gao", Duration::ZERO).unwrap();
        let cands = attested_candidates(&form("gao"), &records, inv);
        assert_eq!(cands[0].root.as_deref(), Some("gacch"));
    }

    #[test]
    fn test_invalid_record_skipped() {
        let inv = RootInventory::embedded();
        let records = EmbeddedForms::embedded().query("devA", Duration::ZERO).unwrap();
        assert_eq!(records.len(), 1);
        assert!(attested_candidates(&form("devA"), &records, inv).is_empty());
    }

    #[test]
    fn test_record_missing_field() {
        let record = AttestedRecord {
            form: "x".into(),
            word_class: "noun".into(),
            case: Some("nominative".into()),
            number: Some("singular".into()),
            ..Default::default()
        };
        assert!(matches!(
            record_categories(&record),
            Err(CategoryError::Missing { field: "gender", .. })
        ));
    }
}
