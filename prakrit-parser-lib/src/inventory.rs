use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

use crate::error::CategoryError;
use crate::types::{Dialect, EmbeddedData, Gender, ParticipleKind, RootClass, RootEntry};

const EMBEDDED_JSON: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/inventory.json"));

static EMBEDDED: Lazy<EmbeddedData> = Lazy::new(|| {
    serde_json::from_slice(EMBEDDED_JSON).expect("embedded inventory JSON is invalid")
});

static INVENTORY: Lazy<RootInventory> = Lazy::new(|| RootInventory::from_entries(&EMBEDDED.roots));

/// Final-segment alternations tried when a stem has no exact entry. Each pair
/// reads "a stem ending in .0 may be listed ending in .1".
const FINAL_ALTERNATIONS: &[(char, char)] = &[
    ('n', 'N'),
    ('N', 'n'),
    ('M', 'n'),
    ('M', 'm'),
    ('e', 'I'),
    ('I', 'e'),
    ('o', 'U'),
    ('U', 'o'),
];

pub(crate) fn embedded_data() -> &'static EmbeddedData {
    &EMBEDDED
}

/// A verb root, noun stem or irregular participle base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Root {
    pub id: u32,
    pub spelling: String,
    pub class: RootClass,
    pub dialects: Vec<Dialect>,
    pub conjugation: Option<u8>,
    pub irregular: bool,
    /// Recorded gender of a noun stem.
    pub gender: Option<Gender>,
    pub participle_kind: Option<ParticipleKind>,
    /// For participle bases: the verb root they are formed from.
    pub base_of: Option<String>,
    pub sanskrit: Option<String>,
}

impl Root {
    fn from_entry(entry: &RootEntry) -> Result<Self, CategoryError> {
        Ok(Root {
            id: entry.id,
            spelling: entry.name.clone(),
            class: entry.word_class.parse::<RootClass>()?,
            dialects: entry
                .dialects
                .iter()
                .map(|d| d.parse::<Dialect>())
                .collect::<Result<Vec<_>, _>>()?,
            conjugation: entry.conjugation,
            irregular: entry.irregular,
            gender: entry.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            participle_kind: entry
                .participle_kind
                .as_deref()
                .map(str::parse::<ParticipleKind>)
                .transpose()?,
            base_of: entry.base_of.clone(),
            sanskrit: entry.sanskrit.clone(),
        })
    }

    /// The lemma an analysis reports: participle bases report their verb.
    pub fn lemma(&self) -> &str {
        self.base_of.as_deref().unwrap_or(&self.spelling)
    }

    pub fn has_dialect(&self, dialect: Dialect) -> bool {
        self.dialects.contains(&dialect)
    }
}

/// An inventory hit for a candidate stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootMatch<'a> {
    pub root: &'a Root,
    /// True if the stem only matched through a final-segment alternation.
    pub fuzzy: bool,
}

/// The root inventory, loaded once from compile-time embedded data.
pub struct RootInventory {
    roots: Vec<Root>,
    by_spelling: HashMap<String, Vec<usize>>,
    by_id: HashMap<u32, usize>,
    /// Number of roots attested in each dialect. Used as a ranking tie-break.
    dialect_freq: BTreeMap<Dialect, usize>,
}

impl RootInventory {
    /// The shared embedded inventory.
    pub fn embedded() -> &'static RootInventory {
        &INVENTORY
    }

    /// Build from raw entries, skipping (and logging) entries whose category
    /// fields do not parse.
    pub fn from_entries(entries: &[RootEntry]) -> Self {
        let roots = entries
            .iter()
            .filter_map(|entry| match Root::from_entry(entry) {
                Ok(root) => Some(root),
                Err(e) => {
                    warn!(root = %entry.name, error = %e, "skipping inventory entry");
                    None
                }
            })
            .collect();
        Self::from_roots(roots)
    }

    pub fn from_roots(roots: Vec<Root>) -> Self {
        let mut by_spelling: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_id = HashMap::new();
        let mut dialect_freq = BTreeMap::new();
        for (i, root) in roots.iter().enumerate() {
            by_spelling.entry(root.spelling.clone()).or_default().push(i);
            by_id.insert(root.id, i);
            for d in &root.dialects {
                *dialect_freq.entry(*d).or_insert(0) += 1;
            }
        }
        Self {
            roots,
            by_spelling,
            by_id,
            dialect_freq,
        }
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Root> {
        self.by_id.get(&id).map(|&i| &self.roots[i])
    }

    /// Look up all entries with this spelling.
    pub fn lookup(&self, spelling: &str) -> Vec<&Root> {
        self.by_spelling
            .get(spelling)
            .map(|v| v.iter().map(|&i| &self.roots[i]).collect())
            .unwrap_or_default()
    }

    /// Look up entries with this spelling and word class.
    pub fn lookup_by_class(&self, spelling: &str, class: RootClass) -> Vec<&Root> {
        self.lookup(spelling)
            .into_iter()
            .filter(|r| r.class == class)
            .collect()
    }

    pub fn contains(&self, spelling: &str) -> bool {
        self.by_spelling.contains_key(spelling)
    }

    /// Resolve a candidate stem: exact entries of the class if any, otherwise
    /// entries reached by a single final-segment alternation.
    pub fn find_stem(&self, stem: &str, class: RootClass) -> Vec<RootMatch<'_>> {
        let exact = self.lookup_by_class(stem, class);
        if !exact.is_empty() {
            return exact
                .into_iter()
                .map(|root| RootMatch { root, fuzzy: false })
                .collect();
        }

        let Some(last) = stem.chars().last() else {
            return Vec::new();
        };
        let head = &stem[..stem.len() - last.len_utf8()];
        let mut out: Vec<RootMatch<'_>> = Vec::new();
        for &(from, to) in FINAL_ALTERNATIONS {
            if from != last {
                continue;
            }
            let variant = format!("{head}{to}");
            for root in self.lookup_by_class(&variant, class) {
                if !out.iter().any(|m| m.root.id == root.id) {
                    out.push(RootMatch { root, fuzzy: true });
                }
            }
        }
        out
    }

    /// How many roots belong to a dialect.
    pub fn dialect_frequency(&self, dialect: Dialect) -> usize {
        self.dialect_freq.get(&dialect).copied().unwrap_or(0)
    }

    pub fn roots(&self) -> &[Root] {
        &self.roots
    }
}

impl Default for RootInventory {
    fn default() -> Self {
        Self::from_entries(&EMBEDDED.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_loads() {
        let inv = RootInventory::embedded();
        assert!(inv.len() >= 30, "inventory too small");
    }

    #[test]
    fn test_lookup_verb_root() {
        let inv = RootInventory::embedded();
        let kar = inv.lookup_by_class("kar", RootClass::Verb);
        assert_eq!(kar.len(), 1);
        assert!(kar[0].irregular);
        assert_eq!(kar[0].sanskrit.as_deref(), Some("kR"));
    }

    #[test]
    fn test_noun_gender_recorded() {
        let inv = RootInventory::embedded();
        let vana = inv.lookup_by_class("vaNa", RootClass::Noun);
        assert_eq!(vana[0].gender, Some(Gender::Neuter));
    }

    #[test]
    fn test_participle_base_lemma() {
        let inv = RootInventory::embedded();
        let kaya = inv.lookup_by_class("kaya", RootClass::ParticipleBase);
        assert_eq!(kaya[0].lemma(), "kar");
        assert_eq!(kaya[0].participle_kind, Some(ParticipleKind::PastPassive));
    }

    #[test]
    fn test_lookup_nonexistent() {
        let inv = RootInventory::embedded();
        assert!(inv.lookup("zzzz").is_empty());
        assert!(!inv.contains("zzzz"));
    }

    #[test]
    fn test_class_filter() {
        let inv = RootInventory::embedded();
        assert!(inv.lookup_by_class("kar", RootClass::Noun).is_empty());
    }

    #[test]
    fn test_find_stem_exact_then_fuzzy() {
        let inv = RootInventory::embedded();
        let exact = inv.find_stem("bhaN", RootClass::Verb);
        assert_eq!(exact.len(), 1);
        assert!(!exact[0].fuzzy);

        let fuzzy = inv.find_stem("bhan", RootClass::Verb);
        assert_eq!(fuzzy.len(), 1);
        assert!(fuzzy[0].fuzzy);
        assert_eq!(fuzzy[0].root.spelling, "bhaN");

        // Fuzzy matching never crosses word class.
        assert!(inv.find_stem("bhan", RootClass::Noun).is_empty());
    }

    #[test]
    fn test_dialect_frequency() {
        let inv = RootInventory::embedded();
        assert!(inv.dialect_frequency(Dialect::General) > inv.dialect_frequency(Dialect::Magadhi));
        assert!(
            inv.dialect_frequency(Dialect::Shauraseni) > inv.dialect_frequency(Dialect::Magadhi)
        );
    }

    #[test]
    fn test_bad_entry_skipped() {
        let entries = vec![
            RootEntry {
                id: 1,
                name: "good".into(),
                word_class: "verb".into(),
                dialects: vec!["general".into()],
                conjugation: None,
                irregular: false,
                gender: None,
                participle_kind: None,
                base_of: None,
                sanskrit: None,
            },
            RootEntry {
                id: 2,
                name: "bad".into(),
                word_class: "adverb".into(),
                dialects: vec![],
                conjugation: None,
                irregular: false,
                gender: None,
                participle_kind: None,
                base_of: None,
                sanskrit: None,
            },
        ];
        let inv = RootInventory::from_entries(&entries);
        assert_eq!(inv.len(), 1);
        assert!(inv.contains("good"));
        assert!(inv.get(2).is_none());
    }
}
