// Confidence scoring and ranking for analysis candidates.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::inventory::RootInventory;
use crate::types::*;

/// Attested forms are certain.
pub const ATTESTED_SCORE: f64 = 1.0;

// Scoring weights for rule-derived candidates.
const RULE_BASE: f64 = 0.50;
// Longer stripped endings are less likely to be accidental matches.
const PER_PATTERN_CHAR: f64 = 0.04;
const PATTERN_CHAR_CAP: usize = 6;
const PER_SPECIFICITY: f64 = 0.01;
const SPECIFICITY_CAP: u8 = 7;
const PRECONDITION_BONUS: f64 = 0.04;
const SANDHI_PENALTY: f64 = -0.08;
const FUZZY_PENALTY: f64 = -0.06;
// Irregular roots are listed because their forms are frequent.
const IRREGULAR_BONUS: f64 = 0.06;
// The root is recorded in the dialect the ending belongs to.
const DIALECT_AFFINITY_BONUS: f64 = 0.03;
const HINT_MATCH_BONUS: f64 = 0.04;
const HINT_MISMATCH_PENALTY: f64 = -0.04;
// Derived scores stay strictly below attested ones.
const RULE_FLOOR: f64 = 0.05;
const RULE_CEILING: f64 = 0.95;

/// Read-only inputs to [`score`].
#[derive(Clone, Copy)]
pub struct ScoreContext<'a> {
    pub inventory: &'a RootInventory,
    /// Dialect hint from the request, if any.
    pub hint: Option<Dialect>,
}

/// Compute the confidence score for a candidate.
pub fn score(c: &Candidate, ctx: &ScoreContext<'_>) -> f64 {
    if c.source == Source::Attested {
        return ATTESTED_SCORE;
    }

    let mut s = RULE_BASE;

    if let Some(ev) = &c.evidence {
        s += PER_PATTERN_CHAR * ev.pattern_len.min(PATTERN_CHAR_CAP) as f64;
        s += PER_SPECIFICITY * f64::from(ev.specificity.min(SPECIFICITY_CAP));
        if ev.constrained {
            s += PRECONDITION_BONUS;
        }
        if ev.fuzzy {
            s += FUZZY_PENALTY;
        }
    }

    if c.sandhi_applied {
        s += SANDHI_PENALTY;
    }

    if let Some(root) = c.root_id.and_then(|id| ctx.inventory.get(id)) {
        if root.irregular {
            s += IRREGULAR_BONUS;
        }
        if root.has_dialect(c.dialect) {
            s += DIALECT_AFFINITY_BONUS;
        }
    }

    // A hint never penalizes dialect-neutral endings.
    match ctx.hint {
        Some(hint) if hint == c.dialect => s += HINT_MATCH_BONUS,
        Some(_) if c.dialect != Dialect::General => s += HINT_MISMATCH_PENALTY,
        _ => {}
    }

    round4(s.clamp(RULE_FLOOR, RULE_CEILING))
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Compare two candidates for sorting (best first).
/// Ties broken by: attested before derived > higher score > dialect with more
/// roots in the inventory. Equal candidates keep their insertion order when
/// sorted stably.
pub fn compare(a: &Candidate, b: &Candidate, inventory: &RootInventory) -> Ordering {
    a.source
        .cmp(&b.source)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| {
            inventory
                .dialect_frequency(b.dialect)
                .cmp(&inventory.dialect_frequency(a.dialect))
        })
}

/// Sort candidates best first. Stable, so insertion order is the last key.
pub fn rank(candidates: &mut [Candidate], inventory: &RootInventory) {
    candidates.sort_by(|a, b| compare(a, b, inventory));
}

/// Collapse candidates that agree on root, categories and dialect, keeping the
/// highest score at the position of the first occurrence. Equal scores keep
/// the earlier candidate.
pub fn collapse_duplicates(candidates: &mut Vec<Candidate>) {
    let mut seen: HashMap<(Option<String>, Categories, Dialect), usize> = HashMap::new();
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates.drain(..) {
        let key = (c.root.clone(), c.categories, c.dialect);
        match seen.get(&key) {
            Some(&i) => {
                if c.confidence > kept[i].confidence {
                    kept[i] = c;
                }
            }
            None => {
                seen.insert(key, kept.len());
                kept.push(c);
            }
        }
    }
    *candidates = kept;
}
