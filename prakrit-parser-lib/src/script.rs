// Script normalization: Devanagari, IAST and Harvard-Kyoto input is brought to
// a single internal Harvard-Kyoto alphabet before any matching happens.

use std::fmt;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::error::UnsupportedCharacter;
use crate::types::Script;

/// Letters of the internal alphabet (Harvard-Kyoto, ASCII only).
pub const INTERNAL_ALPHABET: &str = "aAiIuUReoMH~'kgGcjJTDNtdnpbmyrlLvzSsh";

const VIRAMA: char = '\u{094D}';
const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';

// (HK, Devanagari letter). Aspirates are listed as digraphs.
const CONSONANTS: &[(&str, char)] = &[
    ("k", 'क'), ("kh", 'ख'), ("g", 'ग'), ("gh", 'घ'), ("G", 'ङ'),
    ("c", 'च'), ("ch", 'छ'), ("j", 'ज'), ("jh", 'झ'), ("J", 'ञ'),
    ("T", 'ट'), ("Th", 'ठ'), ("D", 'ड'), ("Dh", 'ढ'), ("N", 'ण'),
    ("t", 'त'), ("th", 'थ'), ("d", 'द'), ("dh", 'ध'), ("n", 'न'),
    ("p", 'प'), ("ph", 'फ'), ("b", 'ब'), ("bh", 'भ'), ("m", 'म'),
    ("y", 'य'), ("r", 'र'), ("l", 'ल'), ("v", 'व'),
    ("z", 'श'), ("S", 'ष'), ("s", 'स'), ("h", 'ह'), ("L", 'ळ'),
];

// (HK, independent letter, dependent sign). `a` has no sign.
const VOWELS: &[(&str, char, Option<char>)] = &[
    ("a", 'अ', None),
    ("A", 'आ', Some('ा')),
    ("i", 'इ', Some('ि')),
    ("I", 'ई', Some('ी')),
    ("u", 'उ', Some('ु')),
    ("U", 'ऊ', Some('ू')),
    ("R", 'ऋ', Some('ृ')),
    ("RR", 'ॠ', Some('ॄ')),
    ("lR", 'ऌ', Some('ॢ')),
    ("lRR", 'ॡ', Some('ॣ')),
    ("e", 'ए', Some('े')),
    ("o", 'ओ', Some('ो')),
];

// Sanskrit diphthongs; read but never written back (Prakrit `ai` is a + i).
const DIPHTHONGS: &[(&str, char, char)] = &[("ai", 'ऐ', 'ै'), ("au", 'औ', 'ौ')];

const MODIFIERS: &[(&str, char)] = &[("M", 'ं'), ("H", 'ः'), ("~", 'ँ'), ("'", 'ऽ')];

// Sounds Sanskrit has and Prakrit lost, longest first.
const NON_PRAKRIT: &[&str] = &["lRR", "lR", "RR", "R", "H", "S"];

/// A word in the internal alphabet. Built only by [`normalize`] or the checked
/// [`NormalizedForm::new`]; always ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedForm(String);

impl NormalizedForm {
    /// Accepts text already in the internal alphabet.
    pub fn new(text: &str) -> Option<Self> {
        text.chars()
            .all(is_internal_letter)
            .then(|| NormalizedForm(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedForm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub form: NormalizedForm,
    pub script: Script,
    /// Characters dropped from the input.
    pub issues: Vec<UnsupportedCharacter>,
}

pub fn is_internal_letter(c: char) -> bool {
    INTERNAL_ALPHABET.contains(c)
}

/// Detect the input script. Any Devanagari block character wins; otherwise any
/// IAST diacritic letter makes the input IAST.
pub fn detect_script(text: &str) -> Script {
    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        Script::Devanagari
    } else if text.chars().any(|c| iast_letter(c).is_some()) {
        Script::Iast
    } else {
        Script::HarvardKyoto
    }
}

/// Normalize a raw surface form to the internal alphabet.
///
/// Leading and trailing whitespace is trimmed and the input is NFC-composed.
/// Characters that have no mapping are dropped and reported with their
/// character index; the rest of the word is still converted.
pub fn normalize(input: &str) -> Normalized {
    let text: String = input.trim().nfc().collect();
    let script = detect_script(&text);
    let mut out = String::with_capacity(text.len());
    let mut issues = Vec::new();

    match script {
        Script::Devanagari => devanagari_to_internal(&text, &mut out, &mut issues),
        Script::Iast | Script::HarvardKyoto => {
            for (position, ch) in text.chars().enumerate() {
                if let Some(mapped) = iast_letter(ch) {
                    out.push_str(mapped);
                } else if is_internal_letter(ch) {
                    out.push(ch);
                } else {
                    issues.push(UnsupportedCharacter { ch, position });
                }
            }
        }
    }

    Normalized {
        form: NormalizedForm(out),
        script,
        issues,
    }
}

fn iast_letter(c: char) -> Option<&'static str> {
    Some(match c {
        'ā' => "A",
        'ī' => "I",
        'ū' => "U",
        'ṛ' => "R",
        'ṝ' => "RR",
        'ḷ' => "lR",
        'ḹ' => "lRR",
        'ṃ' | 'ṁ' => "M",
        'ḥ' => "H",
        'ṅ' => "G",
        'ñ' => "J",
        'ṭ' => "T",
        'ḍ' => "D",
        'ṇ' => "N",
        'ś' => "z",
        'ṣ' => "S",
        _ => return None,
    })
}

fn devanagari_to_internal(text: &str, out: &mut String, issues: &mut Vec<UnsupportedCharacter>) {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(cons) = consonant_for(c) {
            out.push_str(cons);
            // A consonant carries an inherent `a` unless a sign or virama follows.
            match chars.get(i + 1).copied() {
                Some(VIRAMA) => i += 2,
                next => match next.and_then(vowel_sign_for) {
                    Some(sign) => {
                        out.push_str(sign);
                        i += 2;
                    }
                    None => {
                        out.push('a');
                        i += 1;
                    }
                },
            }
            continue;
        }
        if let Some(v) = independent_vowel_for(c) {
            out.push_str(v);
        } else if let Some((hk, _)) = MODIFIERS.iter().find(|(_, d)| *d == c) {
            out.push_str(hk);
        } else if c == ZWJ || c == ZWNJ {
            // Joiners only affect rendering.
        } else {
            issues.push(UnsupportedCharacter { ch: c, position: i });
        }
        i += 1;
    }
}

fn consonant_for(c: char) -> Option<&'static str> {
    CONSONANTS.iter().find(|(_, d)| *d == c).map(|(hk, _)| *hk)
}

fn independent_vowel_for(c: char) -> Option<&'static str> {
    VOWELS
        .iter()
        .find(|(_, d, _)| *d == c)
        .map(|(hk, _, _)| *hk)
        .or_else(|| DIPHTHONGS.iter().find(|(_, d, _)| *d == c).map(|(hk, _, _)| *hk))
}

fn vowel_sign_for(c: char) -> Option<&'static str> {
    VOWELS
        .iter()
        .find(|(_, _, s)| *s == Some(c))
        .map(|(hk, _, _)| *hk)
        .or_else(|| DIPHTHONGS.iter().find(|(_, _, s)| *s == c).map(|(hk, _, _)| *hk))
}

#[derive(Clone, Copy)]
enum Token {
    Consonant(char),
    Vowel(char, Option<char>),
    Modifier(char),
}

/// Longest-match tokenization of an internal form.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    'outer: while !rest.is_empty() {
        for len in (1..=3).rev() {
            let Some(head) = rest.get(..len) else {
                continue;
            };
            if let Some((_, d)) = CONSONANTS.iter().find(|(hk, _)| *hk == head) {
                tokens.push(Token::Consonant(*d));
            } else if let Some((_, d, s)) = VOWELS.iter().find(|(hk, _, _)| *hk == head) {
                tokens.push(Token::Vowel(*d, *s));
            } else if let Some((_, d)) = MODIFIERS.iter().find(|(hk, _)| *hk == head) {
                tokens.push(Token::Modifier(*d));
            } else {
                continue;
            }
            rest = &rest[len..];
            continue 'outer;
        }
        // Unreachable for a NormalizedForm; skip one byte to stay total.
        rest = &rest[1..];
    }
    tokens
}

/// Render an internal form in Devanagari.
///
/// Vowel sequences are written as separate letters (`karai` is करइ), since
/// Prakrit has no diphthongs.
pub fn to_devanagari(form: &NormalizedForm) -> String {
    let mut out = String::with_capacity(form.len() * 3);
    let mut after_consonant = false;
    for token in tokenize(form.as_str()) {
        match token {
            Token::Consonant(d) => {
                if after_consonant {
                    out.push(VIRAMA);
                }
                out.push(d);
                after_consonant = true;
            }
            Token::Vowel(independent, sign) => {
                match (after_consonant, sign) {
                    (true, Some(s)) => out.push(s),
                    (true, None) => {}
                    (false, _) => out.push(independent),
                }
                after_consonant = false;
            }
            Token::Modifier(d) => {
                if after_consonant {
                    out.push(VIRAMA);
                }
                out.push(d);
                after_consonant = false;
            }
        }
    }
    if after_consonant {
        out.push(VIRAMA);
    }
    out
}

/// Sanskrit-only sounds present in a form, in order of first occurrence.
pub fn non_prakrit_segments(form: &NormalizedForm) -> Vec<String> {
    let text = form.as_str();
    let mut found: Vec<String> = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let hit = NON_PRAKRIT.iter().find(|seg| text[i..].starts_with(**seg));
        match hit {
            Some(seg) => {
                if !found.iter().any(|f| f == seg) {
                    found.push(seg.to_string());
                }
                i += seg.len();
            }
            None => i += 1,
        }
    }
    found
}
