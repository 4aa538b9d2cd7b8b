// Reverses the junction changes an ending makes to its stem, so the remainder
// left after stripping a suffix can be looked up in the root inventory.

const VOWELS: &[char] = &['a', 'A', 'i', 'I', 'u', 'U', 'R', 'e', 'o'];

/// How an ending joins its stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    /// Stem and ending meet unchanged.
    Direct,
    /// Verb endings on a thematic stem (`kar-e-di`, `has-a-di`, `N-e-mo`).
    Thematic,
    /// The ending lengthens the stem-final vowel (`deva` + `hiM` = `devehiM`).
    Lengthened,
    /// The ending shortens the stem-final vowel (`mAlA` + `tto` = `mAlatto`).
    Shortened,
    /// The ending replaces the final `a` of an a-stem (`deva` + `o` = `devo`).
    StemVowelA,
}

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

fn vowel_count(s: &str) -> usize {
    s.chars().filter(|c| is_vowel(*c)).count()
}

fn replace_last(s: &str, with: char) -> String {
    let mut out = s.to_string();
    out.pop();
    out.push(with);
    out
}

/// Undo the junction for `remainder`. Total and deterministic: one output per
/// input, unchanged when the junction does not apply.
pub fn denormalize(remainder: &str, junction: Junction) -> String {
    let mut chars = remainder.chars().rev();
    let (Some(last), prev) = (chars.next(), chars.next()) else {
        return remainder.to_string();
    };

    match junction {
        Junction::Direct => remainder.to_string(),
        Junction::Thematic => {
            if vowel_count(remainder) == 1 {
                // Guna of a monosyllabic root: ne <- NI, ho <- hU.
                match last {
                    'e' => replace_last(remainder, 'I'),
                    'o' => replace_last(remainder, 'U'),
                    _ => remainder.to_string(),
                }
            } else if matches!(last, 'a' | 'e' | 'i') && prev.is_some_and(|p| !is_vowel(p)) {
                remainder[..remainder.len() - 1].to_string()
            } else {
                remainder.to_string()
            }
        }
        Junction::Lengthened => match last {
            'A' | 'e' => replace_last(remainder, 'a'),
            'I' => replace_last(remainder, 'i'),
            'U' => replace_last(remainder, 'u'),
            _ => remainder.to_string(),
        },
        Junction::Shortened => match last {
            'a' => replace_last(remainder, 'A'),
            'i' => replace_last(remainder, 'I'),
            'u' => replace_last(remainder, 'U'),
            _ => remainder.to_string(),
        },
        Junction::StemVowelA => format!("{remainder}a"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thematic_strip() {
        assert_eq!(denormalize("kare", Junction::Thematic), "kar");
        assert_eq!(denormalize("hasa", Junction::Thematic), "has");
        assert_eq!(denormalize("bhaNi", Junction::Thematic), "bhaN");
    }

    #[test]
    fn test_thematic_guna_reversal() {
        assert_eq!(denormalize("Ne", Junction::Thematic), "NI");
        assert_eq!(denormalize("ho", Junction::Thematic), "hU");
    }

    #[test]
    fn test_thematic_leaves_vowel_clusters() {
        // `a` after a vowel is not a thematic vowel.
        assert_eq!(denormalize("naa", Junction::Thematic), "naa");
        assert_eq!(denormalize("kar", Junction::Thematic), "kar");
    }

    #[test]
    fn test_lengthened_and_shortened() {
        assert_eq!(denormalize("devA", Junction::Lengthened), "deva");
        assert_eq!(denormalize("deve", Junction::Lengthened), "deva");
        assert_eq!(denormalize("muNI", Junction::Lengthened), "muNi");
        assert_eq!(denormalize("mAla", Junction::Shortened), "mAlA");
        assert_eq!(denormalize("bahu", Junction::Shortened), "bahU");
    }

    #[test]
    fn test_stem_vowel_a() {
        assert_eq!(denormalize("dev", Junction::StemVowelA), "deva");
    }

    #[test]
    fn test_total_on_edge_inputs() {
        for j in [
            Junction::Direct,
            Junction::Thematic,
            Junction::Lengthened,
            Junction::Shortened,
        ] {
            assert_eq!(denormalize("", j), "");
        }
        assert_eq!(denormalize("k", Junction::Thematic), "k");
        assert_eq!(denormalize("deva", Junction::Direct), "deva");
    }
}
