//! Text normalization and n-gram generation
//!
//! Everything that gets indexed and everything that gets queried passes
//! through [`normalize`] first, so that equality between a query token and a
//! stored token implies a substring match on the original text.

use casillero_core::error::{Error, Result};
use casillero_core::limits::{NGRAM_MAX, NGRAM_MIN};
use casillero_core::types::TokenSet;

/// Canonical transform applied before tokenizing or indexing.
///
/// Uppercases and strips all whitespace. Total (never fails) and idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use casillero_search::tokenizer::normalize;
///
/// assert_eq!(normalize("  1z 999 aa1 "), "1Z999AA1");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// All contiguous substrings of `text` with length in `[min, max]`.
///
/// Lengths are counted in characters, not bytes, so accented names tokenize
/// the same as ASCII. Input shorter than `min` yields an empty set.
///
/// # Errors
///
/// Returns `InvalidTokenBounds` when `min == 0` or `min > max` — a caller
/// contract violation, rejected rather than silently reinterpreted.
pub fn ngrams(text: &str, min: usize, max: usize) -> Result<TokenSet> {
    if min == 0 || min > max {
        return Err(Error::InvalidTokenBounds { min, max });
    }
    let chars: Vec<char> = text.chars().collect();
    Ok(ngrams_of(&chars, min, max))
}

/// [`ngrams`] with the fixed index bounds `[NGRAM_MIN, NGRAM_MAX]`
pub fn index_ngrams(text: &str) -> TokenSet {
    let chars: Vec<char> = text.chars().collect();
    ngrams_of(&chars, NGRAM_MIN, NGRAM_MAX)
}

// Bounds are validated by the public entry points; min >= 1 here.
fn ngrams_of(chars: &[char], min: usize, max: usize) -> TokenSet {
    let mut out = TokenSet::new();
    let upper = max.min(chars.len());
    for n in min..=upper {
        for start in 0..=(chars.len() - n) {
            out.insert(chars[start..start + n].iter().collect());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_uppercases_and_strips() {
        assert_eq!(normalize("ab c"), "ABC");
        assert_eq!(normalize(" 1z 999 "), "1Z999");
        assert_eq!(normalize("maría pérez"), "MARÍAPÉREZ");
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_ngrams_basic() {
        let tokens = ngrams("ABCD", 3, 8).unwrap();
        assert!(tokens.contains("ABC"));
        assert!(tokens.contains("BCD"));
        assert!(tokens.contains("ABCD"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_ngrams_too_short_input() {
        assert!(ngrams("AB", 3, 8).unwrap().is_empty());
        assert!(ngrams("", 3, 8).unwrap().is_empty());
    }

    #[test]
    fn test_ngrams_rejects_bad_bounds() {
        assert!(matches!(
            ngrams("ABC", 0, 8),
            Err(Error::InvalidTokenBounds { .. })
        ));
        assert!(matches!(
            ngrams("ABC", 5, 3),
            Err(Error::InvalidTokenBounds { .. })
        ));
    }

    #[test]
    fn test_ngrams_counts_characters_not_bytes() {
        // "MARÍA" is 5 characters but more than 5 bytes.
        let tokens = index_ngrams("MARÍA");
        assert!(tokens.contains("MAR"));
        assert!(tokens.contains("ARÍ"));
        assert!(tokens.contains("MARÍA"));
    }

    #[test]
    fn test_index_ngrams_caps_at_max() {
        let tokens = index_ngrams("ABCDEFGHIJ"); // 10 chars
        assert!(tokens.contains("ABCDEFGH")); // 8-gram
        assert!(!tokens.contains("ABCDEFGHI")); // 9-gram never generated
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in ".*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_has_no_whitespace(s in ".*") {
            prop_assert!(!normalize(&s).chars().any(char::is_whitespace));
        }

        #[test]
        fn prop_ngram_completeness(s in "[A-Z0-9]{3,20}") {
            // Every in-range substring of the normalized text is a member.
            let text = normalize(&s);
            let tokens = index_ngrams(&text);
            let chars: Vec<char> = text.chars().collect();
            for n in NGRAM_MIN..=NGRAM_MAX.min(chars.len()) {
                for start in 0..=(chars.len() - n) {
                    let sub: String = chars[start..start + n].iter().collect();
                    prop_assert!(tokens.contains(&sub));
                }
            }
        }

        #[test]
        fn prop_ngram_minimality(s in "\\PC{0,24}") {
            for token in index_ngrams(&normalize(&s)) {
                let len = token.chars().count();
                prop_assert!(len >= NGRAM_MIN && len <= NGRAM_MAX);
            }
        }
    }
}
