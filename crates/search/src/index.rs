//! Token index builders for tracking codes and client records
//!
//! Builders are pure: they turn source fields into the token set that gets
//! persisted onto the owning record. They never fail — a missing or empty
//! field is simply skipped — and the result always replaces the prior stored
//! set in full.
//!
//! Names are indexed per whitespace-delimited word (n-grams of each word plus
//! the whole word plus its bounded prefixes) so that "mar" matches "María"
//! without polluting the index with substrings spanning word boundaries.
//! Codes and email local parts have no word structure, so plain n-grams
//! suffice. Email domains are deliberately excluded: "gmail" must never be a
//! hit.

use crate::tokenizer::{index_ngrams, normalize};
use casillero_core::limits::{NGRAM_MAX, NGRAM_MIN};
use casillero_core::types::TokenSet;
use serde::{Deserialize, Serialize};

/// Output of [`build_tracking_tokens`]: the canonical form plus its token set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingTokens {
    /// Normalized tracking code, stored alongside the tokens for exact lookups
    pub normalized: String,
    /// N-gram token set over the normalized code
    pub tokens: TokenSet,
}

/// Build the search tokens for a tracking code.
///
/// Tracking codes are single runs with no word structure, so the set is the
/// plain n-grams of the normalized code.
pub fn build_tracking_tokens(tracking: &str) -> TrackingTokens {
    let normalized = normalize(tracking);
    let tokens = index_ngrams(&normalized);
    TrackingTokens { normalized, tokens }
}

/// Build the combined search tokens for a client record.
///
/// Per present field:
/// - `name`: each word contributes its n-grams, the whole word, and every
///   prefix with length in the index range
/// - `code`: plain n-grams of the normalized code, plus the whole code so
///   full-code queries match even past the n-gram cap
/// - `email`: plain n-grams of the local part only; the domain is excluded
///
/// Returns the deduplicated union; empty set when all fields are absent.
pub fn build_client_tokens(
    name: Option<&str>,
    code: Option<&str>,
    email: Option<&str>,
) -> TokenSet {
    let mut tokens = TokenSet::new();

    if let Some(name) = present(name) {
        for word in name.split_whitespace() {
            let word = normalize(word);
            tokens.extend(index_ngrams(&word));
            add_whole(&mut tokens, &word);
            add_prefixes(&mut tokens, &word);
        }
    }

    if let Some(code) = present(code) {
        let code = normalize(code);
        tokens.extend(index_ngrams(&code));
        add_whole(&mut tokens, &code);
    }

    if let Some(email) = present(email) {
        let local = email.split('@').next().unwrap_or_default();
        let local = normalize(local);
        tokens.extend(index_ngrams(&local));
        add_whole(&mut tokens, &local);
    }

    tokens
}

fn present(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.trim().is_empty())
}

// Whole-value token, so queries longer than NGRAM_MAX can still hit exactly.
// Values shorter than NGRAM_MIN stay unindexed; no query can reach them.
fn add_whole(tokens: &mut TokenSet, value: &str) {
    if value.chars().count() >= NGRAM_MIN {
        tokens.insert(value.to_string());
    }
}

fn add_prefixes(tokens: &mut TokenSet, word: &str) {
    let chars: Vec<char> = word.chars().collect();
    for len in NGRAM_MIN..=NGRAM_MAX.min(chars.len()) {
        tokens.insert(chars[..len].iter().collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_tokens_normalizes() {
        let built = build_tracking_tokens(" 1z 999 aa1 ");
        assert_eq!(built.normalized, "1Z999AA1");
        assert!(built.tokens.contains("1Z9"));
        assert!(built.tokens.contains("999AA1"));
        assert!(built.tokens.contains("1Z999AA1"));
    }

    #[test]
    fn test_tracking_tokens_short_code() {
        let built = build_tracking_tokens("ab");
        assert_eq!(built.normalized, "AB");
        assert!(built.tokens.is_empty());
    }

    #[test]
    fn test_client_tokens_name_words_indexed_separately() {
        let tokens = build_client_tokens(Some("María Pérez"), None, None);
        // Word prefixes and word n-grams are present.
        assert!(tokens.contains("MAR"));
        assert!(tokens.contains("MARÍA"));
        assert!(tokens.contains("PÉR"));
        assert!(tokens.contains("PÉREZ"));
        // Nothing spans the word boundary.
        assert!(!tokens.contains("ÍAP"));
        assert!(!tokens.contains("APÉ"));
    }

    #[test]
    fn test_client_tokens_code_plain_ngrams() {
        let tokens = build_client_tokens(None, Some("cl-00421"), None);
        assert!(tokens.contains("CL-"));
        assert!(tokens.contains("00421"));
        assert!(tokens.contains("CL-00421"));
    }

    #[test]
    fn test_client_tokens_email_domain_excluded() {
        let tokens = build_client_tokens(None, None, Some("maria.perez@gmail.com"));
        assert!(tokens.contains("MARIA.P"));
        assert!(tokens.contains("PEREZ"));
        // Domain must not be searchable through the email field.
        assert!(!tokens.contains("GMAIL"));
        assert!(!tokens.contains("GMA"));
        assert!(!tokens.contains("COM"));
    }

    #[test]
    fn test_client_tokens_all_absent() {
        assert!(build_client_tokens(None, None, None).is_empty());
        assert!(build_client_tokens(Some("  "), Some(""), None).is_empty());
    }

    #[test]
    fn test_client_tokens_union_across_fields() {
        let tokens = build_client_tokens(Some("Acme"), Some("AC-1"), Some("ops@acme.io"));
        assert!(tokens.contains("ACME")); // name word
        assert!(tokens.contains("AC-1")); // whole code
        assert!(tokens.contains("OPS")); // email local part
    }

    #[test]
    fn test_client_tokens_long_word_whole_token() {
        let tokens = build_client_tokens(Some("Transportadora"), None, None);
        // N-grams cap at NGRAM_MAX, but the whole word stays searchable.
        assert!(tokens.contains("TRANSPORTADORA"));
        assert!(!tokens.contains("TRANSPORT")); // 9 chars, above the cap
    }

    #[test]
    fn test_short_name_word_unindexed() {
        // Two-character words are below NGRAM_MIN and never indexed.
        let tokens = build_client_tokens(Some("Jo An"), None, None);
        assert!(tokens.is_empty());
    }
}
