// Merchant Parser - raw name → ParsedMerchant → block key
//
// normalize → tokenize → detect type → core (from stripped tokens) → suffix

use crate::entities::ParsedMerchant;
use crate::extract::{extract_core, extract_suffix};
use crate::normalize::{normalize_name, tokenize};
use crate::rules::detect_type;

/// Full parse pipeline for one name.
///
/// # Example:
/// ```
/// use merchant_blocking::parser::{build_block_key, parse_merchant};
///
/// let parsed = parse_merchant(Some("Cty TNHH ABC Q1"));
/// assert_eq!(parsed.tokens, vec!["CTY", "TNHH", "ABC", "Q1"]);
/// assert_eq!(parsed.core, "ABC");
/// assert_eq!(parsed.suffix_tokens, vec!["Q1"]);
/// assert_eq!(build_block_key(&parsed), "COMPANY_CT|ABC");
/// ```
pub fn parse_merchant(raw: Option<&str>) -> ParsedMerchant {
    let normalized = normalize_name(raw);
    let tokens = tokenize(&normalized);
    let mtype = detect_type(&tokens);
    let core = extract_core(&tokens, mtype);
    let suffix_tokens = extract_suffix(&tokens);

    ParsedMerchant {
        raw_name: raw.map(str::to_string),
        normalized,
        tokens,
        mtype,
        core,
        suffix_tokens,
    }
}

/// Blocking key: "{type}|{core}". An empty core still yields a key ("OTHER|").
pub fn build_block_key(parsed: &ParsedMerchant) -> String {
    format!("{}|{}", parsed.mtype.as_str(), parsed.core)
}

// ============================================================================
// TESTS
// ============================================================================
