// Name Normalization - raw merchant text → uppercase ASCII-ish tokens
//
// Steps (order matters):
//   1. uppercase + trim
//   2. fold Vietnamese/Latin diacritics (NFD, drop combining marks, Đ → D)
//   3. "CO.OP" → "COOP" (must run before punctuation removal)
//   4. punctuation → space
//   5. collapse whitespace

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a merchant name.
///
/// Missing input normalizes to the empty string. Punctuation becomes a space
/// rather than being deleted, so "A.B" yields two tokens.
///
/// # Examples:
/// ```
/// use merchant_blocking::normalize::normalize_name;
/// assert_eq!(normalize_name(Some("  Cty. TNHH  ABC ")), "CTY TNHH ABC");
/// assert_eq!(normalize_name(Some("Co.op Mart")), "COOP MART");
/// assert_eq!(normalize_name(Some("Quán ăn Hương Sen")), "QUAN AN HUONG SEN");
/// assert_eq!(normalize_name(None), "");
/// ```
pub fn normalize_name(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) => raw,
        None => return String::new(),
    };

    let upper = raw.to_uppercase();
    let folded = fold_accents(upper.trim());
    let folded = folded.replace("CO.OP", "COOP");
    let spaced = PUNCTUATION.replace_all(&folded, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&spaced, " ");

    collapsed.trim().to_string()
}

/// Strip diacritics: canonical decomposition, combining marks dropped.
///
/// Đ/đ have no decomposition and are mapped by hand.
fn fold_accents(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'Đ' => 'D',
            'đ' => 'd',
            _ => c,
        })
        .collect()
}

/// Split a normalized name into whitespace-delimited tokens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split_whitespace().map(str::to_string).collect()
}

// ============================================================================
// TESTS
// ============================================================================
