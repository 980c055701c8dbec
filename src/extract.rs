// Core & Suffix Extraction
//
// The tokens that made a name match its type are removed before the core is
// picked, so "CTY" can classify a company but never become its core.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::MerchantType;
use crate::rules::find_sequence;

/// Tokens that never qualify as a core.
pub const GENERIC_TOKENS: &[&str] = &[
    "CH", "CUA", "HANG", "TIEM", "SHOP", "STORE", "MART", "POS", "QUAN", "AN",
];

/// District / branch codes recognised at the end of a name.
pub const SUFFIX_CANDIDATES: &[&str] = &[
    "BTL", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7", "Q8", "Q9", "Q10", "Q11", "Q12", "GO",
    "VAP", "GV", "OCP", "CPC",
];

const COMPANY_PREFIX_TOKENS: &[&str] = &["CT", "CTY", "CONG", "TY", "TNHH"];

// All digits, or T followed by digits (T2, T15)
static NUMERIC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T?\d+$").expect("suffix pattern is valid"));

// ============================================================================
// PREFIX STRIPPING
// ============================================================================

/// Keep only the tokens strictly after the first window matching `seq`.
/// Unchanged when there is no match.
fn strip_through_sequence(tokens: Vec<String>, seq: &[&str]) -> Vec<String> {
    match find_sequence(&tokens, seq) {
        Some(start) => tokens[start + seq.len()..].to_vec(),
        None => tokens,
    }
}

/// Drop everything up to and including the first occurrence of `token`.
fn strip_through_token(tokens: Vec<String>, token: &str) -> Option<Vec<String>> {
    tokens
        .iter()
        .position(|t| t == token)
        .map(|idx| tokens[idx + 1..].to_vec())
}

/// Drop exactly one leading token if it equals `token`.
fn strip_leading(tokens: Vec<String>, token: &str) -> Option<Vec<String>> {
    if tokens.first().map(String::as_str) == Some(token) {
        Some(tokens[1..].to_vec())
    } else {
        None
    }
}

/// Remove the tokens that signalled `mtype`.
pub fn strip_type_prefix(tokens: &[String], mtype: MerchantType) -> Vec<String> {
    let t = tokens.to_vec();

    match mtype {
        MerchantType::HouseholdHkd => strip_through_token(t.clone(), "HKD")
            .unwrap_or_else(|| strip_through_sequence(t, &["HO", "KINH", "DOANH"])),

        MerchantType::Pharmacy => strip_through_sequence(t, &["NHA", "THUOC"]),

        MerchantType::RestaurantQuan => {
            if find_sequence(&t, &["QUAN", "AN"]).is_some() {
                strip_through_sequence(t, &["QUAN", "AN"])
            } else {
                strip_through_sequence(t, &["NHA", "HANG"])
            }
        }

        MerchantType::HairSalon => {
            if find_sequence(&t, &["SALON", "TOC"]).is_some() {
                strip_through_sequence(t, &["SALON", "TOC"])
            } else {
                strip_through_sequence(t, &["TIEM", "TOC"])
            }
        }

        MerchantType::Gas => strip_leading(t.clone(), "GAS").unwrap_or(t),

        MerchantType::Cafe => strip_through_token(t.clone(), "CAFE")
            .or_else(|| strip_through_token(t.clone(), "COFFEE"))
            .unwrap_or(t),

        MerchantType::Shop => {
            if find_sequence(&t, &["CUA", "HANG"]).is_some() {
                strip_through_sequence(t, &["CUA", "HANG"])
            } else {
                strip_leading(t.clone(), "CH")
                    .or_else(|| strip_leading(t.clone(), "TIEM"))
                    .unwrap_or(t)
            }
        }

        MerchantType::OfficeVp => match strip_leading(t.clone(), "VP") {
            Some(rest) => rest,
            None => strip_through_sequence(t, &["VAN", "PHONG"]),
        },

        MerchantType::CompanyCt => {
            let run = t
                .iter()
                .take_while(|tok| COMPANY_PREFIX_TOKENS.contains(&tok.as_str()))
                .count();
            t[run..].to_vec()
        }

        MerchantType::Other => t,
    }
}

// ============================================================================
// CORE & SUFFIX
// ============================================================================

/// First non-generic token after type-prefix removal, or "".
pub fn extract_core(tokens: &[String], mtype: MerchantType) -> String {
    if tokens.is_empty() {
        return String::new();
    }
    strip_type_prefix(tokens, mtype)
        .into_iter()
        .find(|tok| !GENERIC_TOKENS.contains(&tok.as_str()))
        .unwrap_or_default()
}

fn is_suffix_token(tok: &str) -> bool {
    NUMERIC_SUFFIX.is_match(tok) || SUFFIX_CANDIDATES.contains(&tok)
}

/// Trailing run of branch/district tokens, in original order.
pub fn extract_suffix(tokens: &[String]) -> Vec<String> {
    let run = tokens
        .iter()
        .rev()
        .take_while(|tok| is_suffix_token(tok))
        .count();
    tokens[tokens.len() - run..].to_vec()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_name, tokenize};
    use crate::rules::detect_type;
    use proptest::prelude::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn strip(s: &str, mtype: MerchantType) -> Vec<String> {
        strip_type_prefix(&toks(s), mtype)
    }

    #[test]
    fn test_strip_household() {
        assert_eq!(strip("ABC HKD MINH ANH", MerchantType::HouseholdHkd), toks("MINH ANH"));
        assert_eq!(strip("HO KINH DOANH MINH", MerchantType::HouseholdHkd), toks("MINH"));
    }

    #[test]
    fn test_strip_pharmacy_drops_leading_context() {
        assert_eq!(strip("CHUOI NHA THUOC LONG CHAU", MerchantType::Pharmacy), toks("LONG CHAU"));
    }

    #[test]
    fn test_strip_restaurant_prefers_quan_an() {
        assert_eq!(strip("NHA HANG QUAN AN NGON", MerchantType::RestaurantQuan), toks("NGON"));
        assert_eq!(strip("NHA HANG SEN", MerchantType::RestaurantQuan), toks("SEN"));
    }

    #[test]
    fn test_strip_hair_salon() {
        assert_eq!(strip("SALON TOC LAN", MerchantType::HairSalon), toks("LAN"));
        assert_eq!(strip("TIEM TOC LAN", MerchantType::HairSalon), toks("LAN"));
        // SALON and TOC matched the type but not as a window: unchanged
        assert_eq!(strip("TOC LAN SALON", MerchantType::HairSalon), toks("TOC LAN SALON"));
    }

    #[test]
    fn test_strip_gas_only_leading() {
        assert_eq!(strip("GAS PETRO", MerchantType::Gas), toks("PETRO"));
        assert_eq!(strip("PETRO GAS", MerchantType::Gas), toks("PETRO GAS"));
    }

    #[test]
    fn test_strip_cafe() {
        assert_eq!(strip("HIGHLANDS COFFEE Q1", MerchantType::Cafe), toks("Q1"));
        assert_eq!(strip("CAFE MAY COFFEE", MerchantType::Cafe), toks("MAY COFFEE"));
    }

    #[test]
    fn test_strip_shop_variants() {
        assert_eq!(strip("CUA HANG TAP HOA", MerchantType::Shop), toks("TAP HOA"));
        assert_eq!(strip("CH BACH HOA MART", MerchantType::Shop), toks("BACH HOA MART"));
        assert_eq!(strip("TIEM VANG SHOP", MerchantType::Shop), toks("VANG SHOP"));
        assert_eq!(strip("MART99 SHOP", MerchantType::Shop), toks("MART99 SHOP"));
    }

    #[test]
    fn test_strip_office() {
        assert_eq!(strip("VP CTY ABC", MerchantType::OfficeVp), toks("CTY ABC"));
        assert_eq!(strip("X VAN PHONG LUAT", MerchantType::OfficeVp), toks("LUAT"));
        assert_eq!(strip("LUAT VP", MerchantType::OfficeVp), toks("LUAT VP"));
    }

    #[test]
    fn test_strip_company_leading_run() {
        assert_eq!(strip("CONG TY TNHH ABC", MerchantType::CompanyCt), toks("ABC"));
        assert_eq!(strip("ABC CTY", MerchantType::CompanyCt), toks("ABC CTY"));
        assert_eq!(strip("CTY TNHH", MerchantType::CompanyCt), Vec::<String>::new());
    }

    #[test]
    fn test_strip_other_unchanged() {
        assert_eq!(strip("PHO 24", MerchantType::Other), toks("PHO 24"));
    }

    #[test]
    fn test_extract_core_skips_generic() {
        assert_eq!(extract_core(&toks("QUAN AN QUAN HUONG SEN"), MerchantType::RestaurantQuan), "HUONG");
        assert_eq!(extract_core(&toks("CH SHOP POS MINH"), MerchantType::Shop), "MINH");
        assert_eq!(extract_core(&toks("CUA HANG"), MerchantType::Shop), "");
        assert_eq!(extract_core(&[], MerchantType::Other), "");
    }

    #[test]
    fn test_extract_core_never_uses_type_token() {
        assert_eq!(extract_core(&toks("CTY TNHH ABC Q1"), MerchantType::CompanyCt), "ABC");
        assert_eq!(extract_core(&toks("CTY"), MerchantType::CompanyCt), "");
    }

    #[test]
    fn test_extract_suffix() {
        assert_eq!(extract_suffix(&toks("ABC Q1")), toks("Q1"));
        assert_eq!(extract_suffix(&toks("ABC 12 T3 GV")), toks("12 T3 GV"));
        assert_eq!(extract_suffix(&toks("ABC Q13")), Vec::<String>::new());
        assert_eq!(extract_suffix(&toks("Q1 ABC")), Vec::<String>::new());
        assert_eq!(extract_suffix(&toks("TX")), Vec::<String>::new());
        assert_eq!(extract_suffix(&[]), Vec::<String>::new());
    }

    #[test]
    fn test_extract_suffix_whole_list() {
        let all = toks("BTL Q12 T7 2024 CPC");
        assert_eq!(extract_suffix(&all), all);
    }

    proptest! {
        #[test]
        fn prop_core_is_never_generic(s in "[A-Za-z0-9 ]{0,40}|(CH|CUA|HANG|TIEM|SHOP|STORE|MART|POS|QUAN|AN|CTY|GAS| )*") {
            let tokens = tokenize(&normalize_name(Some(&s)));
            let mtype = detect_type(&tokens);
            let core = extract_core(&tokens, mtype);
            prop_assert!(!GENERIC_TOKENS.contains(&core.as_str()));
        }

        #[test]
        fn prop_suffix_is_a_tail(s in "[A-Z0-9 ]{0,30}") {
            let tokens = toks(&s);
            let suffix = extract_suffix(&tokens);
            prop_assert!(tokens.ends_with(&suffix));
        }
    }
}
