// Merchant Entity - the parsed shape of one free-text merchant name
//
// "Cty TNHH ABC Q1" → type COMPANY_CT, core ABC, suffix [Q1]
//
// Parsing is pure: the same raw string always yields the same ParsedMerchant.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MERCHANT TYPE
// ============================================================================

/// Closed set of merchant categories, listed in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MerchantType {
    /// Household business (hộ kinh doanh)
    HouseholdHkd,

    /// Pharmacy (nhà thuốc)
    Pharmacy,

    /// Restaurant / eatery (quán ăn, nhà hàng)
    RestaurantQuan,

    /// Hair salon (salon tóc, tiệm tóc)
    HairSalon,

    /// Gas station
    Gas,

    /// Cafe / coffee shop
    Cafe,

    /// Retail shop (cửa hàng, shop, store, mart)
    Shop,

    /// Office / representative office (văn phòng)
    OfficeVp,

    /// Company (công ty, TNHH)
    CompanyCt,

    /// Other / Unknown
    Other,
}

impl MerchantType {
    /// Every category, in classification priority order.
    pub const ALL: [MerchantType; 10] = [
        MerchantType::HouseholdHkd,
        MerchantType::Pharmacy,
        MerchantType::RestaurantQuan,
        MerchantType::HairSalon,
        MerchantType::Gas,
        MerchantType::Cafe,
        MerchantType::Shop,
        MerchantType::OfficeVp,
        MerchantType::CompanyCt,
        MerchantType::Other,
    ];

    /// Code used in block keys and output files
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantType::HouseholdHkd => "HOUSEHOLD_HKD",
            MerchantType::Pharmacy => "PHARMACY",
            MerchantType::RestaurantQuan => "RESTAURANT_QUAN",
            MerchantType::HairSalon => "HAIR_SALON",
            MerchantType::Gas => "GAS",
            MerchantType::Cafe => "CAFE",
            MerchantType::Shop => "SHOP",
            MerchantType::OfficeVp => "OFFICE_VP",
            MerchantType::CompanyCt => "COMPANY_CT",
            MerchantType::Other => "OTHER",
        }
    }
}

impl fmt::Display for MerchantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PARSED MERCHANT
// ============================================================================

/// Result of running one raw name through the parse pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMerchant {
    /// Original input; `None` for a missing cell
    pub raw_name: Option<String>,

    /// Uppercased, accent-folded, punctuation-free form
    pub normalized: String,

    /// Whitespace tokens of `normalized`
    pub tokens: Vec<String>,

    /// Detected category
    pub mtype: MerchantType,

    /// Representative token after type-prefix removal (may be empty)
    pub core: String,

    /// Trailing branch / district markers, in original order
    pub suffix_tokens: Vec<String>,
}

impl ParsedMerchant {
    /// Raw name as written to output; missing values become empty.
    pub fn raw_name_str(&self) -> &str {
        self.raw_name.as_deref().unwrap_or("")
    }

    /// Suffix tokens joined by a single space
    pub fn suffix(&self) -> String {
        self.suffix_tokens.join(" ")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_type_codes() {
        assert_eq!(MerchantType::HouseholdHkd.as_str(), "HOUSEHOLD_HKD");
        assert_eq!(MerchantType::RestaurantQuan.as_str(), "RESTAURANT_QUAN");
        assert_eq!(MerchantType::OfficeVp.as_str(), "OFFICE_VP");
        assert_eq!(MerchantType::Other.to_string(), "OTHER");
    }

    #[test]
    fn test_merchant_type_serde_matches_code_for_all() {
        for t in MerchantType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_merchant_type_serde_matches_code() {
        let json = serde_json::to_string(&MerchantType::HairSalon).unwrap();
        assert_eq!(json, "\"HAIR_SALON\"");
    }

    #[test]
    fn test_parsed_merchant_helpers() {
        let parsed = ParsedMerchant {
            raw_name: None,
            normalized: String::new(),
            tokens: Vec::new(),
            mtype: MerchantType::Other,
            core: String::new(),
            suffix_tokens: vec!["Q1".to_string(), "T2".to_string()],
        };
        assert_eq!(parsed.raw_name_str(), "");
        assert_eq!(parsed.suffix(), "Q1 T2");
    }
}
