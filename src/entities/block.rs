// Block Record - one parsed row, ready to be joined on its block key

use serde::{Deserialize, Serialize};

use super::merchant::ParsedMerchant;

/// One row of one input column after parsing.
///
/// `row_id` is unique within its source column only; the two columns are
/// numbered independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Which input column this record came from ("col1" / "col2")
    pub source: String,

    /// Stable row identifier (chunk index + running offset)
    pub row_id: i64,

    pub raw_name: String,
    pub normalized: String,
    pub merchant_type: String,
    pub core: String,

    /// Suffix tokens joined by a single space
    pub suffix: String,

    /// "{merchant_type}|{core}"
    pub block_key: String,
}

impl BlockRecord {
    /// Build a record from a parsed merchant
    pub fn from_parsed(source: &str, row_id: i64, parsed: &ParsedMerchant) -> Self {
        BlockRecord {
            source: source.to_string(),
            row_id,
            raw_name: parsed.raw_name_str().to_string(),
            normalized: parsed.normalized.clone(),
            merchant_type: parsed.mtype.as_str().to_string(),
            core: parsed.core.clone(),
            suffix: parsed.suffix(),
            block_key: crate::parser::build_block_key(parsed),
        }
    }
}
