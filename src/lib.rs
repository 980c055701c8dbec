// Merchant Blocking - Core Library
// Parses free-text merchant names and pairs up the ones sharing a block key.

pub mod blocking;  // Engines + dispatch
pub mod config;    // Engine choice, columns, paths
pub mod db;        // Block stores for out-of-core joins
pub mod entities;  // MerchantType, ParsedMerchant, BlockRecord
pub mod error;
pub mod extract;   // Core / suffix extraction
pub mod normalize; // Canonical name form + tokens
pub mod pairs;     // Candidate join + output CSV
pub mod parser;    // Name → ParsedMerchant → block key
pub mod reader;    // Whole-file and chunked CSV input
pub mod records;   // Rows → BlockRecords with stable row ids
pub mod rules;     // Type classification rules

// Re-export commonly used types
pub use blocking::{run_blocking, run_in_memory, run_out_of_core, BlockingSummary};
pub use config::{BlockingConfig, Engine};
pub use db::{BlockStore, MemoryBlockStore};
#[cfg(feature = "sqlite")]
pub use db::SqliteBlockStore;
pub use entities::{BlockRecord, MerchantType, ParsedMerchant};
pub use error::{BlockingError, Result};
pub use extract::{extract_core, extract_suffix};
pub use normalize::{normalize_name, tokenize};
pub use pairs::{build_candidate_pairs, CandidateRow, CandidateWriter};
pub use parser::{build_block_key, parse_merchant};
pub use reader::{read_all, ChunkedCsvReader, DEFAULT_CHUNK_SIZE};
pub use records::{prepare_block_records, RowChunk};
pub use rules::{detect_type, RuleEngine, TokenPattern, TypeRule};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
