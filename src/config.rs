// Run Configuration - which engine, which columns, where to write

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::BlockingError;
use crate::reader::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_COLUMN_1: &str = "Merchant_Name_1";
pub const DEFAULT_COLUMN_2: &str = "Merchant_Name_2";
pub const DEFAULT_OUTPUT: &str = "merchant_candidate_pairs_blocked.csv";

// ============================================================================
// ENGINE
// ============================================================================

/// Execution strategy for the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Parse everything, hash-join in memory, write once
    Memory,

    /// Parse in chunks into a SQLite store, join on disk
    Sqlite,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Memory => "memory",
            Engine::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = BlockingError;

    /// Case-insensitive; unknown names are a configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "pandas" => Ok(Engine::Memory),
            "sqlite" | "out-of-core" | "chunked" | "duckdb" => Ok(Engine::Sqlite),
            _ => Err(BlockingError::UnknownEngine(s.to_string())),
        }
    }
}

// ============================================================================
// BLOCKING CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct BlockingConfig {
    pub input: PathBuf,
    pub column_1: String,
    pub column_2: String,
    pub output: PathBuf,
    pub engine: Engine,

    /// Rows per chunk (out-of-core only); unset or non-positive → 200 000
    pub chunk_size: Option<i64>,

    /// Store database path (out-of-core only); defaults to a temp directory
    pub store_path: Option<PathBuf>,
}

impl BlockingConfig {
    /// Config with default columns, output path and the in-memory engine
    pub fn new(input: impl Into<PathBuf>) -> Self {
        BlockingConfig {
            input: input.into(),
            column_1: DEFAULT_COLUMN_1.to_string(),
            column_2: DEFAULT_COLUMN_2.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            engine: Engine::Memory,
            chunk_size: None,
            store_path: None,
        }
    }

    /// Builder pattern: set both column names
    pub fn with_columns(mut self, column_1: &str, column_2: &str) -> Self {
        self.column_1 = column_1.to_string();
        self.column_2 = column_2.to_string();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<i64>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_store_path(mut self, store_path: Option<PathBuf>) -> Self {
        self.store_path = store_path;
        self
    }

    /// Chunk size actually used by the out-of-core engine
    pub fn effective_chunk_size(&self) -> usize {
        match self.chunk_size {
            Some(n) if n > 0 => n as usize,
            _ => DEFAULT_CHUNK_SIZE,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
