// Blocking Engines - in-memory join vs chunked out-of-core join
//
// Both engines produce the same set of candidate pairs for the same input;
// only the row order of the output file may differ.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::{BlockingConfig, Engine};
use crate::db::BlockStore;
use crate::error::Result;
use crate::pairs::{build_candidate_pairs, CandidateWriter};
use crate::reader::{read_all, ChunkedCsvReader};
use crate::records::prepare_block_records;

/// Source label for records parsed from the first column
pub const SOURCE_1: &str = "col1";
/// Source label for records parsed from the second column
pub const SOURCE_2: &str = "col2";

const TABLE_1: &str = "b1";
const TABLE_2: &str = "b2";

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BlockingSummary {
    pub run_id: Uuid,
    pub engine: Engine,
    pub records_1: u64,
    pub records_2: u64,
    pub candidate_pairs: u64,

    /// None when nothing was written (empty input, out-of-core engine)
    pub output_path: Option<PathBuf>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BlockingSummary {
    fn start(engine: Engine) -> Self {
        let now = Utc::now();
        BlockingSummary {
            run_id: Uuid::new_v4(),
            engine,
            records_1: 0,
            records_2: 0,
            candidate_pairs: 0,
            output_path: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        info!(
            "Blocking run {} finished: {} + {} records, {} candidate pairs",
            self.run_id, self.records_1, self.records_2, self.candidate_pairs
        );
        self
    }

    pub fn has_output(&self) -> bool {
        self.output_path.is_some()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// IN-MEMORY ENGINE
// ============================================================================

/// Parse both columns fully in memory, join once, write once.
///
/// Empty input still writes a header-only file.
pub fn run_in_memory(config: &BlockingConfig) -> Result<BlockingSummary> {
    let mut summary = BlockingSummary::start(Engine::Memory);
    info!("Reading {} into memory", config.input.display());

    let chunk = read_all(&config.input)?;
    let b1 = prepare_block_records(&chunk, &config.column_1, SOURCE_1, 0)?;
    let b2 = prepare_block_records(&chunk, &config.column_2, SOURCE_2, 0)?;
    let candidates = build_candidate_pairs(&b1, &b2);

    let mut writer = CandidateWriter::create(&config.output)?;
    for row in &candidates {
        writer.write_row(row)?;
    }
    summary.candidate_pairs = writer.rows_written();
    writer.finish()?;

    summary.records_1 = b1.len() as u64;
    summary.records_2 = b2.len() as u64;
    summary.output_path = Some(config.output.clone());
    Ok(summary.finish())
}

// ============================================================================
// OUT-OF-CORE ENGINE
// ============================================================================

/// Chunked engine over any block store.
///
/// Chunks are committed strictly in input order; `rows_processed` is the
/// row-id offset handed to each chunk. Zero chunks means no data: nothing is
/// written and the run still succeeds.
pub fn run_out_of_core_with_store<S: BlockStore>(
    config: &BlockingConfig,
    store: &mut S,
) -> Result<BlockingSummary> {
    let mut summary = BlockingSummary::start(Engine::Sqlite);
    let chunk_size = config.effective_chunk_size();
    info!(
        "Reading {} in chunks of {} rows",
        config.input.display(),
        chunk_size
    );

    let reader = ChunkedCsvReader::open(&config.input, chunk_size)?;
    let mut rows_processed: i64 = 0;
    let mut first_chunk = true;

    for chunk in reader {
        let chunk = chunk?;
        let b1 = prepare_block_records(&chunk, &config.column_1, SOURCE_1, rows_processed)?;
        let b2 = prepare_block_records(&chunk, &config.column_2, SOURCE_2, rows_processed)?;

        if first_chunk {
            store.create_table(TABLE_1, &b1)?;
            store.create_table(TABLE_2, &b2)?;
            first_chunk = false;
        } else {
            store.append_rows(TABLE_1, &b1)?;
            store.append_rows(TABLE_2, &b2)?;
        }

        rows_processed += chunk.len() as i64;
        debug!("Committed chunk of {} rows ({} total)", chunk.len(), rows_processed);
    }

    if first_chunk {
        info!("No data found in input.");
        return Ok(summary.finish());
    }

    summary.candidate_pairs = store.join_to_csv(TABLE_1, TABLE_2, &config.output)?;
    summary.records_1 = store.count_rows(TABLE_1)?;
    summary.records_2 = store.count_rows(TABLE_2)?;
    summary.output_path = Some(config.output.clone());
    Ok(summary.finish())
}

/// Chunked engine backed by SQLite.
///
/// Without a store path the database lives in a temp directory that is
/// removed when the run ends, successfully or not.
#[cfg(feature = "sqlite")]
pub fn run_out_of_core(config: &BlockingConfig) -> Result<BlockingSummary> {
    use crate::db::SqliteBlockStore;

    // Bound before the store so the store closes first
    let (db_path, _temp_dir) = match &config.store_path {
        Some(path) => (path.clone(), None),
        None => {
            let dir = tempfile::Builder::new().prefix("merchant-blocking").tempdir()?;
            (dir.path().join("blocking.db"), Some(dir))
        }
    };
    debug!("Block store at {}", db_path.display());

    let mut store = SqliteBlockStore::open(&db_path)?;
    run_out_of_core_with_store(config, &mut store)
}

#[cfg(not(feature = "sqlite"))]
pub fn run_out_of_core(_config: &BlockingConfig) -> Result<BlockingSummary> {
    Err(crate::error::BlockingError::EngineUnavailable)
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Run blocking with the engine named in `config`.
pub fn run_blocking(config: &BlockingConfig) -> Result<BlockingSummary> {
    info!(
        "Blocking '{}' × '{}' with the {} engine",
        config.column_1, config.column_2, config.engine
    );
    match config.engine {
        Engine::Memory => run_in_memory(config),
        Engine::Sqlite => run_out_of_core(config),
    }
}

// ============================================================================
// TESTS
// ============================================================================
