// Candidate Pairs - equi-join on block_key and the output CSV shape
//
// Both engines write through CandidateWriter so the file layout is identical.

use csv::{Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::entities::BlockRecord;
use crate::error::{BlockingError, Result};

/// Output header, in column order
pub const CANDIDATE_COLUMNS: [&str; 15] = [
    "source_1",
    "row_id_1",
    "raw_name_1",
    "normalized_1",
    "merchant_type_1",
    "core_1",
    "suffix_1",
    "block_key",
    "source_2",
    "row_id_2",
    "raw_name_2",
    "normalized_2",
    "merchant_type_2",
    "core_2",
    "suffix_2",
];

// ============================================================================
// CANDIDATE ROW
// ============================================================================

/// One joined output row. Field order matches `CANDIDATE_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateRow {
    pub source_1: String,
    pub row_id_1: i64,
    pub raw_name_1: String,
    pub normalized_1: String,
    pub merchant_type_1: String,
    pub core_1: String,
    pub suffix_1: String,
    pub block_key: String,
    pub source_2: String,
    pub row_id_2: i64,
    pub raw_name_2: String,
    pub normalized_2: String,
    pub merchant_type_2: String,
    pub core_2: String,
    pub suffix_2: String,
}

impl CandidateRow {
    /// Pair two records sharing a block key
    pub fn from_records(left: &BlockRecord, right: &BlockRecord) -> Self {
        CandidateRow {
            source_1: left.source.clone(),
            row_id_1: left.row_id,
            raw_name_1: left.raw_name.clone(),
            normalized_1: left.normalized.clone(),
            merchant_type_1: left.merchant_type.clone(),
            core_1: left.core.clone(),
            suffix_1: left.suffix.clone(),
            block_key: left.block_key.clone(),
            source_2: right.source.clone(),
            row_id_2: right.row_id,
            raw_name_2: right.raw_name.clone(),
            normalized_2: right.normalized.clone(),
            merchant_type_2: right.merchant_type.clone(),
            core_2: right.core.clone(),
            suffix_2: right.suffix.clone(),
        }
    }
}

// ============================================================================
// WRITER
// ============================================================================

/// Streams candidate rows to CSV. The header is written on creation, so an
/// empty join still produces a valid header-only file.
pub struct CandidateWriter<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl CandidateWriter<File> {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> CandidateWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(CANDIDATE_COLUMNS)?;
        Ok(CandidateWriter {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &CandidateRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn write_pair(&mut self, left: &BlockRecord, right: &BlockRecord) -> Result<()> {
        self.write_row(&CandidateRow::from_records(left, right))
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        let mut writer = self.writer;
        writer.flush()?;
        writer.into_inner().map_err(|e| {
            BlockingError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}

// ============================================================================
// IN-MEMORY JOIN
// ============================================================================

/// Inner equi-join of two record sets on `block_key`.
///
/// Output follows left order; within one left record, right matches keep
/// their input order.
pub fn build_candidate_pairs(left: &[BlockRecord], right: &[BlockRecord]) -> Vec<CandidateRow> {
    let mut index: HashMap<&str, Vec<&BlockRecord>> = HashMap::new();
    for rec in right {
        index.entry(rec.block_key.as_str()).or_default().push(rec);
    }

    left.iter()
        .flat_map(|l| {
            index
                .get(l.block_key.as_str())
                .into_iter()
                .flatten()
                .map(move |r| CandidateRow::from_records(l, r))
        })
        .collect()
}

/// Read a candidate CSV back into rows.
pub fn read_candidates(path: &Path) -> Result<Vec<CandidateRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<CandidateRow>, _>>()?;
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================
