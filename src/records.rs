// Record Assembly - one BlockRecord per row of a named column
//
// Row ids stay stable when the input is processed in chunks: each chunk is
// numbered from its own index labels plus the count of rows already seen.

use csv::StringRecord;

use crate::entities::BlockRecord;
use crate::error::{BlockingError, Result};
use crate::parser::parse_merchant;

// ============================================================================
// ROW CHUNK
// ============================================================================

/// A batch of CSV rows sharing one header.
#[derive(Debug, Clone)]
pub struct RowChunk {
    headers: StringRecord,
    rows: Vec<StringRecord>,

    /// Native index label of each row; chunk-relative positions by default
    index: Vec<String>,
}

impl RowChunk {
    /// Chunk labelled with positions `0..rows.len()`
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        let index = (0..rows.len()).map(|i| i.to_string()).collect();
        RowChunk {
            headers,
            rows,
            index,
        }
    }

    /// Builder pattern: replace the index labels.
    ///
    /// Rows beyond the end of `index` fall back to their position.
    pub fn with_index(mut self, index: Vec<String>) -> Self {
        self.index = index;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column in the header
    pub fn column_position(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| BlockingError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Cells of one column; empty or absent cells are missing values.
    pub fn column_values(&self, position: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(position).filter(|v| !v.is_empty()))
    }

    fn label(&self, position: usize) -> Option<&str> {
        self.index.get(position).map(String::as_str)
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Row id for the row at `position`: offset + integer label, or offset +
/// position when the label is not an integer or the sum overflows.
pub fn row_id_for(label: Option<&str>, position: usize, row_offset: i64) -> i64 {
    label
        .and_then(|l| l.trim().parse::<i64>().ok())
        .and_then(|idx| row_offset.checked_add(idx))
        .unwrap_or(row_offset + position as i64)
}

/// Parse every row of `column` into a BlockRecord labelled `source_label`.
///
/// `row_offset` is the number of rows processed in earlier chunks.
pub fn prepare_block_records(
    chunk: &RowChunk,
    column: &str,
    source_label: &str,
    row_offset: i64,
) -> Result<Vec<BlockRecord>> {
    let position = chunk.column_position(column)?;

    let records = chunk
        .column_values(position)
        .enumerate()
        .map(|(i, raw)| {
            let row_id = row_id_for(chunk.label(i), i, row_offset);
            let parsed = parse_merchant(raw);
            BlockRecord::from_parsed(source_label, row_id, &parsed)
        })
        .collect();

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
