// CSV Input - whole-file or fixed-size chunks of rows
//
// Every cell stays a string; empty cells are treated as missing values
// downstream.

use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{BlockingError, Result};
use crate::records::RowChunk;

/// Default rows per chunk for out-of-core processing
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // Short rows are tolerated; their missing cells read as missing values
    builder.has_headers(true).flexible(true);
    builder
}

fn open(path: &Path) -> Result<Reader<File>> {
    builder()
        .from_path(path)
        .map_err(|source| BlockingError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Read an entire CSV file as one chunk.
pub fn read_all(path: &Path) -> Result<RowChunk> {
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RowChunk::new(headers, rows))
}

/// Iterator over successive row chunks of a CSV source.
///
/// Each chunk is labelled with chunk-relative positions; callers add the
/// running row offset themselves.
pub struct ChunkedCsvReader<R: Read> {
    reader: Reader<R>,
    headers: StringRecord,
    chunk_size: usize,
    done: bool,
}

impl ChunkedCsvReader<File> {
    /// Open a CSV file for chunked reading
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        Self::new(open(path)?, chunk_size)
    }
}

impl<R: Read> ChunkedCsvReader<R> {
    /// Chunked reading over any CSV source
    pub fn from_reader(source: R, chunk_size: usize) -> Result<Self> {
        Self::new(builder().from_reader(source), chunk_size)
    }

    fn new(mut reader: Reader<R>, chunk_size: usize) -> Result<Self> {
        let headers = reader.headers()?.clone();
        Ok(ChunkedCsvReader {
            reader,
            headers,
            chunk_size: chunk_size.max(1),
            done: false,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    fn read_chunk(&mut self) -> Result<Option<RowChunk>> {
        let mut rows = Vec::with_capacity(self.chunk_size.min(4096));
        let mut record = StringRecord::new();

        while rows.len() < self.chunk_size {
            if !self.reader.read_record(&mut record)? {
                self.done = true;
                break;
            }
            rows.push(record.clone());
        }

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RowChunk::new(self.headers.clone(), rows)))
    }
}

impl<R: Read> Iterator for ChunkedCsvReader<R> {
    type Item = Result<RowChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
