// Block Store - where the out-of-core engine keeps its two record tables
//
// The chunked engine only ever needs four things from storage: create a table
// from rows, append rows, inner-join two tables on block_key straight into a
// CSV file, and count rows. SQLite provides them on disk; MemoryBlockStore
// provides them in process for tests.

use log::warn;
use std::collections::HashMap;
use std::path::Path;

use crate::entities::BlockRecord;
use crate::error::{BlockingError, Result};
use crate::pairs::CandidateWriter;

// ============================================================================
// CAPABILITY INTERFACE
// ============================================================================

pub trait BlockStore {
    /// Create `table` holding `records`, replacing any existing table of that name.
    fn create_table(&mut self, table: &str, records: &[BlockRecord]) -> Result<()>;

    /// Append `records` to an existing table
    fn append_rows(&mut self, table: &str, records: &[BlockRecord]) -> Result<()>;

    /// Inner equi-join `left` × `right` on block_key, streamed to a CSV file.
    ///
    /// Returns the number of candidate rows written.
    fn join_to_csv(&mut self, left: &str, right: &str, output: &Path) -> Result<u64>;

    fn count_rows(&self, table: &str) -> Result<u64>;
}

/// Table names are interpolated into SQL, so only bare identifiers pass.
pub fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(BlockingError::InvalidTableName(table.to_string()))
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBlockStore;

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::pairs::CandidateRow;
    use log::debug;
    use rusqlite::{params, Connection};

    const COLUMNS: &str =
        "source, row_id, raw_name, normalized, merchant_type, core, suffix, block_key";

    pub struct SqliteBlockStore {
        conn: Connection,
    }

    impl SqliteBlockStore {
        /// Open (or create) a store database file
        pub fn open(path: &Path) -> Result<Self> {
            let conn = Connection::open(path)?;
            setup_store(&conn)?;
            debug!("Opened block store at {}", path.display());
            Ok(SqliteBlockStore { conn })
        }

        pub fn open_in_memory() -> Result<Self> {
            let conn = Connection::open_in_memory()?;
            setup_store(&conn)?;
            Ok(SqliteBlockStore { conn })
        }

        fn require_table(&self, table: &str) -> Result<()> {
            validate_table_name(table)?;
            if table_exists(&self.conn, table)? {
                Ok(())
            } else {
                Err(BlockingError::UnknownTable(table.to_string()))
            }
        }
    }

    /// Scratch database: a failed run is rerun from scratch, never recovered.
    fn setup_store(conn: &Connection) -> Result<()> {
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "OFF", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "OFF")?;
        Ok(())
    }

    pub(super) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    impl BlockStore for SqliteBlockStore {
        fn create_table(&mut self, table: &str, records: &[BlockRecord]) -> Result<()> {
            validate_table_name(table)?;

            if table_exists(&self.conn, table)? {
                warn!("Replacing existing table '{}' in block store", table);
                self.conn.execute(&format!("DROP TABLE {}", table), [])?;
            }

            self.conn.execute(
                &format!(
                    "CREATE TABLE {} (
                        source TEXT NOT NULL,
                        row_id INTEGER NOT NULL,
                        raw_name TEXT NOT NULL,
                        normalized TEXT NOT NULL,
                        merchant_type TEXT NOT NULL,
                        core TEXT NOT NULL,
                        suffix TEXT NOT NULL,
                        block_key TEXT NOT NULL
                    )",
                    table
                ),
                [],
            )?;

            self.append_rows(table, records)
        }

        fn append_rows(&mut self, table: &str, records: &[BlockRecord]) -> Result<()> {
            self.require_table(table)?;

            let tx = self.conn.transaction()?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    table, COLUMNS
                ))?;

                for rec in records {
                    stmt.execute(params![
                        rec.source,
                        rec.row_id,
                        rec.raw_name,
                        rec.normalized,
                        rec.merchant_type,
                        rec.core,
                        rec.suffix,
                        rec.block_key,
                    ])?;
                }
            }
            tx.commit()?;

            Ok(())
        }

        fn join_to_csv(&mut self, left: &str, right: &str, output: &Path) -> Result<u64> {
            self.require_table(left)?;
            self.require_table(right)?;

            self.conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{0}_block_key ON {0}(block_key)",
                    right
                ),
                [],
            )?;

            let mut stmt = self.conn.prepare(&format!(
                "SELECT
                    l.source, l.row_id, l.raw_name, l.normalized,
                    l.merchant_type, l.core, l.suffix, l.block_key,
                    r.source, r.row_id, r.raw_name, r.normalized,
                    r.merchant_type, r.core, r.suffix
                 FROM {} AS l
                 INNER JOIN {} AS r ON l.block_key = r.block_key",
                left, right
            ))?;

            let mut writer = CandidateWriter::create(output)?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let candidate = CandidateRow {
                    source_1: row.get(0)?,
                    row_id_1: row.get(1)?,
                    raw_name_1: row.get(2)?,
                    normalized_1: row.get(3)?,
                    merchant_type_1: row.get(4)?,
                    core_1: row.get(5)?,
                    suffix_1: row.get(6)?,
                    block_key: row.get(7)?,
                    source_2: row.get(8)?,
                    row_id_2: row.get(9)?,
                    raw_name_2: row.get(10)?,
                    normalized_2: row.get(11)?,
                    merchant_type_2: row.get(12)?,
                    core_2: row.get(13)?,
                    suffix_2: row.get(14)?,
                };
                writer.write_row(&candidate)?;
            }

            let written = writer.rows_written();
            writer.finish()?;
            Ok(written)
        }

        fn count_rows(&self, table: &str) -> Result<u64> {
            self.require_table(table)?;
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(count as u64)
        }
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Process-local stand-in for the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    tables: HashMap<String, Vec<BlockRecord>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, table: &str) -> Result<&Vec<BlockRecord>> {
        self.tables
            .get(table)
            .ok_or_else(|| BlockingError::UnknownTable(table.to_string()))
    }
}

impl BlockStore for MemoryBlockStore {
    fn create_table(&mut self, table: &str, records: &[BlockRecord]) -> Result<()> {
        validate_table_name(table)?;
        if self.tables.insert(table.to_string(), records.to_vec()).is_some() {
            warn!("Replacing existing table '{}' in block store", table);
        }
        Ok(())
    }

    fn append_rows(&mut self, table: &str, records: &[BlockRecord]) -> Result<()> {
        validate_table_name(table)?;
        self.tables
            .get_mut(table)
            .ok_or_else(|| BlockingError::UnknownTable(table.to_string()))?
            .extend_from_slice(records);
        Ok(())
    }

    fn join_to_csv(&mut self, left: &str, right: &str, output: &Path) -> Result<u64> {
        let left = self.table(left)?;
        let right = self.table(right)?;

        let mut index: HashMap<&str, Vec<&BlockRecord>> = HashMap::new();
        for rec in right {
            index.entry(rec.block_key.as_str()).or_default().push(rec);
        }

        let mut writer = CandidateWriter::create(output)?;
        for l in left {
            for r in index.get(l.block_key.as_str()).into_iter().flatten() {
                writer.write_pair(l, r)?;
            }
        }

        let written = writer.rows_written();
        writer.finish()?;
        Ok(written)
    }

    fn count_rows(&self, table: &str) -> Result<u64> {
        Ok(self.table(table)?.len() as u64)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::read_candidates;
    use crate::parser::parse_merchant;

    fn record(source: &str, row_id: i64, name: &str) -> BlockRecord {
        BlockRecord::from_parsed(source, row_id, &parse_merchant(Some(name)))
    }

    fn exercise_store<S: BlockStore>(store: &mut S) {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pairs.csv");

        store
            .create_table("b1", &[record("col1", 0, "Shop Mart99"), record("col1", 1, "Gas Petro")])
            .unwrap();
        store.create_table("b2", &[record("col2", 0, "Cafe May")]).unwrap();
        store
            .append_rows("b2", &[record("col2", 1, "mart99 store"), record("col2", 2, "Gas Petro Q1")])
            .unwrap();

        assert_eq!(store.count_rows("b1").unwrap(), 2);
        assert_eq!(store.count_rows("b2").unwrap(), 3);

        let written = store.join_to_csv("b1", "b2", &output).unwrap();
        assert_eq!(written, 2);

        let rows = read_candidates(&output).unwrap();
        let mut keys: Vec<(&str, i64, i64)> = rows
            .iter()
            .map(|r| (r.block_key.as_str(), r.row_id_1, r.row_id_2))
            .collect();
        keys.sort();
        assert_eq!(keys, vec![("GAS|PETRO", 1, 2), ("SHOP|MART99", 0, 1)]);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("b1").is_ok());
        assert!(validate_table_name("_blocks_2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1b").is_err());
        assert!(validate_table_name("b1; DROP TABLE b2").is_err());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryBlockStore::new();
        exercise_store(&mut store);
    }

    #[test]
    fn test_memory_store_unknown_table() {
        let mut store = MemoryBlockStore::new();
        let err = store.append_rows("b1", &[]).unwrap_err();
        assert!(matches!(err, BlockingError::UnknownTable(_)));
        assert!(store.count_rows("b9").is_err());
    }

    #[test]
    fn test_memory_store_create_replaces() {
        let mut store = MemoryBlockStore::new();
        store.create_table("b1", &[record("col1", 0, "A")]).unwrap();
        store.create_table("b1", &[]).unwrap();
        assert_eq!(store.count_rows("b1").unwrap(), 0);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_store_in_memory() {
        let mut store = SqliteBlockStore::open_in_memory().unwrap();
        exercise_store(&mut store);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_store_on_disk_replaces_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("blocking.db");

        {
            let mut store = SqliteBlockStore::open(&db_path).unwrap();
            store.create_table("b1", &[record("col1", 0, "A"), record("col1", 1, "B")]).unwrap();
        }

        let mut store = SqliteBlockStore::open(&db_path).unwrap();
        assert_eq!(store.count_rows("b1").unwrap(), 2);
        store.create_table("b1", &[record("col1", 0, "C")]).unwrap();
        assert_eq!(store.count_rows("b1").unwrap(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_store_rejects_bad_names() {
        let mut store = SqliteBlockStore::open_in_memory().unwrap();
        let err = store.create_table("b1 x", &[]).unwrap_err();
        assert!(matches!(err, BlockingError::InvalidTableName(_)));
        assert!(matches!(
            store.count_rows("missing").unwrap_err(),
            BlockingError::UnknownTable(_)
        ));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_store_empty_join_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pairs.csv");

        let mut store = SqliteBlockStore::open_in_memory().unwrap();
        store.create_table("b1", &[record("col1", 0, "Cty ABC")]).unwrap();
        store.create_table("b2", &[record("col2", 0, "Cty XYZ")]).unwrap();

        assert_eq!(store.join_to_csv("b1", "b2", &output).unwrap(), 0);
        assert!(read_candidates(&output).unwrap().is_empty());
    }
}
