//! Record store: one CSV table per activity domain.
//!
//! Tables are read whole and written row-by-row through keyed upserts. The
//! CSV implementation serializes access through an `fs2` lock on a sidecar
//! file and replaces the table atomically, so a crash mid-write leaves the
//! previous version intact.

use crate::numeric::parse_key;
use crate::schema::Table;
use crate::Result;
use fs2::FileExt;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One table row: column name to raw cell text, empty cells omitted
pub type RawRow = BTreeMap<String, String>;

/// Whether an upsert created a new row or merged into an existing one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Storage backend for the domain tables
pub trait RecordStore {
    /// Read every row of `table`; `None` if the table does not exist yet
    fn read_table(&self, table: Table) -> Result<Option<Vec<RawRow>>>;

    /// Header of `table` as stored; `None` if the table does not exist yet
    fn read_header(&self, table: Table) -> Result<Option<Vec<String>>>;

    /// Find-or-create the row whose key column equals `key` and set `updates` on it
    fn upsert_row(&mut self, table: Table, key: &str, updates: &RawRow) -> Result<Upsert>;
}

/// Compare two keys the way `table` indexes them
///
/// Numeric tables compare by value (`"3"` == `"3.0"`); others compare text
/// case-insensitively.
fn key_matches(table: Table, stored: &str, key: &str) -> bool {
    if table.numeric_key() {
        match (parse_key(stored), parse_key(key)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    } else {
        stored.trim().eq_ignore_ascii_case(key.trim())
    }
}

/// Canonical text for a key before it is written
fn normalize_key(table: Table, key: &str) -> String {
    if table.numeric_key() {
        if let Some(k) = parse_key(key) {
            return k.to_string();
        }
    }
    key.trim().to_string()
}

/// Apply an upsert to an in-memory row list
fn merge_row(rows: &mut Vec<RawRow>, table: Table, key: &str, updates: &RawRow) -> Upsert {
    let key_col = table.key_column();
    let key = normalize_key(table, key);

    let existing = rows.iter().position(|row| {
        row.get(key_col)
            .map(|stored| key_matches(table, stored, &key))
            .unwrap_or(false)
    });

    let (idx, outcome) = match existing {
        Some(idx) => (idx, Upsert::Updated),
        None => {
            rows.push(RawRow::new());
            (rows.len() - 1, Upsert::Created)
        }
    };

    let row = &mut rows[idx];
    for (column, value) in updates {
        let value = value.trim();
        if value.is_empty() {
            row.remove(column);
        } else {
            row.insert(column.clone(), value.to_string());
        }
    }
    row.insert(key_col.to_string(), key);

    outcome
}

/// Header for writing: expected columns first, then anything else seen
fn build_header(table: Table, existing: &[String], rows: &[RawRow]) -> Vec<String> {
    let mut header: Vec<String> = table.columns().iter().map(|c| c.to_string()).collect();

    for column in existing {
        if !header.contains(column) {
            header.push(column.clone());
        }
    }
    for row in rows {
        for column in row.keys() {
            if !header.contains(column) {
                header.push(column.clone());
            }
        }
    }

    header
}

// ============================================================================
// CSV store
// ============================================================================

/// Everything read from one table file
#[derive(Debug, Default)]
struct TableContents {
    headers: Vec<String>,
    rows: Vec<RawRow>,
    undecodable: Vec<Undecodable>,
}

/// A record that could not be decoded, kept byte-for-byte
#[derive(Debug)]
struct Undecodable {
    /// Number of decoded rows that preceded it
    after: usize,
    cells: BTreeMap<String, Vec<u8>>,
}

impl Undecodable {
    fn write<W: std::io::Write>(&self, writer: &mut csv::Writer<W>, header: &[String]) -> Result<()> {
        writer.write_record(
            header
                .iter()
                .map(|h| self.cells.get(h).map(Vec::as_slice).unwrap_or(&[])),
        )?;
        Ok(())
    }
}

/// CSV-backed store rooted at a data directory
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Create a store for the given data directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the CSV file holding `table`
    pub fn path_for(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.csv", table.name()))
    }

    /// Read header and rows from an open table file
    ///
    /// Records that are not valid UTF-8 are skipped with a warning and
    /// returned separately as raw bytes, so a rewrite can carry them along.
    fn read_rows(file: &File, path: &Path) -> Result<TableContents> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut contents = TableContents {
            headers,
            ..TableContents::default()
        };
        for record in reader.byte_records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            match csv::StringRecord::from_byte_record(record) {
                Ok(record) => {
                    let row: RawRow = contents
                        .headers
                        .iter()
                        .zip(record.iter())
                        .filter(|(h, v)| !h.is_empty() && !v.trim().is_empty())
                        .map(|(h, v)| (h.clone(), v.trim().to_string()))
                        .collect();
                    if !row.is_empty() {
                        contents.rows.push(row);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed record at line {} in {:?}: {}",
                        line,
                        path,
                        e.utf8_error()
                    );
                    let cells = contents
                        .headers
                        .iter()
                        .zip(e.into_byte_record().iter())
                        .filter(|(h, _)| !h.is_empty())
                        .map(|(h, v)| (h.clone(), v.to_vec()))
                        .collect();
                    contents.undecodable.push(Undecodable {
                        after: contents.rows.len(),
                        cells,
                    });
                }
            }
        }

        Ok(contents)
    }

    /// Sidecar lock file for `table`
    ///
    /// The table file itself is replaced on every write, so locks are taken on
    /// this file instead, which is never renamed.
    fn lock_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!(".{}.lock", table.name()))
    }

    fn open_lock(&self, table: Table) -> Result<File> {
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(table))?;
        Ok(lock)
    }

    /// Read a table file under a shared lock
    fn read_locked(&self, table: Table) -> Result<Option<TableContents>> {
        let path = self.path_for(table);
        if !path.exists() {
            tracing::debug!("Table '{}' not found at {:?}", table, path);
            return Ok(None);
        }

        let lock = self.open_lock(table)?;
        lock.lock_shared()?;
        let result = File::open(&path)
            .map_err(crate::Error::from)
            .and_then(|file| Self::read_rows(&file, &path));
        lock.unlock()?;

        let contents = result?;
        tracing::debug!("Read {} rows from table '{}'", contents.rows.len(), table);
        Ok(Some(contents))
    }
}

impl RecordStore for CsvStore {
    fn read_table(&self, table: Table) -> Result<Option<Vec<RawRow>>> {
        Ok(self.read_locked(table)?.map(|contents| contents.rows))
    }

    fn read_header(&self, table: Table) -> Result<Option<Vec<String>>> {
        Ok(self.read_locked(table)?.map(|contents| contents.headers))
    }

    fn upsert_row(&mut self, table: Table, key: &str, updates: &RawRow) -> Result<Upsert> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(table);

        // Hold the table lock for the whole read-modify-write
        let lock = self.open_lock(table)?;
        lock.lock_exclusive()?;

        let result = (|| -> Result<Upsert> {
            let mut contents = if path.exists() {
                Self::read_rows(&File::open(&path)?, &path)?
            } else {
                TableContents::default()
            };

            let outcome = merge_row(&mut contents.rows, table, key, updates);
            let header = build_header(table, &contents.headers, &contents.rows);

            let temp = NamedTempFile::new_in(&self.dir)?;
            {
                let mut writer = csv::Writer::from_writer(temp.as_file());
                writer.write_record(&header)?;

                // Undecodable records keep their place relative to the rows
                let mut kept = contents.undecodable.iter().peekable();
                for (idx, row) in contents.rows.iter().enumerate() {
                    while let Some(raw) = kept.next_if(|raw| raw.after <= idx) {
                        raw.write(&mut writer, &header)?;
                    }
                    writer.write_record(
                        header
                            .iter()
                            .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
                    )?;
                }
                for raw in kept {
                    raw.write(&mut writer, &header)?;
                }
                writer.flush()?;
            }
            if !contents.undecodable.is_empty() {
                tracing::warn!(
                    "Kept {} undecodable record(s) in table '{}' unchanged",
                    contents.undecodable.len(),
                    table
                );
            }
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| crate::Error::Io(e.error))?;

            Ok(outcome)
        })();

        lock.unlock()?;

        let outcome = result?;
        tracing::debug!("Upserted key {} into table '{}' ({:?})", key, table, outcome);
        Ok(outcome)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Volatile store used by tests and dry runs
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<Table, Vec<RawRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `table`
    pub fn with_rows(mut self, table: Table, rows: Vec<RawRow>) -> Self {
        self.tables.insert(table, rows);
        self
    }
}

impl RecordStore for MemoryStore {
    fn read_table(&self, table: Table) -> Result<Option<Vec<RawRow>>> {
        Ok(self.tables.get(&table).cloned())
    }

    fn read_header(&self, table: Table) -> Result<Option<Vec<String>>> {
        Ok(self
            .tables
            .get(&table)
            .map(|rows| build_header(table, &[], rows)))
    }

    fn upsert_row(&mut self, table: Table, key: &str, updates: &RawRow) -> Result<Upsert> {
        let rows = self.tables.entry(table).or_default();
        Ok(merge_row(rows, table, key, updates))
    }
}

/// Build a [`RawRow`] from column/value pairs
pub fn raw_row<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
