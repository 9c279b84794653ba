//! # File I/O Module
//!
//! Reading area tables, writing diameter tables and persisting settings.
//!
//! - **CSV tables**: area tables in, diameter tables out
//! - **Atomic writes**: write to `.tmp`, sync, rename over the target
//! - **Export lock**: an OS lock plus a `.lock` sidecar while an export is
//!   written, since exports usually land on a shared project drive
//! - **Version validation**: settings files carry a schema version
//!
//! ## Example
//!
//! ```rust,no_run
//! use rebar_core::file_io::{export_diameter_table, read_area_table};
//! use rebar_core::settings::ProposalSettings;
//! use std::path::Path;
//!
//! let settings = ProposalSettings::default();
//! let areas = read_area_table(Path::new("areas.csv"), &settings)?;
//! let outcome = settings.propose_table(&areas)?;
//! export_diameter_table(&outcome.table, Path::new("proposed_rebar_diameters.csv"))?;
//! # Ok::<(), rebar_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{CalcError, CalcResult};
use crate::settings::{ProposalSettings, SCHEMA_VERSION};
use crate::table::{forward_fill_ids, AreaColumn, DiameterTable, ElementRebarTable, ElementRow};

/// Metadata written into `.lock` sidecar files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Machine name where the lock was taken
    pub machine: String,
    /// Process holding the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn current() -> Self {
        LockInfo {
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    fn holder(&self) -> String {
        format!("pid {} on {}", self.pid, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on an export target, released on drop.
pub struct ExportLock {
    target: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl ExportLock {
    /// Take the lock for `target`.
    ///
    /// Fails with [`CalcError::FileLocked`] while another live process holds
    /// it. Sidecars older than a day, or left by a process that is gone,
    /// are taken over.
    pub fn acquire(target: &Path) -> CalcResult<Self> {
        let lock_path = lock_path_for(target);

        if let Ok(existing) = read_lock_info(&lock_path) {
            if !is_lock_stale(&existing) {
                return Err(CalcError::file_locked(
                    target.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            debug!(path = %lock_path.display(), "Taking over stale export lock");
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(target.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::current();
        let json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .write_all(json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(ExportLock {
            target: target.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Path being exported to
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for ExportLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut lock_path = target.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path)?;
    serde_json::from_str(&contents).map_err(CalcError::serialization)
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if (Utc::now() - info.locked_at).num_hours() > 24 {
        return true;
    }

    #[cfg(unix)]
    {
        let same_machine = hostname().is_some_and(|m| m == info.machine);
        if same_machine && fs::metadata(format!("/proc/{}", info.pid)).is_err() {
            return true;
        }
    }

    false
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Write `bytes` to `path` through a synced temp file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(bytes)
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_path = path.to_path_buf();
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

// ============================================================================
// Area tables
// ============================================================================

/// Read an area table from a CSV file.
///
/// See [`parse_area_table`] for the expected layout.
pub fn read_area_table(path: &Path, settings: &ProposalSettings) -> CalcResult<ElementRebarTable> {
    let file =
        File::open(path).map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    let table = parse_area_table(file, settings)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.area_columns().len(),
        "Read area table"
    );
    Ok(table)
}

/// Parse an area table from CSV.
///
/// The header row must contain `settings.id_column` and at least one
/// `AS<tag> [<unit>]` column. `settings.key_column` is carried through when
/// present. Other columns are ignored. Blank ids are forward-filled; blank
/// area cells become NaN and are reported by the proposal pass.
pub fn parse_area_table<R: Read>(reader: R, settings: &ProposalSettings) -> CalcResult<ElementRebarTable> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers().map_err(CalcError::serialization)?.clone();

    let id_index = headers
        .iter()
        .position(|h| h == settings.id_column.as_str())
        .ok_or_else(|| CalcError::missing_field(settings.id_column.clone()))?;

    let key_index = settings.key_column.as_ref().and_then(|key| {
        let index = headers.iter().position(|h| h == key.as_str());
        if index.is_none() {
            debug!(column = %key, "Row key column not present, skipping");
        }
        index
    });

    let mut area_columns = Vec::new();
    let mut area_indices = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(column) = AreaColumn::parse(header)? {
            area_columns.push(column);
            area_indices.push(index);
        }
    }
    if area_columns.is_empty() {
        return Err(CalcError::missing_field("AS<tag> [<unit>] area column"));
    }

    let mut raw_ids = Vec::new();
    let mut raw_rows = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(CalcError::serialization)?;

        raw_ids.push(record.get(id_index).map(str::to_string));
        let row_key = key_index.and_then(|i| record.get(i)).map(|k| k.trim().to_string());

        let mut areas = Vec::with_capacity(area_indices.len());
        for (column, &index) in area_columns.iter().zip(&area_indices) {
            areas.push(parse_area_cell(record.get(index).unwrap_or(""), row, &column.header)?);
        }
        raw_rows.push((row_key, areas));
    }

    let ids = forward_fill_ids(&settings.id_column, raw_ids)?;

    let key_column = key_index.and(settings.key_column.clone());
    let mut table = ElementRebarTable::new(settings.id_column.clone(), key_column, area_columns);
    for (element_id, (row_key, areas)) in ids.into_iter().zip(raw_rows) {
        table.push_row(ElementRow::new(element_id, row_key, areas))?;
    }
    Ok(table)
}

fn parse_area_cell(cell: &str, row: usize, header: &str) -> CalcResult<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse().map_err(|_| {
        CalcError::invalid_input(header, cell, format!("Row {}: area is not a number", row))
    })
}

// ============================================================================
// Diameter tables
// ============================================================================

/// Serialize a diameter table as CSV.
///
/// Columns: id, row key (if any), then one `phi_<tag>` column per area
/// column. Failed cells are written empty.
pub fn write_diameter_table<W: Write>(table: &DiameterTable, writer: W) -> CalcResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![table.id_column.clone()];
    header.extend(table.key_column.iter().cloned());
    header.extend(table.diameter_columns.iter().cloned());
    csv_writer.write_record(&header).map_err(CalcError::serialization)?;

    for row in &table.rows {
        let mut record = vec![row.element_id.clone()];
        if table.key_column.is_some() {
            record.push(row.row_key.clone().unwrap_or_default());
        }
        record.extend(row.diameters.iter().map(|d| d.map(|d| d.to_string()).unwrap_or_default()));
        csv_writer.write_record(&record).map_err(CalcError::serialization)?;
    }

    csv_writer.flush().map_err(CalcError::serialization)
}

/// Write a diameter table to `path` under an export lock.
pub fn export_diameter_table(table: &DiameterTable, path: &Path) -> CalcResult<()> {
    let lock = ExportLock::acquire(path)?;

    let mut buffer = Vec::new();
    write_diameter_table(table, &mut buffer)?;
    write_atomic(path, &buffer)?;

    info!(path = %lock.target().display(), rows = table.len(), "Exported diameter table");
    Ok(())
}

// ============================================================================
// Settings
// ============================================================================

/// Save settings as pretty JSON with an atomic write.
pub fn save_settings(settings: &ProposalSettings, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(settings).map_err(CalcError::serialization)?;
    write_atomic(path, json.as_bytes())
}

/// Load settings, validating the schema version.
///
/// # Returns
///
/// * `Ok(ProposalSettings)` - Loaded settings
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON or catalog
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_settings(path: &Path) -> CalcResult<ProposalSettings> {
    let contents = read_to_string(path)?;
    let settings: ProposalSettings = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid settings in {}: {}", path.display(), e)))?;
    validate_version(&settings.version)?;
    Ok(settings)
}

/// Major version must match; for 0.x the file's minor may not be newer.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, rest @ ..], [current_major, current_rest @ ..]) => {
            if file_major != current_major {
                return Err(mismatch());
            }
            if *current_major == 0 {
                if let (Some(file_minor), Some(current_minor)) = (rest.first(), current_rest.first()) {
                    if file_minor > current_minor {
                        return Err(mismatch());
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}
