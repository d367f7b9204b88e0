use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Context, Result};

use super::table::Table;

/// Text form of a cell: strings raw, null empty, anything else as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write the table as CSV: one header row of column names, no index column.
pub fn write_csv_to<W: Write>(table: &Table, sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(table.columns())?;

    for row in 0..table.len() {
        writer.write_record(
            table
                .columns()
                .iter()
                .map(|column| value_to_string(table.cell(row, column))),
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Persist the table at `path`. The file only appears once it is completely written.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let file = fs::File::create(&staging)
        .with_context(|| format!("Failed to create {}", staging.display()))?;
    if let Err(err) = write_csv_to(table, file) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }

    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
