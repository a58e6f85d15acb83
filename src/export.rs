use crate::table::Table;
use anyhow::{Context, Result};
use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

/// Header row of column names followed by one record per table row.
pub fn serialize_table_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("failed to write variability CSV header")?;
    for row in &table.rows {
        writer
            .write_record(row.cells())
            .with_context(|| format!("failed to serialize row for {}", row.entity_name))?;
    }
    finalize_writer(writer, "variability CSV writer")
}

pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .context("failed to compress CSV output")?;
    encoder.finish().context("failed to finish gzip stream")
}

/// `report.csv` becomes `report.csv.gz` when archiving.
pub fn archive_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Writes the table and returns the path actually written.
pub async fn save_table_csv(path: &Path, table: &Table, archive: bool) -> Result<PathBuf> {
    let serialized = serialize_table_csv(table)?;
    let (target, bytes) = if archive {
        (archive_path(path), gzip_bytes(&serialized)?)
    } else {
        (path.to_path_buf(), serialized)
    };
    write_output_file(&target, &bytes).await?;
    info!(path = %target.display(), rows = table.rows.len(), "saved variability CSV");
    Ok(target)
}
