use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::model::Table;

pub const DEFAULT_STATUS_COLUMN: &str = "Status";
pub const FINISHED_STATUS: &str = "finished";

pub fn load_table(path: &Path) -> Result<Table> {
    if !path.is_file() {
        bail!("input table not found: {}", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .iter()
        .map(ToOwned::to_owned)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read row {} of {}", index + 1, path.display()))?;
        let mut cells: Vec<String> = record.iter().map(ToOwned::to_owned).collect();
        cells.resize(headers.len().max(cells.len()), String::new());
        rows.push(cells);
    }

    info!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "loaded table"
    );

    Ok(Table { headers, rows })
}

/// Keeps rows whose status equals `finished` ignoring case. Padded values
/// such as `" finished "` are not finished. Row indices of the result start
/// again at 0.
pub fn filter_finished(table: &Table, status_column: &str) -> Result<Table> {
    let Some(status_index) = table.column_index(status_column) else {
        bail!("missing required column `{status_column}`");
    };

    let mut dropped: BTreeMap<String, usize> = BTreeMap::new();
    let mut rows = Vec::with_capacity(table.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        let status = table.cell(row_index, status_index);
        if status.eq_ignore_ascii_case(FINISHED_STATUS) {
            rows.push(row.clone());
        } else {
            *dropped.entry(status.to_lowercase()).or_default() += 1;
        }
    }

    let dropped_total: usize = dropped.values().sum();
    info!(
        kept = rows.len(),
        dropped = dropped_total,
        "filtered runs by status"
    );
    for (status, count) in &dropped {
        debug!(status = %status, count, "dropped runs with status");
    }

    Ok(Table {
        headers: table.headers.clone(),
        rows,
    })
}

/// Row counts per lowercased status value, for previews.
pub fn status_counts(table: &Table, status_column: &str) -> Option<BTreeMap<String, usize>> {
    let status_index = table.column_index(status_column)?;
    let mut counts = BTreeMap::new();
    for row_index in 0..table.len() {
        let status = table.cell(row_index, status_index).to_lowercase();
        *counts.entry(status).or_default() += 1;
    }
    Some(counts)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn table_with_statuses(statuses: &[&str]) -> Table {
        Table {
            headers: vec!["Status".to_string(), "Result File".to_string()],
            rows: statuses
                .iter()
                .enumerate()
                .map(|(index, status)| vec![status.to_string(), format!("blob-{index}")])
                .collect(),
        }
    }

    #[test]
    fn filter_keeps_finished_case_insensitively() {
        let table = table_with_statuses(&["finished", "Finished", "FAILED", "running"]);
        let filtered = filter_finished(&table, "Status").expect("status column present");

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.cell(0, 1), "blob-0");
        assert_eq!(filtered.cell(1, 1), "blob-1");
    }

    #[test]
    fn filter_drops_padded_status_values() {
        let table = table_with_statuses(&[" finished ", "finished\t", "FINISHED", "crashed"]);
        let filtered = filter_finished(&table, "Status").expect("status column present");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.cell(0, 1), "blob-2");
    }

    #[test]
    fn load_table_keeps_header_names_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("all_submissions.csv");
        fs::write(&path, "Submission #, Status,Result File\n4,finished,x\n").expect("write fixture");

        let table = load_table(&path).expect("table loads");
        assert_eq!(table.column_index("Status"), None);
        assert_eq!(table.column_index(" Status"), Some(1));
        assert!(filter_finished(&table, "Status").is_err());
    }

    #[test]
    fn filter_names_missing_status_column() {
        let table = Table {
            headers: vec!["Result File".to_string()],
            rows: vec![vec!["x".to_string()]],
        };

        let err = filter_finished(&table, "Status").expect_err("status column missing");
        assert!(err.to_string().contains("Status"));
    }

    #[test]
    fn load_table_reads_quoted_blobs_and_pads_short_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("all_submissions.csv");
        fs::write(
            &path,
            "Submission #,Status,Result File\n\
             4,Finished,\"[{'BLEU-4': 0.0, 'ROUGE-L': 0.0755}]\"\n\
             5,failed\n",
        )
        .expect("write fixture");

        let table = load_table(&path).expect("table loads");
        assert_eq!(table.headers, vec!["Submission #", "Status", "Result File"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), "[{'BLEU-4': 0.0, 'ROUGE-L': 0.0755}]");
        assert_eq!(table.rows[1].len(), 3);
        assert_eq!(table.cell(1, 2), "");
    }

    #[test]
    fn load_table_fails_for_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.csv");

        let err = load_table(&path).expect_err("missing file is fatal");
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn status_counts_groups_lowercased_values() {
        let table = table_with_statuses(&["finished", "Finished", "failed"]);
        let counts = status_counts(&table, "Status").expect("status column present");
        assert_eq!(counts.get("finished"), Some(&2));
        assert_eq!(counts.get("failed"), Some(&1));
        assert!(status_counts(&table, "State").is_none());
    }
}
