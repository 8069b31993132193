use anyhow::{Result, bail};
use tracing::debug;

use crate::model::{MetricsMapping, Run, Table};

/// Accepted spellings of the submission identifier column, in lookup order.
pub const IDENTIFIER_COLUMNS: [&str; 3] = ["Submission #", "Submission#", "#"];

/// One identifier per row. Uses the first accepted identifier column that is
/// present; otherwise numbers rows from 1. An empty cell falls back to the
/// row's own position.
pub fn resolve_identifiers(table: &Table) -> Vec<String> {
    let found = IDENTIFIER_COLUMNS
        .iter()
        .find_map(|name| table.column_index(name).map(|index| (*name, index)));

    match found {
        Some((name, column)) => {
            debug!(column = %name, "using identifier column");
            (0..table.len())
                .map(|row| {
                    let value = table.cell(row, column).trim();
                    if value.is_empty() {
                        (row + 1).to_string()
                    } else {
                        value.to_string()
                    }
                })
                .collect()
        }
        None => {
            debug!("no identifier column, numbering runs by position");
            (1..=table.len()).map(|position| position.to_string()).collect()
        }
    }
}

pub fn pair_runs(ids: Vec<String>, mappings: Vec<MetricsMapping>) -> Result<Vec<Run>> {
    if ids.len() != mappings.len() {
        bail!(
            "identifier count {} does not match metrics count {}",
            ids.len(),
            mappings.len()
        );
    }

    Ok(ids
        .into_iter()
        .zip(mappings)
        .map(|(id, metrics)| Run { id, metrics })
        .collect())
}
