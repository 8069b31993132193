use std::collections::BTreeMap;

use anyhow::{Result, bail};
use tracing::warn;

use crate::model::{OrderPolicy, Run};

/// Reorders whole runs, so each identifier keeps the metrics of its record.
pub fn apply_order(mut runs: Vec<Run>, policy: OrderPolicy) -> Vec<Run> {
    if policy == OrderPolicy::Reverse {
        runs.reverse();
    }
    runs
}

/// Exchanges the metrics of two runs while their labels stay put.
///
/// This is a presentation overlay for hand-edited reports. It breaks the
/// identifier/metrics pairing on purpose, so every use is logged.
pub fn apply_data_swaps(runs: &mut [Run], swaps: &[(String, String)]) -> Result<()> {
    for (left, right) in swaps {
        let Some(left_index) = runs.iter().position(|run| &run.id == left) else {
            bail!("data swap references unknown run `{left}`");
        };
        let Some(right_index) = runs.iter().position(|run| &run.id == right) else {
            bail!("data swap references unknown run `{right}`");
        };
        if left_index == right_index {
            continue;
        }

        warn!(left = %left, right = %right, "swapping plotted metrics between runs");
        let left_metrics = std::mem::take(&mut runs[left_index].metrics);
        runs[left_index].metrics = std::mem::replace(&mut runs[right_index].metrics, left_metrics);
    }
    Ok(())
}

pub fn display_label(id: &str, names: &BTreeMap<String, String>) -> String {
    match names.get(id) {
        Some(name) if !name.is_empty() => format!("Run {id}: {name}"),
        _ => format!("Run {id}"),
    }
}
