use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::RenderArgs;
use crate::identifiers::{pair_runs, resolve_identifiers};
use crate::metrics::extract_all;
use crate::model::{RenderCounts, RenderManifest, Run, Table};
use crate::ordering::{apply_data_swaps, apply_order};
use crate::profile::{ChartProfile, builtin_profile, load_profile_file};
use crate::render::{ChartPlan, write_chart};
use crate::table::{filter_finished, load_table};
use crate::util::{default_chart_path, now_utc_string, sha256_file, write_json_pretty};

/// Runs resolved from a loaded table, in display order.
#[derive(Debug, Clone)]
pub struct PreparedRuns {
    pub runs: Vec<Run>,
    pub rows_finished: usize,
    pub blobs_fallback_empty: usize,
}

/// Filter, extract, identify, order: everything between loading and drawing.
pub fn prepare_runs(table: &Table, profile: &ChartProfile) -> Result<PreparedRuns> {
    let finished = filter_finished(table, &profile.status_column)?;
    if finished.is_empty() {
        warn!("no finished runs, only the baseline will be plotted");
    }
    let extraction = extract_all(&finished, &profile.metrics_column)?;
    let ids = resolve_identifiers(&finished);

    let runs = pair_runs(ids, extraction.mappings)?;
    let mut runs = apply_order(runs, profile.order);
    if !profile.data_swaps.is_empty() {
        apply_data_swaps(&mut runs, &profile.data_swaps)?;
    }

    Ok(PreparedRuns {
        runs,
        rows_finished: finished.len(),
        blobs_fallback_empty: extraction.fallback_rows.len(),
    })
}

fn resolve_profile(args: &RenderArgs) -> Result<ChartProfile> {
    let mut profile = match &args.profile_file {
        Some(path) => load_profile_file(path)?,
        None => builtin_profile(&args.profile)?,
    };
    if let Some(title) = &args.title {
        profile.title = title.clone();
    }
    profile.validate()?;
    Ok(profile)
}

pub fn run(args: RenderArgs) -> Result<()> {
    let profile = resolve_profile(&args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_chart_path(&args.input, &profile.name));

    info!(
        input = %args.input.display(),
        profile = %profile.name,
        shape = profile.shape.as_str(),
        "render requested"
    );

    let table = load_table(&args.input)?;
    let prepared = prepare_runs(&table, &profile)?;
    let plan = ChartPlan::build(&profile, &prepared.runs)?;
    write_chart(&plan, &output)?;

    if let Some(manifest_path) = &args.manifest {
        let manifest = build_manifest(&args.input, &output, &profile, &table, &prepared, &plan)?;
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote render manifest");
    }

    info!(
        runs = prepared.runs.len(),
        fallback_blobs = prepared.blobs_fallback_empty,
        "render completed"
    );
    Ok(())
}

fn build_manifest(
    input: &Path,
    output: &Path,
    profile: &ChartProfile,
    table: &Table,
    prepared: &PreparedRuns,
    plan: &ChartPlan,
) -> Result<RenderManifest> {
    let series_labels = plan.series_labels();
    Ok(RenderManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        input_path: input.display().to_string(),
        input_sha256: sha256_file(input)?,
        output_path: output.display().to_string(),
        profile: profile.name.clone(),
        shape: profile.shape.as_str().to_string(),
        metric_order: profile.metric_order.clone(),
        counts: RenderCounts {
            rows_loaded: table.len(),
            rows_finished: prepared.rows_finished,
            blobs_fallback_empty: prepared.blobs_fallback_empty,
            series_plotted: series_labels.len(),
        },
        series_labels,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::model::OrderPolicy;

    const EXPORT: &str = "Submission #,Status,Result File\n\
        4,finished,\"[{'ROUGE-L': 0.12, 'Timing F1': 0.41, 'Timing AUC': 0.55, 'Action F1': 0.30}]\"\n\
        7,failed,\"[{'ROUGE-L': 0.99}]\"\n\
        11,Finished,\"[{'ROUGE-L': 0.09, 'Timing F1': 0.38, 'Action F1': 0.33}]\"\n";

    fn export_table() -> (tempfile::TempDir, Table) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("all_submissions.csv");
        fs::write(&path, EXPORT).expect("write export");
        let table = load_table(&path).expect("export loads");
        (dir, table)
    }

    #[test]
    fn pipeline_plots_finished_runs_plus_baseline() {
        let (_dir, table) = export_table();
        let profile = builtin_profile("bar").expect("bar exists");

        let prepared = prepare_runs(&table, &profile).expect("pipeline runs");
        let plan = ChartPlan::build(&profile, &prepared.runs).expect("plan builds");

        assert_eq!(prepared.rows_finished, 2);
        assert_eq!(plan.runs.len(), 2);
        assert_eq!(plan.series_labels().len(), 3);
        // Reverse order: most recent submission first.
        assert_eq!(prepared.runs[0].id, "11");
        assert_eq!(prepared.runs[1].id, "4");
    }

    #[test]
    fn identifiers_stay_with_their_metrics_in_both_orders() {
        let (_dir, table) = export_table();
        let mut profile = builtin_profile("radar").expect("radar exists");

        for order in [OrderPolicy::Forward, OrderPolicy::Reverse] {
            profile.order = order;
            let prepared = prepare_runs(&table, &profile).expect("pipeline runs");
            for run in &prepared.runs {
                let expected = match run.id.as_str() {
                    "4" => 0.12,
                    "11" => 0.09,
                    other => panic!("unexpected run {other}"),
                };
                assert_eq!(run.metrics.get("ROUGE-L"), Some(&expected));
            }
        }
    }

    #[test]
    fn malformed_blob_keeps_run_with_gaps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("all_submissions.csv");
        fs::write(
            &path,
            "Status,Result File\nfinished,not json at all\nfinished,\"[{'ROUGE-L': 0.2}]\"\n",
        )
        .expect("write export");
        let table = load_table(&path).expect("export loads");
        let profile = builtin_profile("radar").expect("radar exists");

        let prepared = prepare_runs(&table, &profile).expect("pipeline runs");
        assert_eq!(prepared.blobs_fallback_empty, 1);
        assert_eq!(prepared.runs[0].id, "1");
        assert!(prepared.runs[0].metrics.is_empty());
    }

    #[test]
    fn missing_metrics_column_is_fatal() {
        let table = Table {
            headers: vec!["Status".to_string()],
            rows: vec![vec!["finished".to_string()]],
        };
        let profile = builtin_profile("bar").expect("bar exists");
        let err = prepare_runs(&table, &profile).expect_err("no blob column");
        assert!(err.to_string().contains("Result File"));
    }

    #[test]
    fn render_writes_chart_and_manifest() {
        let (dir, _table) = export_table();
        let output = dir.path().join("out").join("bar.svg");
        let manifest = dir.path().join("out").join("bar.json");

        run(RenderArgs {
            input: dir.path().join("all_submissions.csv"),
            profile: "bar".to_string(),
            profile_file: None,
            output: Some(output.clone()),
            title: Some("Custom title".to_string()),
            manifest: Some(manifest.clone()),
        })
        .expect("render succeeds");

        let svg = fs::read_to_string(&output).expect("chart written");
        assert!(svg.contains("Custom title"));

        let raw = fs::read_to_string(&manifest).expect("manifest written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("manifest is json");
        assert_eq!(value["counts"]["rows_loaded"], 3);
        assert_eq!(value["counts"]["rows_finished"], 2);
        assert_eq!(value["counts"]["series_plotted"], 3);
        assert_eq!(value["series_labels"][2], "GPT-4o Baseline");
    }

    #[test]
    fn render_fails_for_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = run(RenderArgs {
            input: dir.path().join("all_submissions.csv"),
            profile: "bar".to_string(),
            profile_file: None,
            output: Some(dir.path().join("bar.svg")),
            title: None,
            manifest: None,
        })
        .expect_err("input missing");
        assert!(err.to_string().contains("all_submissions.csv"));
    }
}
