use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::ProfilesArgs;
use crate::profile::{ChartProfile, builtin_profiles};

pub fn run(args: ProfilesArgs) -> Result<()> {
    let profiles = builtin_profiles();
    let mut output = io::BufWriter::new(io::stdout().lock());

    if args.json {
        serde_json::to_writer_pretty(&mut output, &profiles)
            .context("failed to serialize profiles")?;
        writeln!(output)?;
    } else {
        for profile in &profiles {
            writeln!(output, "{}", summary_line(profile))?;
        }
    }

    output.flush()?;
    Ok(())
}

fn summary_line(profile: &ChartProfile) -> String {
    format!(
        "{}\tshape={} order={:?} metrics={}",
        profile.name,
        profile.shape.as_str(),
        profile.order,
        profile.metric_order.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;

    #[test]
    fn summary_names_shape_and_metrics() {
        let radar = builtin_profile("radar").expect("radar exists");
        assert_eq!(
            summary_line(&radar),
            "radar\tshape=radar order=Forward metrics=ROUGE-L,Timing F1,Timing AUC,Action F1"
        );
    }

    #[test]
    fn json_listing_uses_snake_case_enums() {
        let raw = serde_json::to_string(&builtin_profiles()).expect("serialize");
        assert!(raw.contains("\"shape\":\"radar\""));
        assert!(raw.contains("\"line_layout\":\"by_metric\""));
        assert!(raw.contains("\"order\":\"reverse\""));
    }
}
