use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::profile::DEFAULT_PROFILE;

pub const DEFAULT_INPUT: &str = "all_submissions.csv";

#[derive(Parser, Debug)]
#[command(
    name = "runcharts",
    version,
    about = "Comparative charts of evaluation runs against a reference baseline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one chart from the submissions export.
    Render(RenderArgs),
    /// Preview the submissions export.
    Inspect(InspectArgs),
    /// List the built-in chart profiles.
    Profiles(ProfilesArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Render(_) => "render",
            Self::Inspect(_) => "inspect",
            Self::Profiles(_) => "profiles",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    #[arg(long, default_value = DEFAULT_PROFILE, conflicts_with = "profile_file")]
    pub profile: String,

    #[arg(long)]
    pub profile_file: Option<PathBuf>,

    /// Defaults to `<profile>.svg` next to the input.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    #[arg(long, default_value = crate::table::DEFAULT_STATUS_COLUMN)]
    pub status_column: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProfilesArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults_and_command_name() {
        let cli = Cli::try_parse_from(["runcharts", "render"]).expect("render parses");
        assert_eq!(cli.command.name(), "render");
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(args.profile, DEFAULT_PROFILE);
        assert!(args.output.is_none());
    }

    #[test]
    fn profile_and_profile_file_conflict() {
        let result = Cli::try_parse_from([
            "runcharts",
            "render",
            "--profile",
            "radar",
            "--profile-file",
            "custom.json",
        ]);
        assert!(result.is_err());
    }
}
