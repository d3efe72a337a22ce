use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;
use transnet_core::TokenPolicy;

#[derive(Parser, Debug)]
#[command(name = "transnet", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer circuits from a dataset and score them against its relations
    Infer(InferArgs),
    /// Entity counts and ingest diagnostics of a dataset
    Inspect {
        /// Path to the JSON extract
        #[arg(value_hint = ValueHint::FilePath)]
        dataset: PathBuf,
        /// Optional inference configuration (voltage classes)
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = InspectFormat::Plain)]
        format: InspectFormat,
    },
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Path to the JSON extract
    #[arg(value_hint = ValueHint::FilePath)]
    pub dataset: PathBuf,

    /// Seed station id (repeatable)
    #[arg(
        long = "station",
        value_name = "ID",
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub stations: Vec<i64>,

    /// Use every loaded station as a seed, in ascending id order
    #[arg(long)]
    pub all: bool,

    /// TOML file with inference settings
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Neighborhood radius in metres (overrides the config file)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Reference separator policy: semicolon or semicolon-or-comma
    #[arg(long)]
    pub token_policy: Option<TokenPolicy>,

    /// Write accepted circuits as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Write the circuit graph as Graphviz DOT
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub dot: Option<PathBuf>,

    /// Print an Overpass query for each circuit
    #[arg(long)]
    pub overpass: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_infer_requires_seed_selection() {
        assert!(Cli::try_parse_from(["transnet", "infer", "extract.json"]).is_err());
        assert!(Cli::try_parse_from(["transnet", "infer", "x.json", "--all", "--station", "1"])
            .is_err());
    }

    #[test]
    fn test_infer_parses_overrides() {
        let cli = Cli::try_parse_from([
            "transnet",
            "infer",
            "extract.json",
            "--station",
            "4",
            "--station",
            "9",
            "--radius",
            "5000",
            "--token-policy",
            "semicolon-or-comma",
        ])
        .unwrap();
        let Some(Commands::Infer(args)) = cli.command else {
            panic!("expected infer");
        };
        assert_eq!(args.stations, vec![4, 9]);
        assert_eq!(args.radius, Some(5000.0));
        assert_eq!(args.token_policy, Some(TokenPolicy::SemicolonOrComma));
    }
}
