use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ipcheck::CheckStatus;
use ipcheck::report::ReportFilter;

#[derive(Debug, Parser)]
#[command(name = "ipcheck", version, about = "Check which hosts in a CSV list are reachable")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Probe policy file (defaults to the per-user config location)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe every host listed in a CSV file
    Check(CheckArgs),
    /// Print the probe policy in effect
    Config,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// CSV with `address,name,groupA,groupB` lines
    #[arg(value_name = "CSV")]
    pub file: PathBuf,

    /// Hosts probed at once, overriding the policy
    #[arg(long, short)]
    pub concurrency: Option<usize>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Only keep rows with this status
    #[arg(long)]
    pub status: Option<CheckStatus>,

    #[arg(long)]
    pub group_a: Option<String>,

    #[arg(long)]
    pub group_b: Option<String>,

    /// Case-insensitive text searched in address, name and groups
    #[arg(long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for ReportFilter {
    fn from(args: FilterArgs) -> Self {
        ReportFilter { status: args.status, group_a: args.group_a, group_b: args.group_b, search: args.search }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_with_filters() {
        let cli = Cli::try_parse_from([
            "ipcheck", "check", "hosts.csv", "--concurrency", "8", "--format", "json", "--status", "offline",
            "--group-a", "Tower A", "--config", "policy.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("policy.toml")));
        let Command::Check(args) = cli.command else { panic!("expected check") };
        assert_eq!(args.file, PathBuf::from("hosts.csv"));
        assert_eq!(args.concurrency, Some(8));
        assert_eq!(args.format, OutputFormat::Json);

        let filter = ReportFilter::from(args.filter);
        assert_eq!(filter.status, Some(CheckStatus::Offline));
        assert_eq!(filter.group_a.as_deref(), Some("Tower A"));
        assert!(filter.group_b.is_none());
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from(["ipcheck", "check", "hosts.csv", "--status", "sleeping"]).is_err());
    }

    #[test]
    fn table_is_the_default_format() {
        let cli = Cli::try_parse_from(["ipcheck", "check", "hosts.csv"]).unwrap();
        let Command::Check(args) = cli.command else { panic!("expected check") };
        assert_eq!(args.format, OutputFormat::Table);
        assert!(args.output.is_none());
    }
}
