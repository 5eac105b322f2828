use crate::config::toml_config::TomlConfig;
use crate::domain::model::DuplicatePolicy;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "dosage-etl")]
#[command(about = "Crawl the pharmacopoeia catalog and build a medicine dosage table")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults reproduce the stock crawl)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory for medicines.json and the generated table
    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Crawl the range and generate the table in one go (default)
    Run(RangeArgs),
    /// Crawl the range and write only the intermediate medicines file
    Crawl(RangeArgs),
    /// Convert an existing intermediate file into the table
    Convert(ConvertArgs),
    /// Fetch and print a single entry
    Fetch {
        entry_id: u64,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First entry id (inclusive)
    #[arg(long)]
    pub start: Option<u64>,

    /// Last entry id (inclusive)
    #[arg(long)]
    pub end: Option<u64>,

    /// Minimum delay between requests in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    #[command(flatten)]
    pub convert: ConvertArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConvertArgs {
    /// Name of the generated constant
    #[arg(long)]
    pub const_name: Option<String>,

    /// How to treat duplicate titles: last-wins or keep-first
    #[arg(long)]
    pub duplicate_policy: Option<DuplicatePolicy>,
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RangeArgs::default()))
    }

    /// 載入設定檔，再套用命令列覆蓋
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }

        match self.command() {
            Command::Run(range) | Command::Crawl(range) => {
                if let Some(start) = range.start {
                    config.crawl.start_id = start;
                }
                if let Some(end) = range.end {
                    config.crawl.end_id = end;
                }
                if let Some(delay_ms) = range.delay_ms {
                    config.crawl.delay_ms = delay_ms;
                }
                apply_convert_args(&mut config, &range.convert);
            }
            Command::Convert(convert) => apply_convert_args(&mut config, &convert),
            Command::Fetch { .. } => {}
        }

        Ok(config)
    }
}

fn apply_convert_args(config: &mut TomlConfig, args: &ConvertArgs) {
    if let Some(const_name) = &args.const_name {
        config.load.const_name = const_name.clone();
    }
    if let Some(policy) = args.duplicate_policy {
        config.load.duplicate_policy = policy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let cli = CliConfig::parse_from(["dosage-etl"]);
        assert!(matches!(cli.command(), Command::Run(_)));

        let config = cli.load_config().unwrap();
        assert_eq!(config.crawl.start_id, 2);
        assert_eq!(config.crawl.end_id, 615);
    }

    #[test]
    fn test_range_overrides() {
        let cli = CliConfig::parse_from([
            "dosage-etl",
            "crawl",
            "--start",
            "10",
            "--end",
            "12",
            "--delay-ms",
            "0",
            "--output-path",
            "/tmp/dosage",
        ]);

        let config = cli.load_config().unwrap();
        assert_eq!(config.crawl.start_id, 10);
        assert_eq!(config.crawl.end_id, 12);
        assert_eq!(config.crawl.delay_ms, 0);
        assert_eq!(config.load.output_path, "/tmp/dosage");
    }

    #[test]
    fn test_convert_overrides() {
        let cli = CliConfig::parse_from([
            "dosage-etl",
            "convert",
            "--const-name",
            "herbDosage",
            "--duplicate-policy",
            "keep-first",
        ]);

        let config = cli.load_config().unwrap();
        assert_eq!(config.load.const_name, "herbDosage");
        assert_eq!(config.load.duplicate_policy, DuplicatePolicy::KeepFirst);
    }

    #[test]
    fn test_fetch_subcommand() {
        let cli = CliConfig::parse_from(["dosage-etl", "-v", "fetch", "2"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command(), Command::Fetch { entry_id: 2 }));
    }
}
