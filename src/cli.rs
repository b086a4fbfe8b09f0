mod output_mode;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;
pub use output_mode::OutputMode;
use std::path::PathBuf;

/// Pretty-print Bunyan-style JSON logs from stdin or a file.
///
/// Lines that are not JSON objects are passed through unchanged.
#[derive(Parser, Debug)]
#[command(name = "logviewer", author, version, about, long_about = None)]
pub struct Cli {
    /// Log file to read; stdin when omitted or "-"
    pub file: Option<PathBuf>,

    /// Output mode
    #[arg(short, long, value_enum, env = "LV_OUTPUT")]
    pub output: Option<OutputMode>,

    /// Only show records at or above a level, e.g. "warn" or "info;debug:db;trace:http/tls"
    #[arg(short, long, env = "LV_LEVEL")]
    pub level: Option<String>,

    /// Only show records matching a condition, e.g. '.level == "ERROR" && .msg =~ /timeout/'
    #[arg(short, long, visible_alias = "filter", short_alias = 'f', env = "LV_FILTER")]
    pub condition: Option<String>,

    /// Display time in local time, rather than UTC
    #[arg(short = 'L', long, env = "LV_LOCAL")]
    pub local: bool,

    /// Display time in the given timezone (IANA name, e.g. "Europe/Paris")
    #[arg(long = "time", value_name = "TZ", env = "LV_TIMEZONE")]
    pub timezone: Option<String>,

    /// When to colorize output
    #[arg(long, value_enum, value_name = "WHEN")]
    pub color: Option<ColorMode>,

    /// Do not colorize output
    #[arg(long, conflicts_with = "color")]
    pub no_color: bool,

    /// Do not pipe output into a pager
    #[arg(long)]
    pub no_pager: bool,

    /// Config file (default: <config dir>/logviewer/config.toml)
    #[arg(long, env = "LV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Log diagnostics at debug level
    #[arg(long)]
    pub debug: bool,

    /// Log diagnostics at info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completion: Option<Shell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl Cli {
    /// `--no-color` wins over everything, then `--color`.
    pub fn effective_color(&self) -> Option<ColorMode> {
        if self.no_color {
            Some(ColorMode::Never)
        } else {
            self.color
        }
    }

    /// The input file, treating "-" as stdin
    pub fn input_file(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "logviewer",
            "-o",
            "short",
            "--level",
            "warn",
            "-f",
            ".a == b",
            "--time",
            "Asia/Tokyo",
            "--no-color",
            "app.log",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputMode::Short));
        assert_eq!(cli.level.as_deref(), Some("warn"));
        assert_eq!(cli.condition.as_deref(), Some(".a == b"));
        assert_eq!(cli.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(cli.effective_color(), Some(ColorMode::Never));
        assert_eq!(cli.input_file(), Some(&PathBuf::from("app.log")));
    }

    #[test]
    fn test_dash_means_stdin() {
        let cli = Cli::try_parse_from(["logviewer", "-"]).unwrap();
        assert_eq!(cli.input_file(), None);
    }

    #[test]
    fn test_invalid_output_mode() {
        assert!(Cli::try_parse_from(["logviewer", "-o", "html"]).is_err());
    }
}
