pub mod cli;
pub mod config;
pub mod filter;
pub mod level;
pub mod pager;
pub mod parser;
pub mod render;

use anyhow::Context;
use clap::CommandFactory;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};

pub use cli::{Cli, ColorMode, OutputMode, cli_parse};
pub use config::{Settings, ViewerConfig, load_config};
pub use filter::{ConditionNode, FilterParseError, LeafNode, LevelSet, LogFilter, MultiFilter, build_filter};
pub use level::Level;
pub use parser::{FieldError, LogRecord, ParseError, parse_log_record};
pub use render::{DisplayZone, OutputOptions, render_record};

/// Environment variable holding an `env_logger` filter for diagnostics.
pub const LV_LOG: &str = "LV_LOG";

/// Counters for one processed input stream
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    /// Lines decoded as records
    pub records: usize,
    /// Records that passed the filter and were written
    pub shown: usize,
    /// Lines written unchanged because they were not JSON objects
    pub passthrough: usize,
    /// Field coercion errors reported across all records
    pub field_errors: usize,
}

/// What to write for one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutput {
    /// A decoded record that passed the filter
    Record(String),
    /// A line that is not a JSON object, echoed byte for byte
    Passthrough,
    /// A decoded record rejected by the filter
    Hidden,
}

/// Decodes, filters and renders a single line.
///
/// Lines that are not UTF-8 cannot be JSON and are passed through.
pub fn process_line(line: &[u8], filter: &LogFilter, options: &OutputOptions) -> (LineOutput, usize) {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("Failed to parse JSON: {e}");
            return (LineOutput::Passthrough, 0);
        }
    };
    let (record, errors) = match parse_log_record(text) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Failed to parse JSON: {e}");
            return (LineOutput::Passthrough, 0);
        }
    };

    for error in &errors {
        log::warn!("{error}");
    }

    let output = if filter.matches(&record) {
        LineOutput::Record(render_record(&record, options))
    } else {
        LineOutput::Hidden
    };
    (output, errors.len())
}

/// Reads lines until the end of `reader`, writing what is shown to `writer`.
///
/// Only zero-length lines are skipped. A reader closing its end early (e.g. a
/// pager quitting) ends the stream without an error.
pub fn process_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    filter: &LogFilter,
    options: &OutputOptions,
) -> io::Result<StreamStats> {
    let mut stats = StreamStats::default();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }

        let line = buffer.strip_suffix(b"\n").unwrap_or(buffer.as_slice());
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let (output, field_errors) = process_line(line, filter, options);
        stats.field_errors += field_errors;
        let written = match output {
            LineOutput::Record(text) => {
                stats.records += 1;
                stats.shown += 1;
                writer.write_all(text.as_bytes())
            }
            LineOutput::Passthrough => {
                stats.passthrough += 1;
                writer.write_all(line)
            }
            LineOutput::Hidden => {
                stats.records += 1;
                continue;
            }
        };

        match written.and_then(|()| writer.write_all(b"\n")) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::info!("Output closed, stopping");
                return Ok(stats);
            }
            Err(e) => return Err(e),
        }
    }

    match writer.flush() {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
        _ => Ok(stats),
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.verbose || cli.log.is_some() {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_millis();
    if let Ok(spec) = env::var(LV_LOG) {
        builder.parse_filters(&spec);
    }
    if let Some(path) = &cli.log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("Failed to initialize logging")?;

    if cli.debug {
        log::info!("Debug was turned on by the --debug flag");
    }
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();

    if let Some(shell) = cli.completion {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, env!("CARGO_PKG_NAME"), &mut io::stdout());
        return Ok(());
    }

    init_logging(&cli)?;
    log::info!("{}", "-".repeat(80));
    log::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    let settings = Settings::resolve(&cli, &config, io::stdin().is_terminal(), io::stdout().is_terminal())?;
    log::info!(
        "Output mode: {}, displaying time at location: {}",
        settings.options.mode,
        settings.options.zone
    );

    let filter = build_filter(settings.level.as_deref(), settings.condition.as_deref())
        .context("Failed to create filter")?;
    log::debug!("Filter: {filter:?}");

    colored::control::set_override(settings.options.use_colors);

    let reader: Box<dyn BufRead> = match cli.input_file() {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open file '{}'", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let pager = if settings.use_pager {
        pager::Pager::start().transpose().context("Failed to start pager")?
    } else {
        None
    };
    let mut output: Box<dyn Write> = match pager {
        Some(pager) => Box::new(BufWriter::new(pager)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = process_stream(reader, &mut output, &filter, &settings.options)
        .context("Failed to read from input")?;
    log::info!(
        "Processed {} records ({} shown, {} passed through, {} field errors)",
        stats.records,
        stats.shown,
        stats.passthrough,
        stats.field_errors
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_stream(input: &str, filter: &LogFilter) -> (String, StreamStats) {
        let mut out = Vec::new();
        let stats = process_stream(input.as_bytes(), &mut out, filter, &OutputOptions::new()).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_malformed_lines_pass_through() {
        let input = "not json\n{\"msg\":\"ok\",\"level\":30}\n\n[1, 2]\r\n{\"msg\":\"last\"}";
        let (out, stats) = run_stream(input, &LogFilter::All);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "not json");
        assert_eq!(lines[1], " INFO: : ok (tid=0)");
        assert_eq!(lines[2], "[1, 2]");
        assert_eq!(lines[3], " INFO: : last (tid=0)");
        assert_eq!(stats.records, 2);
        assert_eq!(stats.passthrough, 2);
    }

    #[test]
    fn test_passthrough_is_byte_exact() {
        let input: &[u8] = b"caf\xe9 not json\n   \n\t\r\n{\"msg\":\"ok\"}\n";
        let mut out = Vec::new();
        let stats = process_stream(input, &mut out, &LogFilter::All, &OutputOptions::new()).unwrap();

        assert_eq!(out, b"caf\xe9 not json\n   \n\t\n INFO: : ok (tid=0)\n");
        assert_eq!(stats.passthrough, 3);
        assert_eq!(stats.records, 1);
    }

    #[test]
    fn test_filtered_records_are_hidden() {
        let filter = LogFilter::condition(".msg == keep").unwrap();
        let (out, stats) = run_stream("{\"msg\":\"keep\"}\n{\"msg\":\"drop\"}\n", &filter);
        assert_eq!(out, " INFO: : keep (tid=0)\n");
        assert_eq!(stats.records, 2);
        assert_eq!(stats.shown, 1);
    }

    #[test]
    fn test_field_errors_are_counted() {
        let (_, stats) = run_stream("{\"pid\":\"x\",\"tid\":\"y\"}\n", &LogFilter::All);
        assert_eq!(stats.field_errors, 2);
        assert_eq!(stats.shown, 1);
    }

    #[test]
    fn test_broken_pipe_stops_quietly() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let stats = process_stream(
            "{\"msg\":\"a\"}\n{\"msg\":\"b\"}\n".as_bytes(),
            Closed,
            &LogFilter::All,
            &OutputOptions::new(),
        )
        .unwrap();
        assert_eq!(stats.shown, 1);
    }
}
