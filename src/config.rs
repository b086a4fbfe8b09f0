use crate::cli::{Cli, ColorMode, OutputMode};
use crate::render::{DisplayZone, OutputOptions, UnknownTimezone};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const APP_DIR: &str = "logviewer";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Timezone(#[from] UnknownTimezone),
}

/// Settings read from the config file. Every key is optional and is
/// overridden by the matching command line flag or `LV_*` variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub output: Option<OutputMode>,
    /// IANA zone name, `UTC` or `Local`
    pub timezone: Option<String>,
    pub local: Option<bool>,
    pub color: Option<bool>,
    /// Level set, as for `--level`
    pub level: Option<String>,
    /// Condition, as for `--condition`
    pub filter: Option<String>,
    pub pager: Option<bool>,
}

/// `<user config dir>/logviewer/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Loads the explicit config file, or the default one when it exists.
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    if let Some(path) = path {
        return load_config_from_path(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_config_from_path(&path),
        Some(path) => {
            log::info!("Config file not found: {}", path.display());
            Ok(ViewerConfig::default())
        }
        None => Ok(ViewerConfig::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<ViewerConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display.clone(),
        source,
    })?;
    log::info!("Config File: {path_display}");
    Ok(config)
}

/// Effective settings after merging the command line (and its `LV_*`
/// variables) over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: OutputOptions,
    pub level: Option<String>,
    pub condition: Option<String>,
    pub use_pager: bool,
}

impl Settings {
    /// Merges `cli` over `config`.
    ///
    /// Colors default to whether stdout is a terminal and are never used for
    /// JSON output. The pager is only used when both stdin and stdout are
    /// terminals.
    pub fn resolve(
        cli: &Cli,
        config: &ViewerConfig,
        stdin_is_terminal: bool,
        stdout_is_terminal: bool,
    ) -> Result<Self, ConfigError> {
        let mode = cli.output.or(config.output).unwrap_or_default();

        let zone = match (&cli.timezone, &config.timezone) {
            (Some(name), _) => name.parse::<DisplayZone>()?,
            (None, _) if cli.local => DisplayZone::Local,
            (None, Some(name)) => name.parse::<DisplayZone>()?,
            (None, None) if config.local == Some(true) => DisplayZone::Local,
            (None, None) => DisplayZone::Utc,
        };

        let use_colors = !mode.is_json()
            && match cli.effective_color() {
                Some(ColorMode::Always) => true,
                Some(ColorMode::Never) => false,
                Some(ColorMode::Auto) => stdout_is_terminal,
                None => config.color.unwrap_or(stdout_is_terminal),
            };

        let use_pager = !cli.no_pager
            && config.pager.unwrap_or(true)
            && stdin_is_terminal
            && stdout_is_terminal;

        Ok(Self {
            options: OutputOptions::new().mode(mode).zone(zone).use_colors(use_colors),
            level: cli.level.clone().or_else(|| config.level.clone()),
            condition: cli.condition.clone().or_else(|| config.filter.clone()),
            use_pager,
        })
    }
}
