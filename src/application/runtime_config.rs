use std::path::PathBuf;

use crate::application::data::LogLevel;
use crate::cli::Cli;
use crate::config::Settings;
use crate::filesystem::LinkStyle;
use crate::resolver::MissingRootPolicy;

const DEFAULT_LOG_FILE: &str = "overlink.log";

/// Everything a run needs, merged from the command line and the settings
/// file. Command-line values win.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub clone_flow: bool,
    pub patch_flow: bool,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub link_style: LinkStyle,
    pub on_missing_root: MissingRootPolicy,
    pub protected_roots: Vec<PathBuf>,
}

impl From<(Cli, Settings)> for RuntimeConfig {
    fn from((cli, settings): (Cli, Settings)) -> Self {
        Self {
            clone_flow: cli.clone_flow,
            patch_flow: cli.patch_flow,
            source: cli.source,
            destination: cli.destination,
            link_style: cli
                .link_style
                .or(settings.link_style)
                .unwrap_or_default(),
            on_missing_root: cli
                .on_missing_root
                .or(settings.on_missing_root)
                .unwrap_or_default(),
            protected_roots: settings.protected_roots,
        }
    }
}

/// Where log records go and how many of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
}

impl From<(&Cli, &Settings)> for LogOptions {
    fn from((cli, settings): (&Cli, &Settings)) -> Self {
        let level = if cli.debug {
            LogLevel::Debug
        } else {
            cli.log_level.unwrap_or_default()
        };
        let file = if cli.no_log_file {
            None
        } else {
            Some(
                cli.log_file
                    .clone()
                    .or_else(|| settings.log_file.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            )
        };

        Self { level, file }
    }
}
