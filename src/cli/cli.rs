use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::filesystem::LinkStyle;
use crate::resolver::MissingRootPolicy;

/// Mirror a tree with symlinks, then redirect selected links into a patch tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Mirror the source tree into the destination
    #[clap(long = "clone", short = 'c')]
    pub clone_flow: bool,
    /// Overlay the source tree onto an existing destination
    #[clap(long = "patch", short = 'p')]
    pub patch_flow: bool,

    /// Base install for --clone, patch payload for --patch
    #[clap(long, short)]
    pub source: PathBuf,
    /// Root the links are written under
    #[clap(long, short)]
    pub destination: PathBuf,

    /// Shorthand for `--log-level debug`
    #[clap(long)]
    pub debug: bool,
    #[clap(long, short, value_enum)]
    pub log_level: Option<LogLevel>,
    /// Append log records to this file [default: overlink.log]
    #[clap(long)]
    pub log_file: Option<PathBuf>,
    /// Only log to the terminal
    #[clap(long, conflicts_with = "log_file")]
    pub no_log_file: bool,

    #[clap(long, value_enum)]
    pub link_style: Option<LinkStyle>,
    /// What to do when a root and its parent are both missing
    #[clap(long, value_enum)]
    pub on_missing_root: Option<MissingRootPolicy>,

    /// Settings file to read instead of ./overlink.yaml
    #[clap(long)]
    pub config: Option<PathBuf>,
}
