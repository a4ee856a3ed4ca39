#![allow(clippy::enum_variant_names)]

use clap::Parser as _;
use snafu::ResultExt;
use tracing::{debug, error};

use crate::{
    application::{
        Application, ApplicationError, ConfigurationSnafu, LogOptions, LoggingSetupSnafu,
        RuntimeConfig, SettingsSnafu, data::FlowMode,
    },
    cli::Cli,
    config::Settings,
};

mod application;
mod cli;
mod config;
mod ext;
mod filesystem;
mod flows;
mod logging;
mod resolver;

#[snafu::report]
fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    // Rejected before the log file is opened.
    FlowMode::from_flags(cli_args.clone_flow, cli_args.patch_flow).context(ConfigurationSnafu)?;
    let settings = Settings::load(cli_args.config.as_deref()).context(SettingsSnafu)?;

    let dispatch = logging::build_dispatch(&LogOptions::from((&cli_args, &settings)))
        .context(LoggingSetupSnafu)?;

    tracing::dispatcher::with_default(&dispatch, || {
        debug!("Parsed CLI arguments: {cli_args:?}");
        debug!("Loaded settings: {settings:?}");

        Application::run(RuntimeConfig::from((cli_args, settings)))
            .map(|_| ())
            .inspect_err(|err| error!("{err}"))
    })
}
