use std::path::PathBuf;

use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::data::{FlowMode, FlowSelectionError};
use crate::config::SettingsError;
use crate::filesystem::{LinkError, LinkReport, roots_overlap};
use crate::flows::{Flow, LinkFlow};
use crate::logging::LoggingError;
use crate::resolver::{ConfirmationPolicy, PathResolver, ResolutionError};

/// Validates the flow selection and the tree roots, then runs the selected
/// flow. Nothing is written below either root until the selection is valid.
pub struct Application;

impl Application {
    pub fn run(app_config: impl Into<RuntimeConfig>) -> Result<LinkReport, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let mut policy = app_config.on_missing_root.into_policy();
        Self::run_with_policy(app_config, policy.as_mut())
    }

    pub fn run_with_policy(
        app_config: RuntimeConfig,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<LinkReport, ApplicationError> {
        let mode = FlowMode::from_flags(app_config.clone_flow, app_config.patch_flow)
            .context(ConfigurationSnafu)?;
        info!("Selected the {} flow", mode);

        let resolver =
            PathResolver::new(app_config.protected_roots.clone()).context(ProtectedRootsSnafu)?;

        // Nothing may be created before the overlap check.
        let source_path = resolver
            .locate(&app_config.source)
            .context(PathResolutionSnafu { role: "source" })?;
        let destination_path = resolver
            .locate(&app_config.destination)
            .context(PathResolutionSnafu {
                role: "destination",
            })?;
        ensure!(
            !roots_overlap(&source_path, &destination_path),
            OverlappingRootsSnafu {
                source_root: source_path,
                destination_root: destination_path,
            }
        );

        let source = resolver
            .resolve(&source_path, policy)
            .context(PathResolutionSnafu { role: "source" })?;
        let destination = resolver
            .resolve(&destination_path, policy)
            .context(PathResolutionSnafu {
                role: "destination",
            })?;
        debug!(
            "Resolved roots: source={} destination={}",
            source.display(),
            destination.display()
        );

        let flow = Flow::new(mode, source, destination, app_config.link_style);
        let report = flow.run().context(FileSystemOperationSnafu)?;
        info!("{}", report.format(&format!("[{}]", flow.name().to_uppercase())));

        Ok(report)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    #[snafu(display("Invalid flow selection"))]
    ConfigurationError { source: FlowSelectionError },
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Critical failure encountered while opening the log sink"))]
    LoggingSetupError { source: LoggingError },
    #[snafu(display("The protected roots could not be located"))]
    ProtectedRootsError { source: ResolutionError },
    #[snafu(display("The {} path could not be used", role))]
    PathResolutionError {
        role: &'static str,
        source: ResolutionError,
    },
    #[snafu(display(
        "Source {} and destination {} overlap; one must not contain the other",
        source_root.display(),
        destination_root.display()
    ))]
    OverlappingRootsError {
        source_root: PathBuf,
        destination_root: PathBuf,
    },
    #[snafu(display("Critical failure encountered while linking"))]
    FileSystemOperationError { source: LinkError },
}
