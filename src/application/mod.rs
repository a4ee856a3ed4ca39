mod application;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub(crate) use application::{ConfigurationSnafu, LoggingSetupSnafu, SettingsSnafu};
pub use runtime_config::{LogOptions, RuntimeConfig};
