mod flow_mode;
mod log_level;

pub use flow_mode::{FlowMode, FlowSelectionError};
pub use log_level::LogLevel;
