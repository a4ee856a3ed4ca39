use derive_more::Display;
use snafu::Snafu;

/// The one flow a run performs. Clone and patch are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FlowMode {
    #[display("clone")]
    Clone,
    #[display("patch")]
    Patch,
}

impl FlowMode {
    pub fn from_flags(clone: bool, patch: bool) -> Result<Self, FlowSelectionError> {
        match (clone, patch) {
            (true, false) => Ok(FlowMode::Clone),
            (false, true) => Ok(FlowMode::Patch),
            (true, true) => Err(FlowSelectionError::BothFlowsError),
            (false, false) => Err(FlowSelectionError::NoFlowError),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FlowSelectionError {
    #[snafu(display("Both flows were enabled, which cannot happen. Please choose either clone or patch"))]
    BothFlowsError,
    #[snafu(display("Neither flow was enabled. Please choose either clone or patch"))]
    NoFlowError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(true, false, Ok(FlowMode::Clone))]
    #[case(false, true, Ok(FlowMode::Patch))]
    #[case(true, true, Err(FlowSelectionError::BothFlowsError))]
    #[case(false, false, Err(FlowSelectionError::NoFlowError))]
    fn exactly_one_flow_must_be_selected(
        #[case] clone: bool,
        #[case] patch: bool,
        #[case] expected: Result<FlowMode, FlowSelectionError>,
    ) {
        assert_eq!(FlowMode::from_flags(clone, patch), expected);
    }
}
