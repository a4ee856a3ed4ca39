use crate::application::data::FlowMode;
use crate::filesystem::{LinkError, LinkReport, LinkStyle, TreeRoot};
use crate::flows::{HierarchyBuilder, OverlayLinker};

pub trait LinkFlow {
    fn name(&self) -> &'static str;
    // Materializes the flow below its destination root
    fn run(&self) -> Result<LinkReport, LinkError>;
}

#[derive(Debug, Clone)]
pub enum Flow {
    Clone(HierarchyBuilder),
    Patch(OverlayLinker),
}

impl Flow {
    /// `source` is the base install for a clone and the patch payload for a patch.
    pub fn new(mode: FlowMode, source: TreeRoot, destination: TreeRoot, link_style: LinkStyle) -> Self {
        match mode {
            FlowMode::Clone => Flow::Clone(HierarchyBuilder::new(source, destination, link_style)),
            FlowMode::Patch => Flow::Patch(OverlayLinker::new(source, destination, link_style)),
        }
    }
}

impl LinkFlow for Flow {
    fn name(&self) -> &'static str {
        match self {
            Flow::Clone(flow) => flow.name(),
            Flow::Patch(flow) => flow.name(),
        }
    }

    fn run(&self) -> Result<LinkReport, LinkError> {
        match self {
            Flow::Clone(flow) => flow.run(),
            Flow::Patch(flow) => flow.run(),
        }
    }
}
