mod flow;
mod hierarchy_builder;
mod overlay_linker;

pub use flow::{Flow, LinkFlow};
pub use hierarchy_builder::HierarchyBuilder;
pub use overlay_linker::OverlayLinker;
