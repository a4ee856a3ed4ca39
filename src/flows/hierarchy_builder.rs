use tracing::{debug, info, info_span};

use crate::filesystem::{
    LinkError, LinkOutcome, LinkReport, LinkStyle, Materializer, Placement, TreeRoot,
};
use crate::flows::LinkFlow;

/// Clone flow: mirrors the shape of a base tree with every leaf realized as a
/// symlink back into that tree.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    source: TreeRoot,
    destination: TreeRoot,
    link_style: LinkStyle,
}

impl HierarchyBuilder {
    pub fn new(source: TreeRoot, destination: TreeRoot, link_style: LinkStyle) -> Self {
        Self {
            source,
            destination,
            link_style,
        }
    }
}

impl LinkFlow for HierarchyBuilder {
    fn name(&self) -> &'static str {
        "clone"
    }

    fn run(&self) -> Result<LinkReport, LinkError> {
        let _span = info_span!("clone", source = %self.source.display()).entered();
        info!(
            "Cloning {} into {}",
            self.source.display(),
            self.destination.display()
        );

        let materializer = Materializer::new(&self.destination, self.link_style);
        let report = materializer.mirror(&self.source, |node, placement| {
            if let Placement::Link(LinkOutcome::Replaced { previous }) = placement {
                debug!(
                    "Replaced stale link {} (was {})",
                    node.relative(),
                    previous.display()
                );
            }
        })?;

        info!("Cloned {} entries", report.links_total());
        Ok(report)
    }
}
