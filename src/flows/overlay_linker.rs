use std::fs;

use tracing::{info, info_span, warn};

use crate::filesystem::{
    DirectoryOutcome, LinkError, LinkOutcome, LinkReport, LinkStyle, Materializer, Placement,
    TreeRoot,
};
use crate::flows::LinkFlow;

/// Patch flow: redirects destination links that have a counterpart in the
/// patch payload, and adds links for entries the payload introduces. Entries
/// without a counterpart are left alone.
#[derive(Debug, Clone)]
pub struct OverlayLinker {
    patch: TreeRoot,
    destination: TreeRoot,
    link_style: LinkStyle,
}

impl OverlayLinker {
    pub fn new(patch: TreeRoot, destination: TreeRoot, link_style: LinkStyle) -> Self {
        Self {
            patch,
            destination,
            link_style,
        }
    }

    fn destination_is_empty(&self) -> bool {
        fs::read_dir(self.destination.as_path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false)
    }
}

impl LinkFlow for OverlayLinker {
    fn name(&self) -> &'static str {
        "patch"
    }

    fn run(&self) -> Result<LinkReport, LinkError> {
        let _span = info_span!("patch", payload = %self.patch.display()).entered();
        info!(
            "Overlaying {} onto {}",
            self.patch.display(),
            self.destination.display()
        );
        if self.destination_is_empty() {
            warn!(
                "Destination {} is empty; run the clone flow first to link the base install",
                self.destination.display()
            );
        }

        let materializer = Materializer::new(&self.destination, self.link_style);
        let report = materializer.mirror(&self.patch, |node, placement| match placement {
            Placement::Link(LinkOutcome::Replaced { previous }) => info!(
                "Redirected {} from {} to {}",
                node.relative(),
                previous.display(),
                node.path().display()
            ),
            Placement::Link(LinkOutcome::Created) => {
                info!("Added {} -> {}", node.relative(), node.path().display())
            }
            Placement::Directory(DirectoryOutcome::Created) => {
                info!("Added directory {}", node.relative())
            }
            Placement::Link(LinkOutcome::Refreshed)
            | Placement::Directory(DirectoryOutcome::Existing) => {}
        })?;

        info!(
            "Patched {} entries ({} redirected, {} added)",
            report.links_total(),
            report.links_replaced,
            report.links_created
        );
        Ok(report)
    }
}
