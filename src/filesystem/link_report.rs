use std::fmt;

use crate::filesystem::materialize::{DirectoryOutcome, LinkOutcome, Placement};

/// Counters collected while materializing one tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub directories_created: u64,
    pub directories_existing: u64,
    pub links_created: u64,
    /// Links whose previous target differed from the new one.
    pub links_replaced: u64,
    /// Links rewritten with the target they already had.
    pub links_refreshed: u64,
}

impl LinkReport {
    pub fn record(&mut self, placement: &Placement) {
        match placement {
            Placement::Directory(DirectoryOutcome::Created) => self.directories_created += 1,
            Placement::Directory(DirectoryOutcome::Existing) => self.directories_existing += 1,
            Placement::Link(LinkOutcome::Created) => self.links_created += 1,
            Placement::Link(LinkOutcome::Replaced { .. }) => self.links_replaced += 1,
            Placement::Link(LinkOutcome::Refreshed) => self.links_refreshed += 1,
        }
    }

    pub fn links_total(&self) -> u64 {
        self.links_created + self.links_replaced + self.links_refreshed
    }

    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} directories created={} existing={} links created={} replaced={} refreshed={}",
            self.directories_created,
            self.directories_existing,
            self.links_created,
            self.links_replaced,
            self.links_refreshed
        )
    }
}

impl fmt::Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[LINK]"))
    }
}
