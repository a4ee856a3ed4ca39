use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::ext::RelativePathExt;
use crate::filesystem::link_report::LinkReport;
use crate::filesystem::tree::{FileSystemNode, NodeKind, RelativePath, TreeRoot, WalkError, walk};

/// How a destination symlink refers to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum LinkStyle {
    /// The canonical absolute path of the target.
    #[default]
    #[display("absolute")]
    Absolute,
    /// A path from the link's directory to the target.
    #[display("relative")]
    Relative,
}

impl LinkStyle {
    pub fn target_for(&self, link: &Path, target: &Path) -> PathBuf {
        match self {
            LinkStyle::Absolute => target.to_path_buf(),
            LinkStyle::Relative => match link.parent() {
                Some(parent) => target.relative_from(parent),
                None => target.to_path_buf(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    Created,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    /// An existing link pointed elsewhere and was swapped out.
    Replaced { previous: PathBuf },
    /// An existing link already had the same target and was rewritten.
    Refreshed,
}

/// Writes directories and symlinks below one destination root.
///
/// Existing directories are reused and existing symlinks are always replaced.
/// Any other entry in the way is reported as [`LinkError::OccupiedError`] and
/// left untouched.
pub struct Materializer<'a> {
    destination: &'a TreeRoot,
    link_style: LinkStyle,
}

impl<'a> Materializer<'a> {
    pub fn new(destination: &'a TreeRoot, link_style: LinkStyle) -> Self {
        Self {
            destination,
            link_style,
        }
    }

    /// Reproduces every entry of `tree` below the destination, handing each
    /// node and what happened to it to `observe`. Stops at the first failure.
    pub fn mirror<F>(&self, tree: &TreeRoot, mut observe: F) -> Result<LinkReport, LinkError>
    where
        F: FnMut(&FileSystemNode, &Placement),
    {
        let mut report = LinkReport::default();

        for node in walk(tree) {
            let node = node.context(WalkSnafu)?;
            let placement = match node.kind() {
                NodeKind::Directory => {
                    Placement::Directory(self.ensure_directory(node.relative())?)
                }
                NodeKind::Leaf => Placement::Link(self.place_link(node.relative(), node.path())?),
            };
            report.record(&placement);
            observe(&node, &placement);
        }

        Ok(report)
    }

    pub fn ensure_directory(&self, relative: &RelativePath) -> Result<DirectoryOutcome, LinkError> {
        let path = self.destination.join(relative.as_path());

        match fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.is_dir() => Ok(DirectoryOutcome::Existing),
            Ok(metadata) => OccupiedSnafu {
                path,
                found: describe(&metadata.file_type()),
                expected: "directory",
            }
            .fail(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&path).context(CreateDirectorySnafu { path: path.clone() })?;
                trace!("Created directory {}", path.display());
                Ok(DirectoryOutcome::Created)
            }
            Err(err) => Err(err).context(InspectSnafu { path }),
        }
    }

    /// Points `destination/relative` at `target`, creating the parent
    /// directory when needed and replacing whatever symlink was there.
    pub fn place_link(&self, relative: &RelativePath, target: &Path) -> Result<LinkOutcome, LinkError> {
        if let Some(parent) = relative.parent() {
            self.ensure_directory(&parent)?;
        }

        let link = self.destination.join(relative.as_path());
        let link_target = self.link_style.target_for(&link, target);

        let previous = match fs::symlink_metadata(&link) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                Some(fs::read_link(&link).context(ReadLinkSnafu { path: link.clone() })?)
            }
            Ok(metadata) => {
                return OccupiedSnafu {
                    path: link,
                    found: describe(&metadata.file_type()),
                    expected: "symlink",
                }
                .fail();
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err).context(InspectSnafu { path: link }),
        };

        match &previous {
            None => create_symlink(&link_target, &link, target.is_dir()).context(CreateLinkSnafu {
                path: link.clone(),
                target: link_target.clone(),
            })?,
            Some(_) => self.swap_link(&link, &link_target, target.is_dir())?,
        }

        let outcome = match previous {
            None => LinkOutcome::Created,
            Some(previous) if previous == link_target => LinkOutcome::Refreshed,
            Some(previous) => LinkOutcome::Replaced { previous },
        };
        debug!("{} -> {} ({:?})", link.display(), link_target.display(), outcome);
        Ok(outcome)
    }

    /// Replaces an existing symlink by renaming a staged link over it, so the
    /// entry always resolves to either the old or the new target.
    fn swap_link(&self, link: &Path, link_target: &Path, target_is_dir: bool) -> Result<(), LinkError> {
        let staged = staging_path(link);
        if fs::symlink_metadata(&staged).is_ok_and(|metadata| metadata.file_type().is_symlink()) {
            fs::remove_file(&staged).context(RemoveLinkSnafu {
                path: staged.clone(),
            })?;
        }

        create_symlink(link_target, &staged, target_is_dir).context(CreateLinkSnafu {
            path: staged.clone(),
            target: link_target.to_path_buf(),
        })?;
        if let Err(source) = fs::rename(&staged, link) {
            if let Err(err) = fs::remove_file(&staged) {
                debug!("Failed to clean up {}: {}", staged.display(), err);
            }
            return Err(source).context(ReplaceLinkSnafu {
                path: link.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// What [`Materializer::mirror`] did for a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Directory(DirectoryOutcome),
    Link(LinkOutcome),
}

fn staging_path(link: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(link.file_name().unwrap_or_default());
    name.push(".overlink-staged");
    link.with_file_name(name)
}

fn describe(file_type: &fs::FileType) -> &'static str {
    if file_type.is_dir() {
        "directory"
    } else if file_type.is_file() {
        "regular file"
    } else if file_type.is_symlink() {
        "symlink"
    } else {
        "special file"
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path, _target_is_dir: bool) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path, target_is_dir: bool) -> io::Result<()> {
    if target_is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path, _target_is_dir: bool) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are unsupported on this platform",
    ))
}

#[derive(Debug, Snafu)]
pub enum LinkError {
    #[snafu(display("Failed to enumerate the tree being linked"))]
    WalkError { source: WalkError },
    #[snafu(display("Failed to inspect {}", path.display()))]
    InspectError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to create directory {}", path.display()))]
    CreateDirectoryError { path: PathBuf, source: io::Error },
    #[snafu(display(
        "Refusing to replace the {} at {}, expected a {}",
        found,
        path.display(),
        expected
    ))]
    OccupiedError {
        path: PathBuf,
        found: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Failed to read existing symlink {}", path.display()))]
    ReadLinkError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to remove stale staged symlink {}", path.display()))]
    RemoveLinkError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to swap the new symlink into {}", path.display()))]
    ReplaceLinkError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to link {} to {}", path.display(), target.display()))]
    CreateLinkError {
        path: PathBuf,
        target: PathBuf,
        source: io::Error,
    },
}
