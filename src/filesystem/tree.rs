use std::fmt;
use std::path::{Path, PathBuf};

use derive_more::Deref;
use snafu::{ResultExt, Snafu};
use tracing::trace;
use walkdir::WalkDir;

use crate::ext::BestEffortPathExt;

/// An existing, absolute and canonical directory anchoring one tree.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct TreeRoot(PathBuf);

impl TreeRoot {
    /// Canonicalizes `path` and checks that it names a directory.
    pub fn open(path: &Path) -> Result<Self, TreeRootError> {
        let canonical = path.canonicalize().context(CanonicalizeSnafu {
            path: path.to_path_buf(),
        })?;
        if !canonical.is_dir() {
            return NotADirectorySnafu { path: canonical }.fail();
        }
        Ok(Self(canonical))
    }
}

/// Whether either path contains the other, including when they are equal.
/// Both are expected in the same absolute, canonical form.
pub fn roots_overlap(first: &Path, second: &Path) -> bool {
    first.starts_with(second) || second.starts_with(first)
}

impl AsRef<Path> for TreeRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// A path relative to its tree root, used to match the same entry across trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// The enclosing directory, or `None` for entries directly under the root.
    pub fn parent(&self) -> Option<RelativePath> {
        self.0
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| RelativePath(parent.to_path_buf()))
    }
}

impl From<&str> for RelativePath {
    fn from(value: &str) -> Self {
        Self(PathBuf::from(value))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    /// Regular files, symlinks and anything else that is not a directory.
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemNode {
    kind: NodeKind,
    path: PathBuf,
    relative: RelativePath,
}

impl FileSystemNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Absolute path of the entry inside its own tree.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relative(&self) -> &RelativePath {
        &self.relative
    }

    fn try_from_entry(root: &Path, entry: walkdir::DirEntry) -> Result<Self, WalkError> {
        // Symlinks are never followed, so a link to a directory is a leaf.
        let kind = if entry.file_type().is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::Leaf
        };

        let path = entry.into_path();
        let relative = path
            .strip_prefix(root)
            .map(|relative| RelativePath(relative.to_path_buf()))
            .map_err(|_| WalkError::OutsideRootError {
                path: path.clone(),
                root: root.to_path_buf(),
            })?;

        Ok(FileSystemNode {
            kind,
            path,
            relative,
        })
    }
}

/// Lazy, parent-first enumeration of every entry below a [`TreeRoot`].
///
/// Entries are produced by a pre-order depth-first traversal with siblings
/// sorted by file name, so a directory is always yielded before anything it
/// contains. The root itself is not yielded.
pub struct TreeWalker {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

impl TreeWalker {
    pub fn new(root: &TreeRoot) -> Self {
        let entries = WalkDir::new(root.as_path())
            .min_depth(1)
            .follow_links(false)
            .contents_first(false)
            .sort_by_file_name()
            .into_iter();

        Self {
            root: root.to_path_buf(),
            entries,
        }
    }
}

impl Iterator for TreeWalker {
    type Item = Result<FileSystemNode, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let node = entry
            .context(TraverseSnafu {
                root: self.root.clone(),
            })
            .and_then(|entry| FileSystemNode::try_from_entry(&self.root, entry));

        if let Ok(node) = &node {
            trace!("Visited {:?} {}", node.kind, node.relative);
        }
        Some(node)
    }
}

/// Starts a fresh walk of `root`. Every call re-reads the filesystem.
pub fn walk(root: &TreeRoot) -> TreeWalker {
    TreeWalker::new(root)
}

#[derive(Debug, Snafu)]
pub enum TreeRootError {
    #[snafu(display("Failed to resolve tree root {}", path.best_effort_path_display()))]
    CanonicalizeError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Tree root {} is not a directory", path.display()))]
    NotADirectoryError { path: PathBuf },
}

#[derive(Debug, Snafu)]
pub enum WalkError {
    #[snafu(display("Failed to read an entry under {}", root.display()))]
    TraverseError {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[snafu(display("Entry {} is not inside tree root {}", path.display(), root.display()))]
    OutsideRootError { path: PathBuf, root: PathBuf },
}
