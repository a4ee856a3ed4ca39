use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, error, info};

use crate::ext::{BestEffortPathExt, normalize_path};
use crate::filesystem::{TreeRoot, TreeRootError};
use crate::resolver::ConfirmationPolicy;

/// Turns user-supplied root paths into existing [`TreeRoot`]s.
///
/// A missing path whose parent exists is created directly. A missing path
/// whose parent is missing too is only created when the confirmation policy
/// agrees. Paths below a protected root are never created.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    protected_roots: Vec<PathBuf>,
}

impl PathResolver {
    /// Relative protected roots are taken from the working directory.
    pub fn new(protected_roots: Vec<PathBuf>) -> Result<Self, ResolutionError> {
        let protected_roots = protected_roots
            .iter()
            .map(|root| locate(root))
            .collect::<Result<_, _>>()?;
        Ok(Self { protected_roots })
    }

    /// Where `raw` would be resolved to, without creating anything.
    pub fn locate(&self, raw: &Path) -> Result<PathBuf, ResolutionError> {
        locate(raw)
    }

    pub fn resolve(
        &self,
        raw: &Path,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<TreeRoot, ResolutionError> {
        let path = locate(raw)?;

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => debug!("{} exists", path.display()),
            Ok(_) => return NotADirectorySnafu { path }.fail(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.create_missing(&path, policy)?
            }
            Err(err) => return Err(err).context(InspectSnafu { path }),
        }

        TreeRoot::open(&path).context(OpenSnafu)
    }

    fn create_missing(
        &self,
        path: &Path,
        policy: &mut dyn ConfirmationPolicy,
    ) -> Result<(), ResolutionError> {
        debug!("{} doesn't exist", path.display());

        if let Some(protected) = self.protected_root_of(path) {
            return ProtectedSnafu {
                path: path.to_path_buf(),
                protected_root: protected.to_path_buf(),
            }
            .fail();
        }

        if path.parent().is_some_and(Path::is_dir) {
            info!("Creating {}", path.display());
            return fs::create_dir(path).context(CreateSnafu {
                path: path.to_path_buf(),
            });
        }

        debug!("Parent of {} doesn't exist either", path.display());
        let confirmed = policy.confirm_create(path).context(ConfirmationSnafu {
            path: path.to_path_buf(),
        })?;
        if !confirmed {
            error!(
                "{} is not usable; update the source and/or destination path",
                path.display()
            );
            return DeclinedSnafu {
                path: path.to_path_buf(),
            }
            .fail();
        }

        info!("Creating {} and its missing parents", path.display());
        fs::create_dir_all(path).context(CreateSnafu {
            path: path.to_path_buf(),
        })
    }

    fn protected_root_of(&self, path: &Path) -> Option<&Path> {
        self.protected_roots
            .iter()
            .find(|root| path.starts_with(root))
            .map(PathBuf::as_path)
    }
}

/// Absolutizes and normalizes `raw`, then canonicalizes its longest existing
/// ancestor and re-appends the missing components.
fn locate(raw: &Path) -> Result<PathBuf, ResolutionError> {
    ensure!(!raw.as_os_str().is_empty(), EmptyPathSnafu);

    let path = if raw.is_absolute() {
        normalize_path(raw)
    } else {
        normalize_path(&env::current_dir().context(CurrentDirSnafu)?.join(raw))
    };

    let mut existing = path.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(canonical) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(canonical, |located, name| located.join(name)));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Ok(path.clone()),
                }
            }
            Err(err) => {
                return Err(err).context(InspectSnafu {
                    path: existing.to_path_buf(),
                });
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ResolutionError {
    #[snafu(display("An empty path cannot be used as a tree root"))]
    EmptyPathError,
    #[snafu(display("Failed to obtain current dir"))]
    CurrentDirError { source: io::Error },
    #[snafu(display("{} exists but is not a directory", path.display()))]
    NotADirectoryError { path: PathBuf },
    #[snafu(display("Failed to inspect {}", path.display()))]
    InspectError { path: PathBuf, source: io::Error },
    #[snafu(display(
        "{} doesn't exist and lies under protected root {}, which is never created automatically",
        path.display(),
        protected_root.display()
    ))]
    ProtectedError {
        path: PathBuf,
        protected_root: PathBuf,
    },
    #[snafu(display("Failed to ask whether {} should be created", path.display()))]
    ConfirmationError { path: PathBuf, source: io::Error },
    #[snafu(display("{} doesn't exist and creating it was declined", path.display()))]
    DeclinedError { path: PathBuf },
    #[snafu(display("Failed to create {}", path.best_effort_path_display()))]
    CreateError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to open tree root"))]
    OpenError { source: TreeRootError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::RelativePathExt;
    use crate::resolver::{AlwaysAbort, AlwaysCreate};
    use rstest::*;
    use tempfile::TempDir;

    /// Records every path it was asked about and answers with `answer`.
    struct Recording {
        answer: bool,
        asked: Vec<PathBuf>,
    }

    impl ConfirmationPolicy for Recording {
        fn confirm_create(&mut self, path: &Path) -> io::Result<bool> {
            self.asked.push(path.to_path_buf());
            Ok(self.answer)
        }
    }

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    #[rstest]
    fn existing_directory_resolves_to_canonical_root(dir: TempDir) {
        let nested = dir.path().join("install");
        fs::create_dir(&nested).unwrap();
        let dotted = dir.path().join("install/../install/.");

        let root = PathResolver::default()
            .resolve(&dotted, &mut AlwaysAbort)
            .unwrap();

        assert_eq!(root.as_path(), nested.canonicalize().unwrap());
    }

    #[rstest]
    fn missing_path_with_existing_parent_is_created_without_asking(dir: TempDir) {
        let mut policy = Recording {
            answer: false,
            asked: Vec::new(),
        };
        let path = dir.path().join("fresh");

        let root = PathResolver::default().resolve(&path, &mut policy).unwrap();

        assert!(root.is_dir());
        assert!(policy.asked.is_empty());
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn missing_parent_defers_to_the_policy(dir: TempDir, #[case] answer: bool) {
        let mut policy = Recording {
            answer,
            asked: Vec::new(),
        };
        let path = dir.path().join("deep/er/root");

        let result = PathResolver::default().resolve(&path, &mut policy);

        assert_eq!(
            policy.asked,
            vec![dir.path().canonicalize().unwrap().join("deep/er/root")]
        );
        if answer {
            assert!(result.unwrap().is_dir());
        } else {
            assert!(matches!(result, Err(ResolutionError::DeclinedError { .. })));
            assert!(!dir.path().join("deep").exists());
        }
    }

    #[rstest]
    fn regular_file_is_rejected(dir: TempDir) {
        let file = dir.path().join("file.txt");
        fs::write(&file, "content").unwrap();

        let result = PathResolver::default().resolve(&file, &mut AlwaysCreate);

        assert!(matches!(
            result,
            Err(ResolutionError::NotADirectoryError { .. })
        ));
    }

    #[rstest]
    fn protected_roots_are_never_created(dir: TempDir) {
        let protected = dir.path().join("tool-base");
        let resolver = PathResolver::new(vec![protected.clone()]).unwrap();

        let result = resolver.resolve(&protected.join("10.1"), &mut AlwaysCreate);

        assert!(matches!(result, Err(ResolutionError::ProtectedError { .. })));
        assert!(!protected.exists());
    }

    #[rstest]
    fn existing_paths_under_protected_roots_resolve(dir: TempDir) {
        let protected = dir.path().join("tool-base");
        fs::create_dir_all(protected.join("10.1")).unwrap();
        let resolver = PathResolver::new(vec![protected.clone()]).unwrap();

        assert!(resolver
            .resolve(&protected.join("10.1"), &mut AlwaysAbort)
            .is_ok());
    }

    #[rstest]
    fn relative_protected_roots_are_taken_from_the_working_directory(dir: TempDir) {
        let protected = dir.path().join("tool-base");
        let relative = protected.relative_from(&env::current_dir().unwrap());
        assert!(relative.is_relative());
        let resolver = PathResolver::new(vec![relative]).unwrap();

        let result = resolver.resolve(&protected.join("10.1"), &mut AlwaysCreate);

        assert!(matches!(result, Err(ResolutionError::ProtectedError { .. })));
        assert!(!protected.exists());
    }

    #[rstest]
    fn locate_creates_nothing(dir: TempDir) {
        let missing = dir.path().join("install/../new/deeper");

        let located = PathResolver::default().locate(&missing).unwrap();

        assert_eq!(
            located,
            dir.path().canonicalize().unwrap().join("new/deeper")
        );
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn empty_path_is_rejected() {
        let result = PathResolver::default().resolve(Path::new(""), &mut AlwaysCreate);

        assert!(matches!(result, Err(ResolutionError::EmptyPathError)));
    }

    #[test]
    fn resolution_errors_name_the_path() {
        let error = ResolutionError::DeclinedError {
            path: PathBuf::from("/opt/missing/root"),
        };

        assert!(error.to_string().contains("/opt/missing/root"));
    }
}
