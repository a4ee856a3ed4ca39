use std::path::{Component, Path, PathBuf};

pub fn best_effort_path_display(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical_path) => canonical_path.display().to_string(),
        Err(_) => {
            let absolute_path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                match std::env::current_dir() {
                    Ok(current_dir) => current_dir.join(path),
                    Err(_) => path.to_path_buf(),
                }
            };

            normalize_path(&absolute_path).display().to_string()
        }
    }
}

/// Lexically resolves `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !components.is_empty()
                    && !matches!(
                        components.last(),
                        Some(Component::RootDir | Component::Prefix(_))
                    )
                {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Computes the path that leads from `base` to `target` using only `..` and
/// plain components. Both paths are expected to be absolute.
pub fn relative_path_from(target: &Path, base: &Path) -> PathBuf {
    let target = normalize_path(target);
    let base = normalize_path(base);

    let mut target_components = target.components().peekable();
    let mut base_components = base.components().peekable();

    while let (Some(t), Some(b)) = (target_components.peek(), base_components.peek()) {
        if t != b {
            break;
        }
        target_components.next();
        base_components.next();
    }

    let mut relative: PathBuf = base_components.map(|_| Component::ParentDir).collect();
    relative.extend(target_components);

    if relative.as_os_str().is_empty() {
        relative.push(Component::CurDir);
    }
    relative
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

pub trait RelativePathExt {
    fn relative_from(&self, base: &Path) -> PathBuf;
}

impl RelativePathExt for Path {
    fn relative_from(&self, base: &Path) -> PathBuf {
        relative_path_from(self, base)
    }
}
