use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Expand `~` and `$VARS`, then make the path absolute against `base`.
pub fn resolve(raw: &str, base: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        Error::config_invalid_value("path", Some(raw.to_string()), e.to_string())
    })?;
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&base.join(path)))
    }
}

/// Lexically normalize a path: drops `.` and folds `..` without touching the
/// filesystem (the files may not exist on the machine running the check).
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the filesystem root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Component-wise containment; `/proj/srcfoo` is not inside `/proj/src`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Project-relative display form, falling back to the full path.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
