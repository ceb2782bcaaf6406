//! Normalized path handling and confinement checks

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// `.` and `..` segments are resolved lexically on construction. For
/// absolute paths a `..` at the root is dropped; for relative paths a
/// leading `..` is dropped, so a relative path can never climb above
/// wherever it is later joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&raw),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment, resolving dot segments in the result.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if segment.is_empty() {
            return self.clone();
        }
        let joined = if self.inner.is_empty() {
            segment
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether `self` equals `base` or lies underneath it, compared by
    /// whole components.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        if base.inner.is_empty() {
            return true;
        }
        if self.inner == base.inner {
            return true;
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.starts_with(&prefix)
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Check if this appears to be a network path (UNC style `//server/share`).
    pub fn is_network_path(&self) -> bool {
        self.inner.starts_with("//")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

fn is_drive(component: &str) -> bool {
    component.len() == 2 && component.ends_with(':')
}

fn clean(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let is_network = unified.starts_with("//") && !unified.starts_with("///");
    let is_absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| !is_drive(last)) {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if is_network {
        format!("//{body}")
    } else if is_absolute {
        format!("/{body}")
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Validate that `name` is usable as a single file name.
///
/// Rejects empty names, dot names, NUL bytes and path separators.
pub fn validate_file_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("file name is empty".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("'{name}' is not a file name"));
    }
    if name.contains('\0') {
        return Err("file name contains a NUL byte".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!("'{name}' contains a path separator"));
    }
    Ok(())
}

/// Resolve `target` to a concrete file path confined to `root`.
///
/// Relative targets are joined onto the root. The lexical result must lie
/// under the root, the canonical parent directory must lie under the
/// canonical root (catching symlinked directories), and an existing target
/// must be a regular file rather than a symlink. Nothing is created.
pub fn resolve_within(root: &Path, target: impl AsRef<Path>) -> Result<PathBuf> {
    let target = target.as_ref();
    let canonical_root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
    let root_norm = NormalizedPath::new(&canonical_root);

    let joined = if target.is_absolute() {
        NormalizedPath::new(target)
    } else {
        root_norm.join(&target.to_string_lossy())
    };

    if !joined.starts_with(&root_norm) || joined == root_norm {
        return Err(Error::PathEscape {
            path: target.to_path_buf(),
            root: canonical_root,
        });
    }

    let name = joined
        .file_name()
        .ok_or_else(|| Error::untrusted(target, "path has no file name"))?;
    validate_file_name(name).map_err(|reason| Error::untrusted(target, reason))?;

    let parent = joined
        .parent()
        .ok_or_else(|| Error::untrusted(target, "path has no parent directory"))?;
    let parent_native = parent.to_native();
    let canonical_parent =
        dunce::canonicalize(&parent_native).map_err(|e| Error::io(&parent_native, e))?;
    if !canonical_parent.starts_with(&canonical_root) {
        return Err(Error::PathEscape {
            path: target.to_path_buf(),
            root: canonical_root,
        });
    }

    let resolved = canonical_parent.join(name);
    if let Ok(meta) = fs::symlink_metadata(&resolved) {
        if meta.file_type().is_symlink() {
            return Err(Error::untrusted(&resolved, "target is a symbolic link"));
        }
        if meta.is_dir() {
            return Err(Error::untrusted(&resolved, "target is a directory"));
        }
    }

    Ok(resolved)
}
