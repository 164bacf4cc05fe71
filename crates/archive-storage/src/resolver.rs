//! Confinement of user-supplied paths to the upload root.
//!
//! Every component that touches the disk goes through [`PathResolver`]. Paths
//! are root-relative, `/`-separated, with no leading or trailing slash; the
//! empty string is the root itself.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use archive_core::error::{AppError, ErrorKind};
use archive_core::result::AppResult;

/// Characters rejected anywhere in a path, besides control characters.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Resolves root-relative paths against the canonical upload root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create the upload root if needed and canonicalize it.
    pub async fn new(upload_root: impl AsRef<Path>) -> AppResult<Self> {
        let upload_root = upload_root.as_ref();
        fs::create_dir_all(upload_root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create upload root: {}", upload_root.display()),
                e,
            )
        })?;
        let root = fs::canonicalize(upload_root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to canonicalize upload root: {}", upload_root.display()),
                e,
            )
        })?;
        info!(root = %root.display(), "Upload root initialized");
        Ok(Self { root })
    }

    /// The canonical upload root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Trim, convert `\` to `/`, collapse empty segments, and strip leading
    /// and trailing slashes.
    pub fn normalize_path(path: &str) -> String {
        path.trim()
            .replace('\\', "/")
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Parent of `path`; `""` for first-level paths and the root.
    pub fn get_parent_path(path: &str) -> String {
        let normalized = Self::normalize_path(path);
        match normalized.rfind('/') {
            Some(idx) if idx > 0 => normalized[..idx].to_string(),
            _ => String::new(),
        }
    }

    /// Last segment of `path`; `""` for the root.
    pub fn get_name(path: &str) -> String {
        let normalized = Self::normalize_path(path);
        match normalized.rfind('/') {
            Some(idx) => normalized[idx + 1..].to_string(),
            None => normalized,
        }
    }

    fn validate_syntax(normalized: &str) -> AppResult<()> {
        if normalized.is_empty() {
            return Ok(());
        }
        if normalized.split('/').any(|s| s == ".." || s == ".") {
            warn!(path = normalized, "Path traversal attempt");
            return Err(AppError::path_traversal(
                "Path traversal not allowed: relative segments are forbidden",
            ));
        }
        let mut chars = normalized.chars();
        if let (Some(letter), Some(':')) = (chars.next(), chars.next()) {
            if letter.is_ascii_alphabetic() {
                warn!(path = normalized, "Drive letter in path");
                return Err(AppError::path_traversal(
                    "Absolute paths with drive letters not allowed",
                ));
            }
        }
        if normalized
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_CHARS.contains(&c))
        {
            return Err(AppError::invalid_path(format!(
                "Path contains invalid characters: '{normalized}'"
            )));
        }
        Ok(())
    }

    /// Resolve a user-supplied path to an absolute path under the root.
    ///
    /// Containment is checked lexically, and again on the canonical path
    /// when the target exists so that symlinks cannot escape the root.
    pub async fn resolve(&self, relative: &str) -> AppResult<PathBuf> {
        let normalized = Self::normalize_path(relative);
        Self::validate_syntax(&normalized)?;

        let joined = if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&normalized)
        };
        if !joined.starts_with(&self.root) {
            warn!(path = relative, "Path resolves outside the upload root");
            return Err(AppError::path_traversal(
                "Invalid path: access outside uploads directory not allowed",
            ));
        }

        if fs::try_exists(&joined).await.unwrap_or(false) {
            let canonical = fs::canonicalize(&joined).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to canonicalize path: {normalized}"),
                    e,
                )
            })?;
            if !canonical.starts_with(&self.root) {
                warn!(
                    path = relative,
                    target = %canonical.display(),
                    "Symlink escapes the upload root"
                );
                return Err(AppError::path_traversal(
                    "Invalid path: access outside uploads directory not allowed",
                ));
            }
        }

        Ok(joined)
    }

    /// Root-relative `/`-separated form of an absolute path under the root.
    pub fn to_relative_path(&self, absolute: &Path) -> AppResult<String> {
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| AppError::path_traversal("Path is not under the upload root"))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(AppError::path_traversal(
                        "Path is not under the upload root",
                    ));
                }
            }
        }
        Ok(segments.join("/"))
    }

    /// Like [`resolve`](Self::resolve), but the target must be an existing
    /// directory.
    pub async fn resolve_existing_directory(&self, path: &str) -> AppResult<PathBuf> {
        let resolved = self.resolve(path).await?;
        match fs::metadata(&resolved).await {
            Ok(meta) if meta.is_dir() => Ok(resolved),
            Ok(_) => Err(AppError::invalid_path(format!(
                "Path is not a directory: {path}"
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::invalid_path(
                format!("Path does not exist: {path}"),
            )),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read metadata: {path}"),
                e,
            )),
        }
    }

    /// Create the directory and any missing ancestors.
    pub async fn ensure_directory(&self, path: &str) -> AppResult<PathBuf> {
        let resolved = self.resolve(path).await?;
        if let Ok(meta) = fs::metadata(&resolved).await {
            if meta.is_dir() {
                return Ok(resolved);
            }
            return Err(AppError::invalid_path(format!(
                "Path exists but is not a directory: {path}"
            )));
        }
        fs::create_dir_all(&resolved).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {path}"),
                e,
            )
        })?;
        debug!(path, "Created directory");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn resolver() -> (tempfile::TempDir, PathResolver) {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(dir.path().join("uploads")).await.unwrap();
        (dir, resolver)
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(PathResolver::normalize_path("  /a//b\\c/ "), "a/b/c");
        assert_eq!(PathResolver::normalize_path("/"), "");
        assert_eq!(PathResolver::normalize_path(""), "");
        assert_eq!(
            PathResolver::normalize_path("2024-2025/first/John Doe/"),
            "2024-2025/first/John Doe"
        );
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(PathResolver::get_parent_path("a/b/c"), "a/b");
        assert_eq!(PathResolver::get_parent_path("/a/"), "");
        assert_eq!(PathResolver::get_parent_path(""), "");
        assert_eq!(PathResolver::get_name("a/b/c"), "c");
        assert_eq!(PathResolver::get_name("a"), "a");
        assert_eq!(PathResolver::get_name(""), "");
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let (_dir, resolver) = resolver().await;
        for bad in ["..", "../etc", "a/../../b", "a\\..\\b", "./a", "C:/Windows", "c:"] {
            let err = resolver.resolve(bad).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::PathTraversal, "{bad}");
        }
    }

    #[tokio::test]
    async fn test_resolve_rejects_invalid_chars() {
        let (_dir, resolver) = resolver().await;
        for bad in ["a<b", "a/b?", "x|y", "a\u{0001}b", "a\"b", "dir/x:y"] {
            let err = resolver.resolve(bad).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidPath, "{bad}");
        }
    }

    #[tokio::test]
    async fn test_resolve_under_root() {
        let (_dir, resolver) = resolver().await;
        assert_eq!(resolver.resolve("").await.unwrap(), resolver.root());
        let resolved = resolver.resolve("/2024-2025//first/").await.unwrap();
        assert_eq!(resolved, resolver.root().join("2024-2025/first"));
        assert_eq!(
            resolver.to_relative_path(&resolved).unwrap(),
            "2024-2025/first"
        );
    }

    #[tokio::test]
    async fn test_to_relative_path_outside_root() {
        let (dir, resolver) = resolver().await;
        let err = resolver.to_relative_path(dir.path()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathTraversal);
        let sneaky = resolver.root().join("a/../../x");
        assert!(resolver.to_relative_path(&sneaky).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_rejected() {
        let (dir, resolver) = resolver().await;
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, resolver.root().join("link")).unwrap();

        let err = resolver.resolve("link").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathTraversal);
    }

    #[tokio::test]
    async fn test_resolve_existing_directory() {
        let (_dir, resolver) = resolver().await;
        let err = resolver.resolve_existing_directory("missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);

        std::fs::write(resolver.root().join("file.txt"), b"x").unwrap();
        let err = resolver
            .resolve_existing_directory("file.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);

        resolver.ensure_directory("a/b/c").await.unwrap();
        assert!(resolver.resolve_existing_directory("a/b").await.is_ok());
        // Idempotent.
        resolver.ensure_directory("a/b/c").await.unwrap();
    }
}
