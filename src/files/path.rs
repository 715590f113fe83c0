//! Request path resolution beneath the base directory.
//!
//! Two checks run on every path:
//! - lexical: after percent-decoding, `..` may never climb above the root
//! - on disk: the deepest existing ancestor of the target must
//!   canonicalize to a location inside the canonical base directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::http::RequestError;

/// Decode `request_path` and turn it into a base-relative path.
pub fn normalize(request_path: &str) -> Result<PathBuf, RequestError> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| RequestError::InvalidPath(request_path.to_string()))?;
    if decoded.contains('\0') {
        return Err(RequestError::InvalidPath(request_path.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(RequestError::PathTraversal(request_path.to_string()));
                }
            }
            s if s.contains('\\') => {
                return Err(RequestError::PathTraversal(request_path.to_string()));
            }
            s => segments.push(s),
        }
    }
    Ok(segments.iter().collect())
}

/// Reject `candidate` if following symlinks would leave `base`.
///
/// Missing components are fine: the nearest existing ancestor is checked
/// instead. A dangling symlink is treated as an escape, since writing
/// through it could create a file anywhere.
pub async fn confine(base: &Path, candidate: &Path, request_path: &str) -> Result<(), RequestError> {
    let canonical_base = match fs::canonicalize(base).await {
        Ok(path) => path,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut probe = candidate;
    loop {
        match fs::canonicalize(probe).await {
            Ok(resolved) if resolved.starts_with(&canonical_base) => return Ok(()),
            Ok(_) => return Err(RequestError::PathTraversal(request_path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if fs::symlink_metadata(probe).await.is_ok() {
                    return Err(RequestError::PathTraversal(request_path.to_string()));
                }
                match probe.parent() {
                    Some(parent) if parent.starts_with(base) => probe = parent,
                    _ => return Ok(()),
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_paths() {
        assert_eq!(normalize("/index.html").unwrap(), PathBuf::from("index.html"));
        assert_eq!(normalize("/a//b/./c.txt").unwrap(), PathBuf::from("a/b/c.txt"));
        assert_eq!(normalize("/a/../b.css").unwrap(), PathBuf::from("b.css"));
        assert_eq!(normalize("/my%20file.txt").unwrap(), PathBuf::from("my file.txt"));
    }

    #[test]
    fn rejects_climbing_above_root() {
        for path in ["/../secret.txt", "/a/../../secret.txt", "/%2e%2e/secret.txt", "/..%2fsecret.txt"] {
            assert!(
                matches!(normalize(path), Err(RequestError::PathTraversal(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_undecodable_paths() {
        assert!(matches!(normalize("/%ff.txt"), Err(RequestError::InvalidPath(_))));
        assert!(matches!(normalize("/a%00.txt"), Err(RequestError::InvalidPath(_))));
        assert!(matches!(normalize("/a\\..\\b.txt"), Err(RequestError::PathTraversal(_))));
    }

    #[tokio::test]
    async fn confine_accepts_missing_and_nested_paths() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir(base.path().join("sub")).unwrap();

        confine(base.path(), &base.path().join("sub/new.txt"), "/sub/new.txt")
            .await
            .unwrap();
        confine(base.path(), &base.path().join("x/y/z.txt"), "/x/y/z.txt")
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn confine_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        let base = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), base.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("gone.txt"),
            base.path().join("dangling.txt"),
        )
        .unwrap();

        let escaped = confine(base.path(), &base.path().join("link/secret.txt"), "/link/secret.txt").await;
        assert!(matches!(escaped, Err(RequestError::PathTraversal(_))));

        let created = confine(base.path(), &base.path().join("link/new/x.txt"), "/link/new/x.txt").await;
        assert!(matches!(created, Err(RequestError::PathTraversal(_))));

        let dangling = confine(base.path(), &base.path().join("dangling.txt"), "/dangling.txt").await;
        assert!(matches!(dangling, Err(RequestError::PathTraversal(_))));
    }
}
