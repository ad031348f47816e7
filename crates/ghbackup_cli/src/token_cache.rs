//! On-disk token cache.
//!
//! The cache is a small JSON document, `{"access_token": "..."}`. Files
//! written by older tools in the oauth2 style (`{"AccessToken": "..."}`) are
//! read as well.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the token cache.
#[derive(Debug, Error)]
pub enum TokenCacheError {
    #[error("Failed to read token cache {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write token cache {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Token cache {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Token cache {path} does not contain a token")]
    Empty { path: PathBuf },

    #[error("No GitHub token: pass --token or --cache, or set GHBACKUP_GITHUB_TOKEN")]
    Missing,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    #[serde(alias = "AccessToken")]
    access_token: String,
}

/// Read the token stored at `path`.
pub fn read_token(path: &Path) -> Result<String, TokenCacheError> {
    let data = fs::read(path).map_err(|source| TokenCacheError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cached: CachedToken =
        serde_json::from_slice(&data).map_err(|source| TokenCacheError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let token = cached.access_token.trim();
    if token.is_empty() {
        return Err(TokenCacheError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(token.to_string())
}

/// Store `token` at `path`, creating parent directories as needed.
///
/// On unix the file is only readable by its owner.
pub fn write_token(path: &Path, token: &str) -> Result<(), TokenCacheError> {
    let write_err = |source| TokenCacheError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let body = serde_json::to_vec(&CachedToken {
        access_token: token.to_string(),
    })
    .map_err(|source| TokenCacheError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(&body).map_err(write_err)?;
    Ok(())
}

/// Decide which token to use.
///
/// An explicit token wins and is written through to the cache when one is
/// configured. Otherwise the cache is read.
pub fn resolve_token(
    token: Option<&str>,
    cache: Option<&Path>,
) -> Result<String, TokenCacheError> {
    match (token.filter(|t| !t.is_empty()), cache) {
        (Some(token), Some(cache)) => {
            write_token(cache, token)?;
            tracing::debug!("Saved token to {}", cache.display());
            Ok(token.to_string())
        }
        (Some(token), None) => Ok(token.to_string()),
        (None, Some(cache)) => read_token(cache),
        (None, None) => Err(TokenCacheError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");

        write_token(&path, "ghp_abc").unwrap();
        assert_eq!(read_token(&path).unwrap(), "ghp_abc");

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"access_token":"ghp_abc"}"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        write_token(&path, "ghp_abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_reads_oauth2_field_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(
            &path,
            r#"{"AccessToken":"legacy","TokenType":"bearer","RefreshToken":"","Expiry":"0001-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(read_token(&path).unwrap(), "legacy");
    }

    #[test]
    fn test_overwrite_replaces_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        write_token(&path, "a-much-longer-first-token").unwrap();
        write_token(&path, "short").unwrap();
        assert_eq!(read_token(&path).unwrap(), "short");
    }

    #[test]
    fn test_read_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_token(&missing),
            Err(TokenCacheError::Read { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            read_token(&garbage),
            Err(TokenCacheError::Parse { .. })
        ));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, r#"{"access_token":"  "}"#).unwrap();
        assert!(matches!(
            read_token(&empty),
            Err(TokenCacheError::Empty { .. })
        ));
    }

    #[test]
    fn test_resolve_token() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("token.json");

        assert!(matches!(
            resolve_token(None, None),
            Err(TokenCacheError::Missing)
        ));
        assert_eq!(resolve_token(Some("direct"), None).unwrap(), "direct");

        // Token plus cache writes through.
        assert_eq!(
            resolve_token(Some("fresh"), Some(&cache)).unwrap(),
            "fresh"
        );
        assert_eq!(resolve_token(None, Some(&cache)).unwrap(), "fresh");

        // An empty token falls back to the cache.
        assert_eq!(resolve_token(Some(""), Some(&cache)).unwrap(), "fresh");
    }
}
