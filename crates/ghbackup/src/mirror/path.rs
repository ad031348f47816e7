use std::path::{Path, PathBuf};

use url::Url;

use super::error::{MirrorError, Result};

/// Derive where a repository's mirror lives under `root`.
///
/// The layout is `root/<host>/<path segments...>`, so
/// `https://github.com:443/octocat/Hello-World.git` maps to
/// `root/github.com/octocat/Hello-World.git`. Any port is dropped and empty
/// segments are skipped. Segments are kept percent-encoded, which keeps an
/// encoded `/` from introducing a directory level.
///
/// This never touches the filesystem.
pub fn mirror_path(root: &Path, clone_url: &str) -> Result<PathBuf> {
    let url = parse_remote(clone_url)?;
    mirror_path_for(root, &url)
}

/// Parse a clone URL, keeping the original text in the error.
pub fn parse_remote(clone_url: &str) -> Result<Url> {
    Url::parse(clone_url).map_err(|source| MirrorError::InvalidUrl {
        url: clone_url.to_string(),
        source,
    })
}

/// [`mirror_path`] for an already parsed URL.
pub fn mirror_path_for(root: &Path, url: &Url) -> Result<PathBuf> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| MirrorError::MissingHost {
            url: url.to_string(),
        })?;

    let mut path = root.join(host);
    let mut pushed = 0usize;

    for segment in url.path_segments().into_iter().flatten() {
        if segment.is_empty() {
            continue;
        }
        push_segment(&mut path, url.as_str(), segment)?;
        pushed += 1;
    }

    if pushed == 0 {
        return Err(MirrorError::MissingPath {
            url: url.to_string(),
        });
    }

    Ok(path)
}

fn push_segment(path: &mut PathBuf, url: &str, segment: &str) -> Result<()> {
    if segment == "." || segment == ".." {
        return Err(MirrorError::UnsafeSegment {
            url: url.to_string(),
            segment: segment.to_string(),
        });
    }
    path.push(segment);
    Ok(())
}
