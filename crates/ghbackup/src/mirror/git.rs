//! The version-control backend: bare mirror clone and prune-fetch.
//!
//! [`GitCli`] shells out to the `git` executable. Fetches address the
//! mirror with `--git-dir`, never by working directory. Credentials never touch
//! the command line or the mirror's config; they are injected for a single
//! invocation through git's `GIT_CONFIG_*` environment protocol as an
//! `http.extraHeader`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use super::credentials::Credentials;
use super::error::{MirrorError, Result};

/// Clone and update bare mirrors.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Create a full mirror of `remote` at `dest`. `dest` exists and is empty.
    async fn clone_mirror(
        &self,
        remote: &Url,
        dest: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<()>;

    /// Bring an existing mirror up to date, pruning refs deleted upstream.
    async fn fetch_prune(&self, mirror: &Path, credentials: Option<&Credentials>) -> Result<()>;
}

/// [`VersionControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, credentials: Option<&Credentials>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        if let Some(creds) = credentials {
            cmd.envs(credential_env(creds));
        }

        cmd
    }

    async fn run(&self, mut cmd: Command, operation: &'static str, path: &Path) -> Result<()> {
        let output = cmd
            .output()
            .await
            .map_err(|source| MirrorError::Spawn { source })?;

        log_output(operation, path, &output);

        if output.status.success() {
            Ok(())
        } else {
            Err(MirrorError::Git {
                operation,
                path: path.to_path_buf(),
                status: output.status,
                stderr: first_line(&output.stderr),
            })
        }
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_mirror(
        &self,
        remote: &Url,
        dest: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        let mut cmd = self.command(credentials);
        cmd.arg("clone")
            .arg("--mirror")
            .arg("--quiet")
            .arg(remote.as_str())
            .arg(dest);

        self.run(cmd, "clone", dest).await
    }

    async fn fetch_prune(&self, mirror: &Path, credentials: Option<&Credentials>) -> Result<()> {
        let mut cmd = self.command(credentials);
        // An explicit git dir disables repository discovery, so a directory
        // that is not a mirror fails instead of resolving to an enclosing repo.
        cmd.arg("--git-dir")
            .arg(mirror)
            .arg("fetch")
            .arg("--prune")
            .arg("--quiet")
            .arg("origin");

        self.run(cmd, "fetch", mirror).await
    }
}

/// Environment that makes git send an HTTP basic `Authorization` header.
pub fn credential_env(creds: &Credentials) -> Vec<(OsString, OsString)> {
    let encoded = STANDARD.encode(format!("{}:{}", creds.username, creds.password));

    vec![
        ("GIT_CONFIG_COUNT".into(), "1".into()),
        ("GIT_CONFIG_KEY_0".into(), "http.extraHeader".into()),
        (
            "GIT_CONFIG_VALUE_0".into(),
            format!("Authorization: Basic {encoded}").into(),
        ),
    ]
}

fn first_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
        .unwrap_or_else(|| String::from("<no output>"))
}

fn log_output(operation: &str, path: &Path, output: &Output) {
    if output.stderr.is_empty() {
        return;
    }
    debug!(
        operation,
        path = %path.display(),
        status = %output.status,
        stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
        "git output"
    );
}
