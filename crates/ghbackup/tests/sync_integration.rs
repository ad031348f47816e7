//! Integration tests for the backup pipeline.
//!
//! These drive `run_backup` end to end with an in-memory repository source
//! and real `git` mirrors of local source repositories, and make sure every
//! run finishes within a timeout rather than hanging.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ghbackup::mirror::{Credentials, GitCli, VersionControl, mirror_path};
use ghbackup::platform::{
    self, Page, PlatformError, RepositoryDescriptor, RepositoryOwner, RepositorySource,
};
use ghbackup::sync::{
    SyncContext, SyncOptions, SyncProgress, SyncSummary, progress_channel, run_backup,
};
use url::Url;

/// Maximum time any backup run should take in tests.
/// If exceeded, there's likely a hang/deadlock.
const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

const HOST: &str = "git.example.test";

macro_rules! require_program {
    ($name:expr) => {{
        let exists = ::std::process::Command::new($name)
            .arg("--version")
            .stdout(::std::process::Stdio::null())
            .stderr(::std::process::Stdio::null())
            .status()
            .is_ok();
        if !exists {
            eprintln!("Couldn't find \"{}\"", $name);
            return;
        }
    }};
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Serves the repositories under `sources/<owner>/<name>` as if they were
/// hosted at `https://git.example.test/<owner>/<name>.git`.
struct LocalForge {
    user: Vec<(String, String)>,
    orgs: HashMap<String, Vec<String>>,
}

impl LocalForge {
    fn descriptor(owner: RepositoryOwner, name: &str) -> RepositoryDescriptor {
        let url = format!("https://{HOST}/{}/{name}.git", owner.login());
        RepositoryDescriptor::new(name, url, owner)
    }
}

#[async_trait]
impl RepositorySource for LocalForge {
    async fn list_user_repos(&self, page: u32) -> platform::Result<Page<RepositoryDescriptor>> {
        if page != 1 {
            return Ok(Page::last(vec![]));
        }
        let items = self
            .user
            .iter()
            .map(|(owner, name)| Self::descriptor(RepositoryOwner::User(owner.clone()), name))
            .collect();
        Ok(Page::last(items))
    }

    async fn list_organizations(&self) -> platform::Result<Vec<String>> {
        let mut orgs: Vec<String> = self.orgs.keys().cloned().collect();
        orgs.sort();
        Ok(orgs)
    }

    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
    ) -> platform::Result<Page<RepositoryDescriptor>> {
        let names = self
            .orgs
            .get(org)
            .ok_or_else(|| PlatformError::not_found(org))?;
        // One repository per page, to exercise pagination.
        let idx = page as usize - 1;
        let items = names
            .get(idx)
            .map(|n| vec![Self::descriptor(RepositoryOwner::Organization(org.to_string()), n)])
            .unwrap_or_default();
        let next = (idx + 1 < names.len()).then_some(page + 1);
        Ok(Page::new(items, next))
    }
}

/// Rewrites remote URLs on the fake host to local source directories before
/// handing off to the real git backend.
struct LocalGit {
    sources: PathBuf,
    git: GitCli,
}

impl LocalGit {
    fn local(&self, remote: &Url) -> Url {
        let mut dir = self.sources.clone();
        for segment in remote.path_segments().into_iter().flatten() {
            dir.push(segment.trim_end_matches(".git"));
        }
        Url::from_directory_path(dir).unwrap()
    }
}

#[async_trait]
impl VersionControl for LocalGit {
    async fn clone_mirror(
        &self,
        remote: &Url,
        dest: &Path,
        credentials: Option<&Credentials>,
    ) -> ghbackup::mirror::Result<()> {
        self.git
            .clone_mirror(&self.local(remote), dest, credentials)
            .await
    }

    async fn fetch_prune(
        &self,
        mirror: &Path,
        credentials: Option<&Credentials>,
    ) -> ghbackup::mirror::Result<()> {
        self.git.fetch_prune(mirror, credentials).await
    }
}

struct Fixture {
    _temp: tempfile::TempDir,
    sources: PathBuf,
    backup: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let sources = temp.path().join("sources");
        let backup = temp.path().join("backup");
        Self {
            _temp: temp,
            sources,
            backup,
        }
    }

    fn source(&self, owner: &str, name: &str) -> PathBuf {
        let dir = self.sources.join(owner).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["commit", "--quiet", "--allow-empty", "-m", "init"]);
        dir
    }

    fn mirror(&self, owner: &str, name: &str) -> PathBuf {
        mirror_path(&self.backup, &format!("https://{HOST}/{owner}/{name}.git")).unwrap()
    }

    async fn run(&self, forge: Arc<LocalForge>, workers: usize) -> (SyncSummary, Vec<SyncProgress>) {
        let vcs = Arc::new(LocalGit {
            sources: self.sources.clone(),
            git: GitCli::new(),
        });
        let ctx = SyncContext::builder()
            .backup_root(&self.backup)
            .vcs(vcs)
            .build()
            .unwrap();
        let (progress, mut rx) = progress_channel(4096);
        let options = SyncOptions::default().with_workers(workers);

        let summary = tokio::time::timeout(SYNC_TIMEOUT, run_backup(forge, ctx, &options, progress))
            .await
            .expect("backup timed out - possible hang");

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        (summary, events)
    }
}

#[tokio::test]
async fn first_run_clones_and_second_run_fetches() {
    require_program!("git");

    let fx = Fixture::new();
    let dotfiles = fx.source("octocat", "dotfiles");
    fx.source("acme", "api");
    fx.source("acme", "web");

    let forge = Arc::new(LocalForge {
        user: vec![("octocat".into(), "dotfiles".into())],
        orgs: HashMap::from([("acme".into(), vec!["api".into(), "web".into()])]),
    });

    let (first, _) = fx.run(Arc::clone(&forge), 2).await;
    assert_eq!(first.enumerated, 3);
    assert_eq!(first.cloned, 3);
    assert_eq!(first.fetched, 0);
    assert_eq!(first.failed, 0);

    let mirror = fx.mirror("octocat", "dotfiles");
    assert_eq!(git(&mirror, &["show-ref"]), git(&dotfiles, &["show-ref"]));

    git(&dotfiles, &["commit", "--quiet", "--allow-empty", "-m", "more"]);

    let (second, _) = fx.run(forge, 2).await;
    assert_eq!(second.cloned, 0);
    assert_eq!(second.fetched, 3);
    assert_eq!(git(&mirror, &["show-ref"]), git(&dotfiles, &["show-ref"]));
}

#[tokio::test]
async fn one_broken_repository_does_not_stop_the_rest() {
    require_program!("git");

    let fx = Fixture::new();
    fx.source("acme", "api");
    // acme/missing has no source repository, so its clone fails.

    let forge = Arc::new(LocalForge {
        user: vec![],
        orgs: HashMap::from([("acme".into(), vec!["missing".into(), "api".into()])]),
    });

    let (summary, events) = fx.run(forge, 4).await;

    assert_eq!(summary.cloned, 1);
    assert_eq!(summary.failed, 1);
    assert!(fx.mirror("acme", "api").is_dir());
    assert!(events.iter().any(|e| matches!(
        e,
        SyncProgress::MirrorError { repo, .. } if repo == "acme/missing"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SyncProgress::NoRepositories { .. }
    )));
}

#[tokio::test]
async fn file_in_place_of_mirror_is_reported() {
    require_program!("git");

    let fx = Fixture::new();
    fx.source("octocat", "notes");
    let mirror = fx.mirror("octocat", "notes");
    std::fs::create_dir_all(mirror.parent().unwrap()).unwrap();
    std::fs::write(&mirror, b"squatter").unwrap();

    let forge = Arc::new(LocalForge {
        user: vec![("octocat".into(), "notes".into())],
        orgs: HashMap::new(),
    });

    let (summary, events) = fx.run(forge, 1).await;

    assert_eq!(summary.failed, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        SyncProgress::MirrorError { error, .. } if error.ends_with("exists, but is a file")
    )));
}

#[tokio::test]
async fn empty_account_finishes_cleanly() {
    let fx = Fixture::new();
    let forge = Arc::new(LocalForge {
        user: vec![],
        orgs: HashMap::new(),
    });

    let (summary, events) = fx.run(forge, 4).await;

    assert_eq!(summary, SyncSummary::default());
    assert!(matches!(
        events.last(),
        Some(SyncProgress::SyncComplete { cloned: 0, fetched: 0, failed: 0 })
    ));
}
