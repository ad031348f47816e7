//! Local bare mirrors of remote repositories.
//!
//! - [`path`] - Deterministic mapping from clone URL to mirror directory
//! - [`sync`] - Create-or-update of a single mirror
//! - [`git`] - The `git` command line backend
//! - [`credentials`] - Per-operation HTTP credentials

mod credentials;
mod error;
mod git;
mod path;
mod sync;

pub use credentials::{Anonymous, CredentialProvider, Credentials};
pub use error::{MirrorError, Result};
pub use git::{GitCli, VersionControl, credential_env};
pub use path::{mirror_path, mirror_path_for, parse_remote};
pub use sync::{MirrorOutcome, sync_mirror};
