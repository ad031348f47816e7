//! The authenticated session shared by every synchronization task.

use std::fmt;

use url::Url;

use crate::mirror::{CredentialProvider, Credentials};

/// Who the backup runs as.
///
/// Built once from the authenticated `/user` lookup and shared read-only.
/// The token doubles as the HTTP password for git over https.
#[derive(Clone)]
pub struct Session {
    username: String,
    token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl CredentialProvider for Session {
    fn credentials(&self, url: &Url) -> Option<Credentials> {
        // The token is an HTTP password only.
        match url.scheme() {
            "https" | "http" => Some(Credentials::new(&self.username, &self.token)),
            _ => None,
        }
    }
}
