use std::fmt;

use url::Url;

/// HTTP basic credentials handed to git for one clone or fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials for a remote, asked immediately before each git
/// operation. Returning `None` runs git unauthenticated.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self, url: &Url) -> Option<Credentials>;
}

/// A provider that never supplies credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialProvider for Anonymous {
    fn credentials(&self, _url: &Url) -> Option<Credentials> {
        None
    }
}
