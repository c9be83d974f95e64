//! Credential source — username/password for the tracker
//!
//! Auth files hold the username on line 1 and the password on line 2.
//! One trailing line break is removed from each line; anything after line 2
//! is ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Tracker login
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

    /// Parse auth file contents
    ///
    /// # Errors
    /// `Credentials` if the username line is empty.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.split('\n');
        let username = strip_cr(lines.next().unwrap_or_default());
        let password = strip_cr(lines.next().unwrap_or_default());
        if username.is_empty() {
            return Err(Error::Credentials("auth file has no username".into()));
        }
        Ok(Self::new(username, password))
    }

    /// Read and parse an auth file
    pub fn from_auth_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Anything that can supply credentials
pub trait CredentialSource {
    fn credentials(&self) -> Result<Credentials>;
}

/// Credentials stored in an auth file on disk
#[derive(Debug, Clone)]
pub struct AuthFile {
    path: PathBuf,
}

impl AuthFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for AuthFile {
    fn credentials(&self) -> Result<Credentials> {
        let credentials = Credentials::from_auth_file(&self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            username = %credentials.username,
            "loaded credentials"
        );
        Ok(credentials)
    }
}
