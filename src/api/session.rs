//! Session state carried across requests
//!
//! The cookie jar is shared with the HTTP client, which attaches and updates
//! cookies on every request. On top of that the session remembers which
//! identity the last successful login established.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use serde::Serialize;

use super::types::User;

/// Identity the session currently represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveIdentity {
    pub email: String,
    pub role: Option<String>,
}

/// Credential state owned by one [`ApiClient`](super::ApiClient)
pub struct Session {
    jar: Arc<Jar>,
    identity: Option<ActiveIdentity>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            identity: None,
        }
    }

    /// Cookie store handed to the HTTP client
    pub(crate) fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Whether any cookie would be sent to `url`
    pub fn has_cookies_for(&self, url: &Url) -> bool {
        self.jar.cookies(url).is_some()
    }

    pub fn identity(&self) -> Option<&ActiveIdentity> {
        self.identity.as_ref()
    }

    /// Record a successful login
    ///
    /// A login while another identity is active replaces it locally. The
    /// server is expected to do the same but this is not verified here.
    pub fn sign_in(&mut self, user: &User) {
        if let Some(previous) = &self.identity {
            if previous.email != user.email {
                tracing::warn!(
                    previous = %previous.email,
                    next = %user.email,
                    "logging in over an active session without logout"
                );
            }
        }
        self.identity = Some(ActiveIdentity {
            email: user.email.clone(),
            role: user.role.clone(),
        });
    }

    /// Forget the active identity, returning it
    pub fn sign_out(&mut self) -> Option<ActiveIdentity> {
        self.identity.take()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
