//! Candidate hosts and their credentials.

use std::fmt;

/// Path of the admin REST API relative to a host's base URL.
pub const API_ROOT: &str = "/v1/";

/// Default admin user.
pub const DEFAULT_USER: &str = "admin";

/// Default admin password.
pub const DEFAULT_PASSWORD: &str = "mariadb";

/// HTTP basic-auth credentials for an admin endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a user name and password.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// The user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USER, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One cluster member's admin endpoint.
///
/// The order of a host list is the failover order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    base_url: String,
    credentials: Credentials,
}

impl Host {
    /// Create a host from a base URL such as `http://10.0.0.1:8989`.
    ///
    /// Trailing slashes are removed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Credentials::default(),
        }
    }

    /// Use the given credentials for this host.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// The base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credentials used for this host.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Absolute URL of an API target on this host.
    #[must_use]
    pub fn url_for(&self, target: &str) -> String {
        format!("{}{API_ROOT}{}", self.base_url, target.trim_start_matches('/'))
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}
