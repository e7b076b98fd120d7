use crate::consts::STATUS_UNAUTHORIZED;
use crate::error::{FolioError, Result};

/// Session credential attached to protected fetches.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Raw outcome of one fetch. Non-success statuses are data, not errors.
#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }
}

/// Fetches a locator, optionally carrying a credential.
pub trait Transport: Send + Sync {
    /// Transport failures (DNS, TLS, timeouts) are `Err`; any HTTP status,
    /// including 401, comes back as `Ok`.
    fn fetch(&self, url: &str, credential: Option<&Credential>) -> Result<FetchResponse>;
}

/// Holder of the current session credential and the refresh capability.
pub trait CredentialProvider: Send + Sync {
    fn current(&self) -> Option<Credential>;

    /// Obtain a new credential and make it current.
    fn refresh(&self) -> Result<Credential>;
}

/// A fixed credential with no way to refresh it.
#[derive(Default)]
pub struct StaticCredentials {
    token: Option<Credential>,
}

impl StaticCredentials {
    pub fn new(token: Option<Credential>) -> Self {
        Self { token }
    }

    /// Read the credential from an environment variable, if set and non-empty.
    pub fn from_env(var: &str) -> Self {
        let token = std::env::var(var)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Credential::new);
        Self::new(token)
    }
}

impl CredentialProvider for StaticCredentials {
    fn current(&self) -> Option<Credential> {
        self.token.clone()
    }

    fn refresh(&self) -> Result<Credential> {
        Err(FolioError::Auth {
            locator: "credential refresh (no refresh endpoint configured)".into(),
        })
    }
}
