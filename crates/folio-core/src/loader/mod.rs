pub mod handle;
#[cfg(feature = "http")]
pub mod http;
pub mod transport;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::attachment::{AttachmentDescriptor, AttachmentSource};
use crate::classify::sniff_mime;
use crate::error::{FolioError, Result};

pub use handle::{Handle, HandleId, HandleRegistry};
pub use transport::{Credential, CredentialProvider, FetchResponse, StaticCredentials, Transport};

/// Content obtained for a descriptor, not yet owned by any registry.
#[derive(Clone)]
pub enum Fetched {
    Inline {
        bytes: Arc<[u8]>,
        content_type: Option<String>,
    },
    /// Public locator passed through to the renderer untouched.
    Remote(String),
    Local(PathBuf),
}

impl Fetched {
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Inline { content_type, .. } => content_type.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Fetched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline {
                bytes,
                content_type,
            } => f
                .debug_struct("Inline")
                .field("len", &bytes.len())
                .field("content_type", content_type)
                .finish(),
            Self::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            Self::Local(path) => f.debug_tuple("Local").field(path).finish(),
        }
    }
}

/// Turns attachment references into displayable content.
///
/// Cheap to clone; clones share the transport and credential provider, so a
/// loader can be handed to a worker thread.
#[derive(Clone)]
pub struct ResourceLoader {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    base_url: Option<String>,
}

impl ResourceLoader {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            transport,
            credentials,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Build the HTTP-backed loader described by the network config.
    #[cfg(feature = "http")]
    pub fn from_config(config: &crate::config::NetworkConfig) -> Result<Self> {
        let transport = http::HttpTransport::new(&config.user_agent, config.timeout())?;
        let initial = StaticCredentials::from_env(&config.token_env).current();
        let credentials: Arc<dyn CredentialProvider> = match config.refresh_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Arc::new(http::RefreshEndpoint::new(
                transport.client(),
                url,
                std::env::var(&config.refresh_token_env).ok(),
                initial,
            )),
            _ => Arc::new(StaticCredentials::new(initial)),
        };
        Ok(Self::new(Arc::new(transport), credentials).with_base_url(config.base_url.clone()))
    }

    /// Obtain content for a descriptor. In-memory and local sources return
    /// immediately with no network call; protected remote sources go through
    /// [`ResourceLoader::fetch_protected`].
    pub fn fetch(&self, descriptor: &AttachmentDescriptor) -> Result<Fetched> {
        match &descriptor.source {
            AttachmentSource::Binary(blob) => {
                let content_type = descriptor
                    .declared_mime_type
                    .clone()
                    .or_else(|| sniff_mime(&blob.bytes).map(str::to_string));
                Ok(Fetched::Inline {
                    bytes: Arc::clone(&blob.bytes),
                    content_type,
                })
            }
            AttachmentSource::Local(path) => Ok(Fetched::Local(path.clone())),
            AttachmentSource::Remote(locator) => {
                let url = locator.resolve(self.base_url());
                if !locator.requires_auth {
                    return Ok(Fetched::Remote(url));
                }
                let response = self.fetch_protected(&url)?;
                let content_type = response
                    .content_type
                    .clone()
                    .or_else(|| sniff_mime(&response.body).map(str::to_string));
                Ok(Fetched::Inline {
                    bytes: response.body.into(),
                    content_type,
                })
            }
        }
    }

    /// Fetch with the current credential. On a 401, refresh the credential
    /// once and retry once; never loop beyond that.
    pub fn fetch_protected(&self, url: &str) -> Result<FetchResponse> {
        let credential = self.credentials.current();
        debug!("Fetching {url}");
        let first = self.transport.fetch(url, credential.as_ref())?;
        if !first.is_unauthorized() {
            return ensure_success(url, first);
        }

        warn!("Unauthorized fetch of {url}, refreshing credential");
        let refreshed = match self.credentials.refresh() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Credential refresh failed for {url}: {e}");
                return Err(FolioError::Auth {
                    locator: url.to_string(),
                });
            }
        };

        debug!("Retrying {url} with refreshed credential");
        let retry = self.transport.fetch(url, Some(&refreshed))?;
        if retry.is_unauthorized() {
            warn!("Authorization rejected for {url} after refresh");
            return Err(FolioError::Auth {
                locator: url.to_string(),
            });
        }
        ensure_success(url, retry)
    }

    /// Resolve a descriptor straight into a handle owned by `registry`.
    pub fn resolve(
        &self,
        descriptor: &AttachmentDescriptor,
        registry: &mut HandleRegistry,
    ) -> Result<Handle> {
        let fetched = self.fetch(descriptor)?;
        Ok(registry.materialize(fetched))
    }

    /// Read the bytes behind a fetch result, the way a renderer would load
    /// its source: inline bytes as-is, local files from disk, public
    /// locators with a plain unauthenticated fetch.
    pub fn read_bytes(&self, fetched: &Fetched) -> Result<Arc<[u8]>> {
        match fetched {
            Fetched::Inline { bytes, .. } => Ok(Arc::clone(bytes)),
            Fetched::Local(path) => Ok(std::fs::read(path)?.into()),
            Fetched::Remote(url) => {
                let response = ensure_success(url, self.transport.fetch(url, None)?)?;
                Ok(response.body.into())
            }
        }
    }
}

fn ensure_success(url: &str, response: FetchResponse) -> Result<FetchResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        warn!("Fetch of {url} failed with HTTP {}", response.status);
        Err(FolioError::network(url, format!("HTTP {}", response.status)))
    }
}
