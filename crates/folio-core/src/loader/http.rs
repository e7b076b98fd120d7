use std::sync::RwLock;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{FolioError, Result};

use super::transport::{Credential, CredentialProvider, FetchResponse, Transport};

/// Blocking HTTP transport; meant to run on a worker thread.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FolioError::network("<http client>", e))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str, credential: Option<&Credential>) -> Result<FetchResponse> {
        let mut request = self.client.get(url);
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.secret());
        }
        let response = request.send().map_err(|e| FolioError::network(url, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .map_err(|e| FolioError::network(url, e))?
            .to_vec();

        debug!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[derive(Deserialize)]
struct RefreshReply {
    access_token: String,
}

/// Credential provider backed by a token refresh endpoint.
pub struct RefreshEndpoint {
    client: Client,
    url: String,
    refresh_token: Option<String>,
    current: RwLock<Option<Credential>>,
}

impl RefreshEndpoint {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        refresh_token: Option<String>,
        initial: Option<Credential>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            refresh_token,
            current: RwLock::new(initial),
        }
    }
}

impl CredentialProvider for RefreshEndpoint {
    fn current(&self) -> Option<Credential> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    fn refresh(&self) -> Result<Credential> {
        let mut request = self.client.post(&self.url);
        if let Some(token) = &self.refresh_token {
            request = request.json(&serde_json::json!({ "refresh_token": token }));
        }
        let response = request
            .send()
            .map_err(|e| FolioError::network(&self.url, e))?;
        if !response.status().is_success() {
            return Err(FolioError::Auth {
                locator: self.url.clone(),
            });
        }

        let reply: RefreshReply = response
            .json()
            .map_err(|e| FolioError::network(&self.url, e))?;
        let credential = Credential::new(reply.access_token);
        if let Ok(mut slot) = self.current.write() {
            *slot = Some(credential.clone());
        }
        info!("Session credential refreshed");
        Ok(credential)
    }
}
