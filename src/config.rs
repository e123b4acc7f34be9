//! Configuration for the HTTP transport
//!
//! Only [`HttpTransport`](crate::HttpTransport) reads these options. The registry,
//! assistant, thread and run loop never touch the environment.

use crate::{Error, Result};
use std::env;

/// Base URL used when neither the builder nor the environment provides one
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Value of the `OpenAI-Beta` header required by the assistants endpoints
pub const ASSISTANTS_BETA: &str = "assistants=v2";

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 30;

/// Options for building an [`HttpTransport`](crate::HttpTransport)
#[derive(Clone)]
pub struct ClientOptions {
    /// Bearer token sent with every request
    pub api_key: String,

    /// API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Optional organization header
    pub organization: Option<String>,

    /// Connect timeout in seconds.
    ///
    /// No whole-request timeout is applied, since run streams stay open while
    /// the model works. Use
    /// [`RunOptions::stream_timeout`](crate::RunOptions::stream_timeout) to bound stalls.
    pub connect_timeout: u64,
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl ClientOptions {
    /// Create a new builder for ClientOptions
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// Builder seeded from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_ORGANIZATION`
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use assistant_runs::ClientOptions;
    ///
    /// let options = ClientOptions::from_env().build()?;
    /// # Ok::<(), assistant_runs::Error>(())
    /// ```
    pub fn from_env() -> ClientOptionsBuilder {
        let mut builder = ClientOptionsBuilder::default();
        builder.api_key = get_api_key();
        builder.base_url = Some(get_base_url(None));
        builder.organization = env::var("OPENAI_ORGANIZATION").ok();
        builder
    }
}

/// Builder for ClientOptions
#[derive(Default)]
pub struct ClientOptionsBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    organization: Option<String>,
    connect_timeout: Option<u64>,
}

impl std::fmt::Debug for ClientOptionsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptionsBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .finish()
    }
}

impl ClientOptionsBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = Some(seconds);
        self
    }

    pub fn build(self) -> Result<ClientOptions> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::config("api_key is required"))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if base_url.is_empty() {
            return Err(Error::config("base_url must not be empty"));
        }

        Ok(ClientOptions {
            api_key,
            base_url,
            organization: self.organization,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        })
    }
}

/// Get the base URL from environment variable or fallback
///
/// Priority:
/// 1. OPENAI_BASE_URL environment variable
/// 2. fallback parameter
/// 3. [`DEFAULT_BASE_URL`]
pub fn get_base_url(fallback: Option<&str>) -> String {
    if let Ok(url) = env::var("OPENAI_BASE_URL") {
        return url;
    }

    fallback.unwrap_or(DEFAULT_BASE_URL).to_string()
}

/// Get the API key from the OPENAI_API_KEY environment variable
pub fn get_api_key() -> Option<String> {
    env::var("OPENAI_API_KEY").ok()
}
