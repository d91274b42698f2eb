use std::collections::BTreeMap;
use std::time::Duration;

use crate::retry::DEFAULT_MAX_RETRIES;
use crate::url::DEFAULT_BASE_URL;

/// Default inactivity window for a streaming chat response.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport configuration for PaperMind API requests.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Optional bearer token passed to `Authorization`.
    pub access_token: Option<String>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional whole-request timeout for REST calls.
    pub timeout: Option<Duration>,
    /// Maximum gap between two body chunks of a chat stream.
    pub idle_timeout: Option<Duration>,
    /// Retry attempts after the initial request; never applied once a stream has started.
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
