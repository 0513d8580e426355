use std::env;
use std::time::Duration;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "RESORT_API_URL";
/// Environment variable holding the request timeout in seconds.
pub const API_TIMEOUT_ENV: &str = "RESORT_API_TIMEOUT_SECS";

/// REST backend configuration
///
/// Passed explicitly to the client; nothing is read from ambient state at
/// request time except the token store the client was built with.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g. `https://resort.example.com/api`)
    pub base_url: String,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Key under which the bearer token is kept in the token store
    pub token_key: String,

    /// Quiet period before a search request is sent
    pub search_debounce: Duration,

    /// User-Agent header value
    pub user_agent: String,
}

impl ApiConfig {
    /// Create a configuration for the backend at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            token_key: "access_token".to_string(),
            search_debounce: Duration::from_millis(300),
            user_agent: format!("resortadmin/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the token store key
    pub fn token_key(mut self, key: &str) -> Self {
        self.token_key = key.to_string();
        self
    }

    /// Set search debounce delay
    pub fn search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Parse and validate a base URL
    ///
    /// Accepts `http://` and `https://` URLs with a host.
    ///
    /// # Examples
    ///
    /// ```
    /// # use resortadmin::ApiConfig;
    /// let config = ApiConfig::from_url("https://resort.example.com/api/").unwrap();
    /// assert_eq!(config.base_url, "https://resort.example.com/api");
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let config = Self::new(url);
        config.validate()?;
        Ok(config)
    }

    /// Build from `RESORT_API_URL` and, optionally, `RESORT_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, String> {
        let url = env::var(API_URL_ENV).map_err(|_| format!("{API_URL_ENV} is not set"))?;
        let mut config = Self::from_url(&url)?;

        if let Ok(raw) = env::var(API_TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("{API_TIMEOUT_ENV} must be a whole number of seconds"))?;
            config = config.request_timeout(Duration::from_secs(secs));
            config.validate()?;
        }

        Ok(config)
    }

    /// Absolute URL for a resource path such as `/roles/7`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let rest = self
            .base_url
            .strip_prefix("https://")
            .or_else(|| self.base_url.strip_prefix("http://"))
            .ok_or_else(|| "Base URL must start with 'http://' or 'https://'".to_string())?;

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err("Base URL must include a host".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be > 0".to_string());
        }

        if self.connect_timeout > self.request_timeout {
            return Err("connect_timeout cannot exceed request_timeout".to_string());
        }

        if self.token_key.trim().is_empty() {
            return Err("token_key cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
