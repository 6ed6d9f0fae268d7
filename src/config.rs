use std::time::Duration;

use secrecy::SecretString;

use crate::consts;

/// Session-wide settings: endpoints, frame geometry, capture cadence, and
/// the opaque voice access token.
pub struct Config {
    socket_url: String,
    http_base_url: String,
    use_stub_backend: bool,
    frame_width: u32,
    frame_height: u32,
    capture_interval: Duration,
    capacity: usize,
    voice_access_token: SecretString,
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_socket_url(mut self, socket_url: &str) -> Self {
        self.config.socket_url = socket_url.to_string();
        self
    }

    pub fn with_http_base_url(mut self, http_base_url: &str) -> Self {
        self.config.http_base_url = http_base_url.to_string();
        self
    }

    pub fn with_stub_backend(mut self, use_stub: bool) -> Self {
        self.config.use_stub_backend = use_stub;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.config.frame_width = width;
        self.config.frame_height = height;
        self
    }

    pub fn with_capture_interval(mut self, interval: Duration) -> Self {
        self.config.capture_interval = interval;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn with_voice_access_token(mut self, token: &str) -> Self {
        self.config.voice_access_token = SecretString::from(token.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            socket_url: consts::SOCKET_URL.to_string(),
            http_base_url: consts::HTTP_BASE_URL.to_string(),
            use_stub_backend: false,
            frame_width: consts::FRAME_WIDTH,
            frame_height: consts::FRAME_HEIGHT,
            capture_interval: Duration::from_millis(consts::CAPTURE_INTERVAL_MS),
            capacity: consts::CHANNEL_CAPACITY,
            voice_access_token: std::env::var(consts::VOICE_ACCESS_TOKEN_ENV)
                .unwrap_or_else(|_| "".to_string())
                .into(),
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Like `new()`, but fails when the voice access token is absent from
    /// the environment instead of deferring the failure to connect time.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var(consts::VOICE_ACCESS_TOKEN_ENV)
            .map_err(|_| ConfigError::MissingVar(consts::VOICE_ACCESS_TOKEN_ENV.to_string()))?;
        Ok(Self::builder().with_voice_access_token(&token).build())
    }

    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }

    pub fn http_base_url(&self) -> &str {
        &self.http_base_url
    }

    pub fn use_stub_backend(&self) -> bool {
        self.use_stub_backend
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    pub fn capture_interval(&self) -> Duration {
        self.capture_interval
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn voice_access_token(&self) -> &SecretString {
        &self.voice_access_token
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
}
