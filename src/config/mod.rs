use serde::Deserialize;

/// Complete connector configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hubspot: HubSpotConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Frontend origins allowed to call the integration endpoints
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// HubSpot OAuth application and API endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct HubSpotConfig {
    /// Client ID (usually from HUBSPOT_CLIENT_ID)
    #[serde(default)]
    pub client_id: String,

    /// Client secret (usually from HUBSPOT_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// OAuth authorization endpoint URL
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,

    /// OAuth token exchange endpoint URL
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base URL of the CRM REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Lifetime of the state, verifier and credential keys
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/integrations/hubspot/oauth2callback".to_string()
}

fn default_authorization_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubapi.com/oauth/v1/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_scopes() -> Vec<String> {
    [
        "oauth",
        "crm.objects.companies.read",
        "crm.objects.contacts.read",
        "crm.objects.deals.read",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_session_ttl() -> u64 {
    600
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            authorization_url: default_authorization_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

impl HubSpotConfig {
    /// True once both client credentials are present
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Which key-value backend holds session data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

/// Key-value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: default_redis_url(),
        }
    }
}

impl AppConfig {
    /// Build from the TOML file named by HUBSPOT_CONNECTOR_CONFIG (if any),
    /// then apply environment overrides.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match std::env::var("HUBSPOT_CONNECTOR_CONFIG") {
            Ok(path) => load_config(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HUBSPOT_CLIENT_ID") {
            self.hubspot.client_id = v;
        }
        if let Some(v) = lookup("HUBSPOT_CLIENT_SECRET") {
            self.hubspot.client_secret = v;
        }
        if let Some(v) = lookup("HUBSPOT_REDIRECT_URI") {
            self.hubspot.redirect_uri = v;
        }
        if let Some(v) = lookup("REDIS_URL") {
            self.store.backend = StoreBackend::Redis;
            self.store.redis_url = v;
        }
        if let Some(v) = lookup("BIND_ADDRESS") {
            self.server.bind_address = v;
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&contents)?;
    Ok(config)
}
