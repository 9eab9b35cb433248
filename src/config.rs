use crate::models::Address;
use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Set of account addresses permitted to authenticate.
///
/// Built once at start-up and shared read-only. An empty allowlist denies
/// every address.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    addresses: HashSet<Address>,
}

impl Allowlist {
    /// Parse a comma-separated list of addresses. Blank entries are ignored.
    pub fn from_csv(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Address::new)
            .collect()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl FromIterator<Address> for Allowlist {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Allowlist {
            addresses: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    // Authentication
    pub allowlist: Allowlist,

    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // Campaign document
    pub campaigns_storage_path: PathBuf,
    pub campaigns_document_key: String,

    // Limits
    pub max_body_bytes: usize,

    // TTLs (in seconds)
    pub session_ttl_secs: u64,
    pub nonce_ttl_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("allowlist_size", &self.allowlist.len())
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("campaigns_storage_path", &self.campaigns_storage_path)
            .field("campaigns_document_key", &self.campaigns_document_key)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("nonce_ttl_secs", &self.nonce_ttl_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// 24 hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
/// 7 days.
pub const DEFAULT_NONCE_TTL_SECS: u64 = 604_800;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // A missing allowlist is legal and denies everyone
        let allowlist = Allowlist::from_csv(&env::var("ALLOWED_ADDRESSES").unwrap_or_default());

        // Redis — required, token and nonce records live there
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // Campaign document location
        let campaigns_storage_path = PathBuf::from(
            env::var("CAMPAIGNS_STORAGE_PATH").unwrap_or_else(|_| "./data".to_string()),
        );
        let campaigns_document_key =
            env::var("CAMPAIGNS_DOCUMENT_KEY").unwrap_or_else(|_| "campaigns.toml".to_string());
        validate_document_key(&campaigns_document_key)?;

        // Limits
        let max_body_bytes = parse_env_or_default("MAX_BODY_BYTES", 65_536)?;

        // TTLs
        let session_ttl_secs = parse_env_or_default("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let nonce_ttl_secs = parse_env_or_default("NONCE_TTL_SECS", DEFAULT_NONCE_TTL_SECS)?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if nonce_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "NONCE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            allowlist,
            redis_url,
            bind_addr,
            campaigns_storage_path,
            campaigns_document_key,
            max_body_bytes,
            session_ttl_secs,
            nonce_ttl_secs,
        })
    }
}

/// The document key is joined onto the storage directory, so it must be a
/// plain file name.
fn validate_document_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(ConfigError::InvalidValue(
            "CAMPAIGNS_DOCUMENT_KEY".to_string(),
            "must be a plain file name".to_string(),
        ));
    }
    Ok(())
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
