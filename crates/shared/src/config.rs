//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// SMTP configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Identity provider (magic links) configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Stripe webhook configuration.
    #[serde(default)]
    pub stripe: StripeConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Object storage configuration.
///
/// `provider` selects the write strategy: `s3`, `r2`, `fs` or `dual`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage strategy name.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Local filesystem disks.
    #[serde(default)]
    pub local: LocalStorageSettings,
    /// AWS S3 buckets.
    #[serde(default)]
    pub s3: BucketSettings,
    /// Cloudflare R2 buckets.
    #[serde(default)]
    pub r2: BucketSettings,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            max_file_size: default_max_file_size(),
            local: LocalStorageSettings::default(),
            s3: BucketSettings::default(),
            r2: BucketSettings::default(),
        }
    }
}

fn default_storage_provider() -> String {
    "fs".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

/// Local filesystem disk roots.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageSettings {
    /// Root directory of the private `fs` disk.
    #[serde(default = "default_private_root")]
    pub private_root: String,
    /// Root directory of the `public` disk.
    #[serde(default = "default_public_root")]
    pub public_root: String,
    /// URL prefix under which the `public` disk is served.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// URL prefix of the admin route that streams files from the `fs` disk.
    #[serde(default = "default_private_url")]
    pub private_url: String,
}

impl Default for LocalStorageSettings {
    fn default() -> Self {
        Self {
            private_root: default_private_root(),
            public_root: default_public_root(),
            public_url: default_public_url(),
            private_url: default_private_url(),
        }
    }
}

fn default_private_root() -> String {
    "./storage/private".to_string()
}

fn default_public_root() -> String {
    "./storage/public".to_string()
}

fn default_public_url() -> String {
    "/uploads".to_string()
}

fn default_private_url() -> String {
    "/api/v1/admin/files".to_string()
}

/// S3-compatible bucket pair (public + private).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BucketSettings {
    /// Service endpoint URL.
    pub endpoint: Option<String>,
    /// Region (`auto` for R2).
    pub region: Option<String>,
    /// Bucket for public assets.
    pub bucket: Option<String>,
    /// Bucket for private assets.
    pub private_bucket: Option<String>,
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Public base URL (CDN) for objects in the public bucket.
    pub public_url: Option<String>,
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "hello@ona-ui.com".to_string()
}

fn default_from_name() -> String {
    "Ona UI".to_string()
}

/// Identity provider configuration used to mint magic links.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider API.
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
    /// API key sent with server-to-server requests.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Public URL of the frontend, used to build callback URLs.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_base_url(),
            api_key: None,
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_identity_base_url() -> String {
    "http://localhost:3000/api/auth".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

/// Stripe webhook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    /// Endpoint signing secret (`whsec_...`).
    #[serde(default)]
    pub webhook_secret: String,
    /// Maximum accepted age of a signed payload in seconds.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

fn default_signature_tolerance() -> u64 {
    300
}

/// Unprefixed environment variables that override nested keys.
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("STORAGE_PROVIDER", "storage.provider"),
    ("MAX_FILE_SIZE", "storage.max_file_size"),
    ("R2_CDN_URL", "storage.r2.public_url"),
    ("R2_ENDPOINT", "storage.r2.endpoint"),
];

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// `ONA__*` variables, then the unprefixed storage variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ONA").separator("__"));

        for (var, key) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }
}
