use config::{Config as ConfigCrate, ConfigError, Environment};
use serde::Deserialize;

/// Main configuration structure for the warden server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// The port the server will listen to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Value of the `iss` claim in issued tokens (default: warden)
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,

    /// Lifetime of issued tokens in seconds (default: 3600)
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry: i64,

    /// PEM file holding the RSA private key used to sign tokens - mandatory
    #[serde(default)]
    pub jwt_private_key_path: String,

    /// PEM file holding the RSA public key used to verify tokens - mandatory
    #[serde(default)]
    pub jwt_public_key_path: String,

    /// Answer CORS preflight requests on every route (default: true)
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_jwt_issuer() -> String {
    "warden".to_string()
}

fn default_jwt_expiry() -> i64 {
    3600
}

fn default_enable_cors() -> bool {
    true
}

impl ServerConfig {
    /// Creates a new Config instance from `WARDEN_*` environment variables
    pub fn new() -> Result<Self, String> {
        Self::from_environment(Environment::with_prefix("WARDEN").prefix_separator("_"))
    }

    fn from_environment(environment: Environment) -> Result<Self, String> {
        let config: Self = ConfigCrate::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.jwt_private_key_path.is_empty() {
            return Err("WARDEN_JWT_PRIVATE_KEY_PATH is required".to_string());
        }
        if self.jwt_public_key_path.is_empty() {
            return Err("WARDEN_JWT_PUBLIC_KEY_PATH is required".to_string());
        }
        if self.jwt_expiry <= 0 {
            return Err(format!(
                "WARDEN_JWT_EXPIRY must be positive, got {}",
                self.jwt_expiry
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self {
            port: 0, // Let the OS choose a port
            jwt_issuer: "warden-test".to_string(),
            jwt_expiry: 600,
            jwt_private_key_path: concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../warden/testdata/jwt_rs256.key"
            )
            .to_string(),
            jwt_public_key_path: concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../warden/testdata/jwt_rs256.pub"
            )
            .to_string(),
            enable_cors: true,
        }
    }
}
