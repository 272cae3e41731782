use crate::config::ServerConfig;
use std::sync::Arc;
use warden::{AuthError, Authenticator, Signer};

/// Shared, read-only state handed to route handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub signer: Arc<Signer>,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Load both halves of the key pair named in `config`
    pub fn new(config: &ServerConfig) -> Result<Self, AuthError> {
        let signer = Signer::from_key_file(
            config.jwt_issuer.clone(),
            config.jwt_expiry,
            &config.jwt_private_key_path,
        )?;
        let authenticator = Authenticator::from_key_file(&config.jwt_public_key_path)?
            .with_issuer(config.jwt_issuer.clone());

        Ok(Self {
            config: Arc::new(config.clone()),
            signer: Arc::new(signer),
            authenticator: Arc::new(authenticator),
        })
    }
}
