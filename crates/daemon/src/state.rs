use std::{fs, path::PathBuf};

use common::auth::{session_ttl_from_secs, SessionCredential, SessionSecret};
use common::crypto::{Challenge, SecretKey, DEFAULT_CHALLENGE};
use serde::{Deserialize, Serialize};
use time::Duration;
use url::Url;

pub const APP_NAME: &str = "docvault";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const WALLET_FILE_NAME: &str = "wallet.pem";
pub const SESSION_KEY_FILE_NAME: &str = "session.key";
pub const SESSION_TOKEN_FILE_NAME: &str = "session.token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Message wallets sign to log in and to derive document keys.
    ///  Changing it locks every wallet out of its existing documents.
    #[serde(default = "default_challenge")]
    pub challenge: String,
    /// Lifetime of a session credential in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// IPFS HTTP API used to add content
    #[serde(default = "default_ipfs_api_url")]
    pub ipfs_api_url: Url,
    /// IPFS gateway used to fetch content
    #[serde(default = "default_ipfs_gateway_url")]
    pub ipfs_gateway_url: Url,
}

fn default_api_port() -> u16 {
    3000
}

fn default_challenge() -> String {
    DEFAULT_CHALLENGE.to_string()
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_ipfs_api_url() -> Url {
    Url::parse("http://127.0.0.1:5001").expect("static url")
}

fn default_ipfs_gateway_url() -> Url {
    Url::parse("http://127.0.0.1:8080").expect("static url")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            challenge: default_challenge(),
            session_ttl_secs: default_session_ttl_secs(),
            ipfs_api_url: default_ipfs_api_url(),
            ipfs_gateway_url: default_ipfs_gateway_url(),
        }
    }
}

impl AppConfig {
    pub fn challenge(&self) -> Challenge {
        Challenge::new(self.challenge.clone())
    }

    /// Session lifetime, refusing zero and out-of-range values
    pub fn session_ttl(&self) -> Result<Duration, StateError> {
        session_ttl_from_secs(self.session_ttl_secs)
            .map_err(|e| StateError::InvalidConfig(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the docvault directory (~/.docvault)
    pub vault_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the wallet key PEM file
    pub wallet_path: PathBuf,
    /// Path to the server's session signing secret
    pub session_key_path: PathBuf,
    /// Path to the client's last session credential
    pub session_token_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the docvault directory path (custom or default ~/.docvault)
    pub fn vault_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn at(vault_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            db_path: vault_dir.join(DB_FILE_NAME),
            wallet_path: vault_dir.join(WALLET_FILE_NAME),
            session_key_path: vault_dir.join(SESSION_KEY_FILE_NAME),
            session_token_path: vault_dir.join(SESSION_TOKEN_FILE_NAME),
            config_path: vault_dir.join(CONFIG_FILE_NAME),
            vault_dir,
            config,
        }
    }

    /// Initialize a new docvault state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let vault_dir = Self::vault_dir(custom_path)?;

        if vault_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        let config = config.unwrap_or_default();
        config.session_ttl()?;
        fs::create_dir_all(&vault_dir)?;

        let state = Self::at(vault_dir, config);

        let wallet = SecretKey::generate().map_err(|e| StateError::InvalidKey(e.to_string()))?;
        fs::write(&state.wallet_path, wallet.to_pem())?;

        let session_secret =
            SessionSecret::generate().map_err(|e| StateError::InvalidKey(e.to_string()))?;
        fs::write(&state.session_key_path, session_secret.to_hex())?;

        let config_toml = toml::to_string_pretty(&state.config)?;
        fs::write(&state.config_path, config_toml)?;

        // Just touch the file, migrations run when the daemon starts
        fs::write(&state.db_path, "")?;

        Ok(state)
    }

    /// Load existing state from the docvault directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let vault_dir = Self::vault_dir(custom_path)?;

        if !vault_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = vault_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        config.session_ttl()?;

        let state = Self::at(vault_dir, config);
        for (path, name) in [
            (&state.db_path, DB_FILE_NAME),
            (&state.wallet_path, WALLET_FILE_NAME),
            (&state.session_key_path, SESSION_KEY_FILE_NAME),
        ] {
            if !path.exists() {
                return Err(StateError::MissingFile(name.to_string()));
            }
        }

        Ok(state)
    }

    /// Load the wallet key used by client operations
    pub fn load_wallet(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.wallet_path)?;
        SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))
    }

    /// Load the secret the daemon signs session credentials with
    pub fn load_session_secret(&self) -> Result<SessionSecret, StateError> {
        let hex = fs::read_to_string(&self.session_key_path)?;
        SessionSecret::from_hex(&hex).map_err(|e| StateError::InvalidKey(e.to_string()))
    }

    pub fn save_session(&self, credential: &SessionCredential) -> Result<(), StateError> {
        fs::write(&self.session_token_path, credential.as_str())?;
        Ok(())
    }

    /// The credential from the last `login`, if any
    pub fn load_session(&self) -> Result<SessionCredential, StateError> {
        if !self.session_token_path.exists() {
            return Err(StateError::NotLoggedIn);
        }
        let token = fs::read_to_string(&self.session_token_path)?;
        Ok(SessionCredential::new(token.trim()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("docvault directory not initialized. Run 'docvault init' first")]
    NotInitialized,

    #[error("docvault directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("not logged in. Run 'docvault login' first")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
