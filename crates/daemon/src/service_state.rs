use url::Url;

use common::auth::{Authenticator, SessionIssuer, SessionSecret};

use crate::database::{Database, DatabaseSetupError};
use crate::ServiceConfig;

/// Shared handles every request handler gets through axum `State`.
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    authenticator: Authenticator<Database>,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // check that the path exists
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                // parse the path into a URL
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup session issuer
        let session_secret = match config.session_secret.clone() {
            Some(secret) => secret,
            None => {
                tracing::warn!("no session secret configured, sessions will not survive a restart");
                SessionSecret::generate()
                    .map_err(|e| StateSetupError::SessionSecret(e.to_string()))?
            }
        };
        let issuer = SessionIssuer::new(&session_secret, config.session_ttl);
        tracing::info!(ttl = %config.session_ttl, "session issuer ready");

        let authenticator = Authenticator::new(database.clone(), issuer, config.challenge.clone());

        Ok(Self {
            database,
            authenticator,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn authenticator(&self) -> &Authenticator<Database> {
        &self.authenticator
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to setup the database: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("invalid database url")]
    InvalidDatabaseUrl,
    #[error("failed to create session secret: {0}")]
    SessionSecret(String),
}
