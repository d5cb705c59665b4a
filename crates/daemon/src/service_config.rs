use std::path::PathBuf;

use common::auth::SessionSecret;
use common::crypto::Challenge;
use time::Duration;

#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // authentication
    /// secret session credentials are signed with,
    ///  if not set then a new secret will be generated
    ///  and sessions will not survive a restart
    pub session_secret: Option<SessionSecret>,
    /// how long an issued session stays valid
    pub session_ttl: Duration,
    /// message wallets sign to log in
    pub challenge: Challenge,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3000,
            sqlite_path: None,
            session_secret: None,
            session_ttl: common::auth::DEFAULT_SESSION_TTL,
            challenge: Challenge::default(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
