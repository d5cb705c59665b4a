use clap::Args;

use docvault_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 3000)]
    pub api_port: u16,

    /// Session lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub session_ttl_secs: u64,

    /// IPFS HTTP API url
    #[arg(long)]
    pub ipfs_api_url: Option<url::Url>,

    /// IPFS gateway url
    #[arg(long)]
    pub ipfs_gateway_url: Option<url::Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port,
            session_ttl_secs: self.session_ttl_secs,
            ipfs_api_url: self.ipfs_api_url.clone().unwrap_or(defaults.ipfs_api_url),
            ipfs_gateway_url: self
                .ipfs_gateway_url
                .clone()
                .unwrap_or(defaults.ipfs_gateway_url),
            challenge: defaults.challenge,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let wallet = state.load_wallet()?;

        Ok(format!(
            "Initialized docvault directory at: {}\n\
             - Database: {}\n\
             - Wallet: {} ({})\n\
             - Session key: {}\n\
             - Config: {}\n\
             - API port: {}\n\
             - IPFS API: {}\n\
             - IPFS gateway: {}",
            state.vault_dir.display(),
            state.db_path.display(),
            state.wallet_path.display(),
            wallet.public(),
            state.session_key_path.display(),
            state.config_path.display(),
            state.config.api_port,
            state.config.ipfs_api_url,
            state.config.ipfs_gateway_url,
        ))
    }
}
