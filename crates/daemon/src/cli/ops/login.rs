use clap::Args;

use docvault_daemon::http_server::api::client::ApiError;
use docvault_daemon::http_server::api::v0::authenticate::AuthenticateRequest;
use docvault_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Login;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("login failed: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = LoginError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let wallet = state.load_wallet()?;
        let challenge = state.config.challenge();

        let signature = wallet.sign(challenge.as_bytes());
        let response = ctx
            .client
            .call(AuthenticateRequest::new(&wallet.public(), &signature))
            .await?;

        state.save_session(&response.token)?;
        Ok(format!(
            "Logged in as {}\nSession valid until {}",
            wallet.public(),
            response.expires_at
        ))
    }
}
