use clap::Args;

use docvault_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Whoami;

#[async_trait::async_trait]
impl crate::cli::op::Op for Whoami {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let wallet = ctx.state()?.load_wallet()?;
        Ok(wallet.public().to_string())
    }
}
