use clap::{Args, Subcommand};

use crate::cli::op::Op;
use ipss_daemon::http_server::api::client::ApiError;
use ipss_daemon::http_server::api::mgr::{
    PinsLsRequest, PinsLsResponse, PinsRmRequest, PinsRmResponse,
};

crate::command_enum! {
    (Ls, PinsLsRequest),
    (Rm, PinsRmRequest),
}

/// Inspect and drop pins
#[derive(Args, Debug, Clone)]
pub struct Pins {
    #[command(subcommand)]
    pub command: Command,
}

#[async_trait::async_trait]
impl Op for Pins {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MgrPinsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for PinsLsRequest {
    type Error = MgrPinsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: PinsLsResponse = client.call(self.clone()).await?;

        if response.pins.is_empty() {
            return Ok("No pins".to_string());
        }
        Ok(response
            .pins
            .iter()
            .map(|pin| format!("{}  {}", pin.id, pin.tag))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[async_trait::async_trait]
impl Op for PinsRmRequest {
    type Error = MgrPinsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: PinsRmResponse = client.call(self.clone()).await?;

        if response.unpinned_ids.is_empty() {
            return Ok(format!("{} was not pinned", self.id));
        }
        Ok(format!("unpinned {}", response.unpinned_ids.join(", ")))
    }
}
