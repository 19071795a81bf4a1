use clap::{Args, Subcommand};

pub mod gc;
pub mod import;
pub mod pins;

use crate::cli::op::Op;
use ipss_daemon::http_server::api::mgr::{GcRequest, ImportRequest};

crate::command_enum! {
    (Gc, GcRequest),
    (Pins, pins::Pins),
    (Import, ImportRequest),
}

pub type MgrCommand = Command;

/// Administrative operations
#[derive(Args, Debug, Clone)]
pub struct Mgr {
    #[command(subcommand)]
    pub command: MgrCommand,
}

#[async_trait::async_trait]
impl Op for Mgr {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
