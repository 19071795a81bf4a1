use clap::{Args, Subcommand};

pub mod add;
pub mod ls;
pub mod rm;
pub mod set_root;

use crate::cli::op::Op;
use ipss_daemon::http_server::api::bucket::{
    AddRequest, ListRequest, RemoveRequest, SetRootRequest,
};

crate::command_enum! {
    (Add, AddRequest),
    (Rm, RemoveRequest),
    (Ls, ListRequest),
    (SetRoot, SetRootRequest),
}

// Rename the generated Command to BucketCommand for clarity
pub type BucketCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Bucket {
    #[command(subcommand)]
    pub command: BucketCommand,
}

#[async_trait::async_trait]
impl Op for Bucket {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
