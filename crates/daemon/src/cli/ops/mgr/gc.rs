use ipss_daemon::http_server::api::client::ApiError;
use ipss_daemon::http_server::api::mgr::{GcRequest, GcResponse};

#[derive(Debug, thiserror::Error)]
pub enum MgrGcError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for GcRequest {
    type Error = MgrGcError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: GcResponse = client.call(self.clone()).await?;

        let mut lines = vec![format!("deleted {} blocks", response.deleted_ids.len())];
        lines.extend(response.deleted_ids.iter().map(|id| format!("  {}", id)));
        Ok(lines.join("\n"))
    }
}
