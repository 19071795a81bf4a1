use ipss_daemon::http_server::api::bucket::{ListRequest, ListResponse};
use ipss_daemon::http_server::api::client::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum BucketLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ListRequest {
    type Error = BucketLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: ListResponse = client.call(self.clone()).await?;

        let mut lines = vec![format!("root {}", response.root_id)];
        if response.item_ids.is_empty() {
            lines.push("No items found".to_string());
        } else {
            lines.extend(response.item_ids.iter().map(|id| format!("  {}", id)));
        }
        Ok(lines.join("\n"))
    }
}
