use ipss_daemon::http_server::api::bucket::SetRootRequest;
use ipss_daemon::http_server::api::client::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum BucketSetRootError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for SetRootRequest {
    type Error = BucketSetRootError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        client.call(self.clone()).await?;
        Ok(format!("bucket root set to {}", self.id))
    }
}
