use reqwest::StatusCode;

use common::linked_data::{parse_cid, CidError};
use ipss_daemon::http_server::api::bucket::{RemoveRequest, RemoveResponse};
use ipss_daemon::http_server::api::client::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum BucketRmError {
    #[error(transparent)]
    InvalidIdentifier(#[from] CidError),
    #[error("no item {0} in the bucket")]
    NotFound(String),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for RemoveRequest {
    type Error = BucketRmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        parse_cid(&self.id)?;

        let mut client = ctx.client.clone();
        let response: RemoveResponse = match client.call(self.clone()).await {
            Ok(response) => response,
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                return Err(BucketRmError::NotFound(self.id.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(format!("removed {}\nroot    {}", self.id, response.new_root_id))
    }
}
