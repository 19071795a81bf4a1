use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use ipss_daemon::http_server::api::bucket::add::FILE_FIELD;
use ipss_daemon::http_server::api::bucket::{AddRequest, AddResponse};
use ipss_daemon::http_server::api::client::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum BucketAddError {
    #[error("failed to read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("the bucket already holds this content")]
    AlreadyExists,
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for AddRequest {
    type Error = BucketAddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| BucketAddError::Read(self.path.display().to_string(), e))?;
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "item".to_string());

        let form = Form::new().part(FILE_FIELD, Part::bytes(data).file_name(file_name));
        let url = ctx
            .client
            .base_url()
            .join("/add")
            .map_err(ApiError::from)?;
        let request = ctx.client.http_client().post(url).multipart(form);

        let response: AddResponse = match ctx.client.send(request).await {
            Ok(response) => response,
            Err(e) if e.status() == Some(StatusCode::CONFLICT) => {
                return Err(BucketAddError::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(format!(
            "added {}\nroot  {}",
            response.item_id, response.new_root_id
        ))
    }
}
