use reqwest::multipart::{Form, Part};

use ipss_daemon::http_server::api::client::ApiError;
use ipss_daemon::http_server::api::mgr::car::CAR_FIELD;
use ipss_daemon::http_server::api::mgr::{ImportRequest, ImportResponse};

#[derive(Debug, thiserror::Error)]
pub enum MgrImportError {
    #[error("failed to read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ImportRequest {
    type Error = MgrImportError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let archive = tokio::fs::read(&self.path)
            .await
            .map_err(|e| MgrImportError::Read(self.path.display().to_string(), e))?;

        let form = Form::new().part(CAR_FIELD, Part::bytes(archive).file_name("archive.car"));
        let url = ctx
            .client
            .base_url()
            .join("/mgr/car/import")
            .map_err(ApiError::from)?;
        let request = ctx.client.http_client().post(url).multipart(form);
        let response: ImportResponse = ctx.client.send(request).await?;

        let mut lines = vec![format!("imported {} blocks", response.imported)];
        lines.extend(response.roots.iter().map(|root| format!("  root {}", root)));
        Ok(lines.join("\n"))
    }
}
