use reqwest::{Client, RequestBuilder};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::BasicAuth;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    credentials: Option<BasicAuth>,
}

impl ApiClient {
    pub fn new(remote: &Url, credentials: Option<BasicAuth>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            credentials,
        })
    }

    pub async fn call<T: ApiRequest>(&mut self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        self.send(request_builder).await
    }

    /// Send a custom request (e.g. an upload), attaching credentials
    ///  and decoding the JSON body of a successful response
    pub async fn send<R: serde::de::DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<R, ApiError> {
        let response = self.authorize(request_builder).send().await?;

        if response.status().is_success() {
            Ok(response.json::<R>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    fn authorize(&self, request_builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(auth) => request_builder.basic_auth(auth.username(), Some(auth.password())),
            None => request_builder,
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
