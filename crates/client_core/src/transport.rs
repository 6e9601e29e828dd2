//! Remote data source used by [`crate::request::RequestController`].

use async_trait::async_trait;
use reqwest::{header, Client};
use shared::error::FetchError;
use url::Url;

use crate::config::ApiCredential;

#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Returns the raw body of a successful GET; decoding is left to the caller.
    async fn fetch(&self, resource: &Url) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    http: Client,
    credential: ApiCredential,
}

impl HttpFetcher {
    pub fn new(credential: ApiCredential) -> Self {
        Self::with_client(Client::new(), credential)
    }

    pub fn with_client(http: Client, credential: ApiCredential) -> Self {
        Self { http, credential }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, resource: &Url) -> Result<Vec<u8>, FetchError> {
        let res = self
            .http
            .get(resource.clone())
            .bearer_auth(self.credential.bearer_token())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = res
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(body.to_vec())
    }
}
