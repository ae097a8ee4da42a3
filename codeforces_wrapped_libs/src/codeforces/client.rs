use crate::{
    cache::{CacheKey, ResponseCache},
    codeforces::model::*,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodeforcesError>;

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("failed to request to Codeforces API")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid Codeforces API url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{method} failed cause [{comment}]")]
    ApiFailure { method: String, comment: String },
    #[error("{0} returned no result")]
    EmptyResult(String),
    #[error("reference user {0} has no rating")]
    MissingReferenceRating(String),
    #[error("{0}")]
    UnexpectedError(String),
}

/// The three read-only methods of the Codeforces API the wrapped statistics need.
#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    async fn user_info(&self, handle: &str) -> Result<CodeforcesUser>;
    async fn user_status(&self, handle: &str) -> Result<Vec<CodeforcesSubmission>>;
    async fn user_rating(&self, handle: &str) -> Result<Vec<CodeforcesRatingChange>>;
}

pub struct CodeforcesClient {
    user_info_url: Url,
    user_status_url: Url,
    user_rating_url: Url,
    client: Client,
    cache: Arc<ResponseCache>,
}

impl CodeforcesClient {
    pub fn new(api_url: &str, cache: Arc<ResponseCache>) -> Result<Self> {
        let mut base_url = Url::parse(api_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let user_info_url = base_url.join("user.info")?;
        let user_status_url = base_url.join("user.status")?;
        let user_rating_url = base_url.join("user.rating")?;

        let client = Client::builder().gzip(true).build()?;
        Ok(CodeforcesClient {
            user_info_url,
            user_status_url,
            user_rating_url,
            client,
            cache,
        })
    }

    /// Call an API method, going through the response cache.
    ///
    /// Only `OK` envelopes are cached.
    async fn call<T>(&self, url: &Url, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let key = CacheKey::new(url.as_str(), params);
        let (payload, cached) = match self.cache.get(&key).await {
            Some(payload) => {
                tracing::debug!("cache hit for {} {:?}", url, params);
                (payload, true)
            }
            None => {
                let res = self.client.get(url.clone()).query(params).send().await?;
                let status = res.status();
                let body = res.text().await?;
                let payload: Value = serde_json::from_str(&body).map_err(|e| {
                    tracing::error!(
                        "non-JSON response returned from {} with status {}: {:?}",
                        url,
                        status,
                        e
                    );
                    e
                })?;
                (payload, false)
            }
        };

        let response: CodeforcesResponse<T> = serde_json::from_value(payload.clone())?;
        if !response.is_ok() {
            let comment = response.comment.unwrap_or_default();
            tracing::error!("{} returned {} cause [{}]", url, response.status, comment);
            return Err(CodeforcesError::ApiFailure {
                method: method_name(url),
                comment,
            });
        }

        let result = response
            .result
            .ok_or_else(|| CodeforcesError::EmptyResult(method_name(url)))?;
        if !cached {
            self.cache.insert(key, payload).await;
        }

        Ok(result)
    }
}

fn method_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .map(String::from)
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn user_info(&self, handle: &str) -> Result<CodeforcesUser> {
        let users: Vec<CodeforcesUser> = self
            .call(&self.user_info_url, &[("handles", handle)])
            .await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| CodeforcesError::EmptyResult(String::from("user.info")))
    }

    async fn user_status(&self, handle: &str) -> Result<Vec<CodeforcesSubmission>> {
        self.call(&self.user_status_url, &[("handle", handle)])
            .await
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<CodeforcesRatingChange>> {
        self.call(&self.user_rating_url, &[("handle", handle)])
            .await
    }
}
