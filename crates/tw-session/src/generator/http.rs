//! HTTP client for the story backend.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tw_core::{Character, Language, StoryPayload};

use super::{ContinueRequest, StoryCatalog, StoryGenerator};
use crate::config::ClientConfig;
use crate::error::{GeneratorError, GeneratorResult};

/// Talks to the story backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpStoryGenerator {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    #[serde(flatten)]
    character: &'a Character,
    language: &'a str,
}

impl HttpStoryGenerator {
    /// Build a client from `config`.
    pub fn new(config: &ClientConfig) -> GeneratorResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The backend this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> GeneratorResult<Url> {
        let invalid =
            || GeneratorError::Transport(format!("invalid base URL '{}'", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> GeneratorResult<T> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> GeneratorResult<T> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }
}

fn request_error(err: reqwest::Error) -> GeneratorError {
    if err.is_timeout() {
        GeneratorError::TimedOut(err.to_string())
    } else {
        GeneratorError::Transport(err.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> GeneratorResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GeneratorError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl StoryGenerator for HttpStoryGenerator {
    async fn start_story(
        &self,
        character: &Character,
        language: &str,
    ) -> GeneratorResult<StoryPayload> {
        let body = StartRequest {
            character,
            language,
        };
        self.post_json(&["start-story"], &body).await
    }

    async fn continue_story(&self, request: &ContinueRequest) -> GeneratorResult<StoryPayload> {
        self.post_json(&["continue-story"], request).await
    }
}

#[async_trait]
impl StoryCatalog for HttpStoryGenerator {
    async fn languages(&self) -> GeneratorResult<Vec<Language>> {
        self.get_json(&["languages"]).await
    }

    async fn characters(&self, language: &str) -> GeneratorResult<Vec<Character>> {
        self.get_json(&["characters", language]).await
    }
}
