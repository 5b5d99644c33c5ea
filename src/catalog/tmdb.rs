use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::config::TmdbConfig;

use super::{CatalogError, MovieCatalog, MoviePage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog client speaking the TMDB v3 HTTP API.
///
/// The bearer credential is baked into the client's default headers at
/// construction, so every request carries it.
#[derive(Debug, Clone)]
pub struct TmdbCatalog {
    http: Client,
    base_url: String,
}

impl TmdbCatalog {
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                .context("TMDB API token contains characters invalid in a header value")?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build catalog HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    async fn decode(response: Response) -> Result<MoviePage, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus { status });
        }
        Ok(response.json::<MoviePage>().await?)
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let response = self
            .http
            .get(format!("{}/search/movie", self.base_url))
            .query(&[("query", query), ("page", &page.to_string())])
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn popular_movies(&self, page: u32) -> Result<MoviePage, CatalogError> {
        let response = self
            .http
            .get(format!("{}/discover/movie", self.base_url))
            .query(&[("sort_by", "popularity.desc"), ("page", &page.to_string())])
            .send()
            .await?;

        Self::decode(response).await
    }
}
