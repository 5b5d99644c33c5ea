use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod tmdb;

pub use tmdb::TmdbCatalog;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Read-only projection of a catalog movie. The catalog owns these records;
/// nothing here mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "snake_case", serialize = "camelCase"))]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl Movie {
    /// Full poster URL for this movie, if the catalog provided a poster path.
    pub fn poster_url(&self, size: PosterSize) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{}/{}{}", TMDB_IMAGE_BASE, size.as_str(), path))
    }
}

/// One page of catalog results as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    pub results: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum PosterSize {
    W185,
    W342,
    W500,
    Original,
}

impl PosterSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosterSize::W185 => "w185",
            PosterSize::W342 => "w342",
            PosterSize::W500 => "w500",
            PosterSize::Original => "original",
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network failure, timeout, or an undecodable body.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog answered with a non-2xx status.
    #[error("catalog responded with status {status}")]
    UnexpectedStatus { status: StatusCode },
}

/// Port to the external movie catalog.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one page of results for a text query.
    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;

    /// Fetch one page of the popularity-ranked discover feed.
    async fn popular_movies(&self, page: u32) -> Result<MoviePage, CatalogError>;
}
