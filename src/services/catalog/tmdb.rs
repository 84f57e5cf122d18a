/// TMDB catalog provider
///
/// Provides title search and the two similarity lists the fallback
/// recommender merges.
///
/// API Flow:
/// 1. Title Search: /search/movie?query=... → TMDB ids with rating/popularity
/// 2. Similarity: /movie/{id}/recommendations and /movie/{id}/similar
use crate::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogMovie, TmdbMoviePage},
    services::catalog::CatalogProvider,
};
use reqwest::Client as HttpClient;

const LANGUAGE: &str = "en-US";
const FIRST_PAGE: &str = "1";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the first page of a TMDB movie list endpoint
    async fn fetch_page(&self, path: &str, extra: &[(&str, &str)]) -> AppResult<Vec<CatalogMovie>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", LANGUAGE),
                ("page", FIRST_PAGE),
            ])
            .query(extra)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let page: TmdbMoviePage = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })?;

        Ok(page.results.into_iter().map(CatalogMovie::from).collect())
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let movies = self.fetch_page("/search/movie", &[("query", query)]).await?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(movies)
    }

    async fn recommendations(&self, id: CatalogId) -> AppResult<Vec<CatalogMovie>> {
        let movies = self
            .fetch_page(&format!("/movie/{}/recommendations", id), &[])
            .await?;

        tracing::info!(
            catalog_id = %id,
            results = movies.len(),
            provider = "tmdb",
            "Recommendations fetched"
        );

        Ok(movies)
    }

    async fn similar(&self, id: CatalogId) -> AppResult<Vec<CatalogMovie>> {
        let movies = self
            .fetch_page(&format!("/movie/{}/similar", id), &[])
            .await?;

        tracing::info!(
            catalog_id = %id,
            results = movies.len(),
            provider = "tmdb",
            "Similar movies fetched"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
