use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        CatalogMovie, PreferenceSet, RecommendationItem, RecommendationSource, Recommendations,
        SeedMovie, SeedSelection,
    },
    services::title_search,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub seeds: Vec<SeedMovie>,
    pub genre: String,
    /// Omitted preferences mean every axis enabled at its default
    #[serde(default)]
    pub preferences: PreferenceSet,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    pub analysis: Option<String>,
    pub items: Vec<RecommendationItem>,
    /// The list rendered as numbered plain text
    pub text: String,
}

impl From<Recommendations> for RecommendationResponse {
    fn from(recommendations: Recommendations) -> Self {
        let text = recommendations.render();
        Self {
            source: recommendations.source,
            analysis: recommendations.analysis,
            items: recommendations.items,
            text,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Catalog title search, used to build seed selections
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogMovie>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Search query must not be empty".to_string()));
    }

    let titles = title_search::search_titles(state.catalog.clone(), query).await?;
    Ok(Json(titles))
}

/// Generates 15 recommendations for the submitted seed selection
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let seeds = SeedSelection::new(request.seeds)?;
    let genre = request.genre.trim();
    if genre.is_empty() {
        return Err(AppError::InvalidInput("Genre must not be empty".to_string()));
    }
    request.preferences.validate()?;

    tracing::info!(
        request_id = %request_id,
        seed_count = seeds.len(),
        genre = %genre,
        "Processing recommendation request"
    );

    let recommendations = state
        .recommender
        .get_recommendations(&seeds, genre, &request.preferences, state.credential.as_ref())
        .await?;

    tracing::info!(
        request_id = %request_id,
        source = ?recommendations.source,
        "Recommendation request completed"
    );

    Ok(Json(recommendations.into()))
}
