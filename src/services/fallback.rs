/// Algorithmic recommender used when generation cannot be trusted
///
/// For each seed: resolve it to a catalog id, then fetch the catalog's
/// recommendation and similar-item lists. Seeds are queried in parallel and
/// merged in seed order, so the result does not depend on which lookup
/// finishes first.
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogId, CatalogMovie, RecommendationSource, Recommendations, SeedMovie, SeedSelection,
        RECOMMENDATION_COUNT,
    },
    services::{
        catalog::{related_movies, CatalogProvider},
        parser::{normalize_title, truncate_words, MAX_DESCRIPTION_WORDS},
        title_search::resolve_seed,
    },
};

/// Substituted when a candidate has no synopsis
pub const FALLBACK_DESCRIPTION: &str = "A strong match based on your selections.";

/// Result of looking up one seed
enum SeedLookup {
    /// The catalog has no record for the seed
    NotFound,
    /// Seed search failed outright
    SearchFailed(AppError),
    Resolved {
        id: CatalogId,
        related: AppResult<Vec<CatalogMovie>>,
    },
}

pub struct FallbackRecommender {
    catalog: Arc<dyn CatalogProvider>,
}

impl FallbackRecommender {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    async fn lookup_seed(catalog: Arc<dyn CatalogProvider>, seed: SeedMovie) -> SeedLookup {
        match resolve_seed(catalog.as_ref(), &seed).await {
            Ok(Some(resolved)) => SeedLookup::Resolved {
                id: resolved.id,
                related: related_movies(catalog.as_ref(), resolved.id).await,
            },
            Ok(None) => SeedLookup::NotFound,
            Err(e) => SeedLookup::SearchFailed(e),
        }
    }

    /// Builds up to 15 recommendations from catalog similarity data
    ///
    /// Fewer than 15 is not an error. An empty pool is
    /// [`AppError::EmptyFallback`]; if every seed that was looked up failed,
    /// the first lookup error is returned instead.
    pub async fn recommend(&self, seeds: &SeedSelection) -> AppResult<Recommendations> {
        let mut tasks = Vec::with_capacity(seeds.len());
        for seed in seeds.movies() {
            let catalog = self.catalog.clone();
            let seed = seed.clone();
            tasks.push(tokio::spawn(Self::lookup_seed(catalog, seed)));
        }

        let mut seed_ids = HashSet::new();
        let mut batches = Vec::new();
        let mut errors = Vec::new();
        // Seeds that reached the catalog, found or not
        let mut attempted = 0;

        // Awaited in seed order regardless of completion order
        for task in tasks {
            let lookup = task.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Task join error");
                SeedLookup::SearchFailed(AppError::Internal(e.to_string()))
            });

            match lookup {
                SeedLookup::NotFound => {}
                SeedLookup::SearchFailed(e) => {
                    attempted += 1;
                    tracing::error!(error = %e, "Seed search failed");
                    errors.push(e);
                }
                SeedLookup::Resolved { id, related } => {
                    attempted += 1;
                    seed_ids.insert(id);
                    match related {
                        Ok(movies) => batches.push(movies),
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                catalog_id = %id,
                                "Related movie lookup failed for seed"
                            );
                            errors.push(e);
                        }
                    }
                }
            }
        }

        let seed_titles: HashSet<String> = seeds
            .display_titles()
            .iter()
            .map(|title| normalize_title(title))
            .collect();
        let ranked = rank_candidates(batches, &seed_ids, &seed_titles);

        if !errors.is_empty() {
            tracing::warn!(
                error_count = errors.len(),
                candidates = ranked.len(),
                "Partial fallback lookup failure"
            );
        }

        if ranked.is_empty() {
            if !errors.is_empty() && errors.len() == attempted {
                return Err(errors.remove(0));
            }
            return Err(AppError::EmptyFallback);
        }

        tracing::info!(
            recommendations = ranked.len(),
            provider = self.catalog.name(),
            "Fallback recommendations built"
        );

        Ok(to_recommendations(ranked))
    }
}

/// Merges candidate batches into the final ranked pool
///
/// Deduplicates by catalog id (first occurrence wins), drops seeds by id or
/// normalized title, sorts by rating then popularity (both descending, stable)
/// and keeps the top 15.
pub fn rank_candidates(
    batches: Vec<Vec<CatalogMovie>>,
    seed_ids: &HashSet<CatalogId>,
    seed_titles: &HashSet<String>,
) -> Vec<CatalogMovie> {
    let mut seen = HashSet::new();
    let mut pool: Vec<CatalogMovie> = batches
        .into_iter()
        .flatten()
        .filter(|movie| seen.insert(movie.id))
        .filter(|movie| !seed_ids.contains(&movie.id))
        .filter(|movie| !seed_titles.contains(&normalize_title(&movie.display_title())))
        .collect();

    pool.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| b.popularity.total_cmp(&a.popularity))
    });
    pool.truncate(RECOMMENDATION_COUNT);
    pool
}

fn to_recommendations(movies: Vec<CatalogMovie>) -> Recommendations {
    let entries = movies
        .into_iter()
        .map(|movie| {
            let synopsis = movie.synopsis.trim();
            let description = if synopsis.is_empty() {
                FALLBACK_DESCRIPTION.to_string()
            } else {
                truncate_words(synopsis, MAX_DESCRIPTION_WORDS)
            };
            (movie.title, movie.year, description)
        })
        .collect();

    Recommendations::ranked(RecommendationSource::Fallback, None, entries)
}
