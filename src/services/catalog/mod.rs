use tracing::instrument;

/// Movie catalog abstraction
///
/// The catalog serves two purposes: title search (to resolve seed movies to
/// catalog ids) and similarity lookups (recommendations and similar items by
/// id) used by the fallback recommender.
use crate::{
    error::{AppError, AppResult},
    models::{CatalogId, CatalogMovie},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for movies by title
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>>;

    /// Movies the catalog recommends to viewers of `id`
    async fn recommendations(&self, id: CatalogId) -> AppResult<Vec<CatalogMovie>>;

    /// Movies the catalog considers similar to `id`
    async fn similar(&self, id: CatalogId) -> AppResult<Vec<CatalogMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Both similarity lists for one catalog id, concatenated
///
/// Fails only when both lookups fail; a single failed list is logged and
/// skipped.
#[instrument(skip(provider), fields(catalog = provider.name()))]
pub async fn related_movies(
    provider: &dyn CatalogProvider,
    id: CatalogId,
) -> AppResult<Vec<CatalogMovie>> {
    let (recommended, similar) = tokio::join!(provider.recommendations(id), provider.similar(id));

    match (recommended, similar) {
        (Ok(mut recommended), Ok(similar)) => {
            recommended.extend(similar);
            Ok(recommended)
        }
        (Ok(movies), Err(e)) | (Err(e), Ok(movies)) => {
            tracing::warn!(error = %e, catalog_id = %id, "Partial similarity lookup failure");
            Ok(movies)
        }
        (Err(first), Err(second)) => {
            tracing::error!(
                recommendations_error = %first,
                similar_error = %second,
                catalog_id = %id,
                "Similarity lookups failed"
            );
            Err(AppError::ExternalApi(format!(
                "Failed to fetch related movies for {}: {}",
                id, first
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64) -> CatalogMovie {
        CatalogMovie {
            id: CatalogId(id),
            title: format!("Movie {}", id),
            year: Some(2000),
            rating: 7.0,
            popularity: 10.0,
            synopsis: String::new(),
        }
    }

    #[tokio::test]
    async fn test_related_movies_concatenates_in_order() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_recommendations()
            .returning(|_| Ok(vec![movie(1), movie(2)]));
        provider
            .expect_similar()
            .returning(|_| Ok(vec![movie(3)]));
        provider.expect_name().return_const("mock");

        let movies = related_movies(&provider, CatalogId(603)).await.unwrap();
        let ids: Vec<u64> = movies.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_related_movies_tolerates_one_failure() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_recommendations()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));
        provider
            .expect_similar()
            .returning(|_| Ok(vec![movie(3)]));
        provider.expect_name().return_const("mock");

        let movies = related_movies(&provider, CatalogId(603)).await.unwrap();
        assert_eq!(movies.len(), 1);
    }

    #[tokio::test]
    async fn test_related_movies_fails_when_both_fail() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_recommendations()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));
        provider
            .expect_similar()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));
        provider.expect_name().return_const("mock");

        let result = related_movies(&provider, CatalogId(603)).await;
        tokio_test::assert_err!(result);
    }
}
