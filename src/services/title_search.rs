use crate::{
    error::AppResult,
    models::{CatalogMovie, SeedMovie},
    services::catalog::CatalogProvider,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static YEAR_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{4}\)").expect("valid regex"));

/// Subtitle separators; text before the first one is tried as a shorter query
const SUBTITLE_DELIMITERS: [&str; 4] = [":", " - ", " – ", " — "];

/// Service function for title search
///
/// Delegates to the configured CatalogProvider, maintaining a clean separation
/// between HTTP routing and business logic.
pub async fn search_titles(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
) -> AppResult<Vec<CatalogMovie>> {
    provider.search_movies(query).await
}

/// Search queries to try for a title, most specific first:
/// the title as given, without "(YYYY)", and the part before a subtitle.
pub fn query_candidates(title: &str) -> Vec<String> {
    let as_given = title.trim().to_string();
    let without_year = YEAR_IN_PARENS.replace_all(&as_given, "").trim().to_string();

    let mut candidates = vec![as_given, without_year.clone()];
    candidates.extend(
        SUBTITLE_DELIMITERS
            .iter()
            .filter_map(|delimiter| without_year.split_once(delimiter))
            .map(|(head, _)| head.trim().to_string()),
    );

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

/// Finds the catalog record for a seed movie
///
/// A seed that already carries a catalog id is returned as-is without a
/// lookup. Otherwise the first query candidate with any results wins; within
/// it the first record whose year matches the seed's year is preferred.
/// A failed search moves on to the next candidate. `Ok(None)` means the
/// catalog answered but had no match; if every search failed the last
/// search error is returned.
pub async fn resolve_seed(
    provider: &dyn CatalogProvider,
    seed: &SeedMovie,
) -> AppResult<Option<CatalogMovie>> {
    if let Some(id) = seed.catalog_id {
        return Ok(Some(CatalogMovie {
            id,
            title: seed.title.clone(),
            year: seed.year,
            rating: 0.0,
            popularity: 0.0,
            synopsis: String::new(),
        }));
    }

    let mut last_error = None;
    let mut answered = false;

    for query in query_candidates(&seed.title) {
        let results = match provider.search_movies(&query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Seed search failed");
                last_error = Some(e);
                continue;
            }
        };
        answered = true;
        if results.is_empty() {
            continue;
        }

        let year_match = seed
            .year
            .and_then(|year| results.iter().position(|movie| movie.year == Some(year)));
        let best = results.into_iter().nth(year_match.unwrap_or(0));

        if let Some(movie) = &best {
            tracing::debug!(
                seed = %seed.title,
                catalog_id = %movie.id,
                matched = %movie.display_title(),
                "Resolved seed movie"
            );
        }
        return Ok(best);
    }

    match last_error {
        Some(e) if !answered => Err(e),
        _ => {
            tracing::warn!(seed = %seed.title, "Seed movie not found in catalog");
            Ok(None)
        }
    }
}
