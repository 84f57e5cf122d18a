use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub mod preferences;
pub mod recommendation;
pub mod seed;

pub use preferences::{Band, PreferenceAxis, PreferenceSet, WeightedPreference, YearRange};
pub use recommendation::{
    RecommendationItem, RecommendationSource, Recommendations, RECOMMENDATION_COUNT,
};
pub use seed::{SeedMovie, SeedSelection};

/// Identifier of a movie in the catalog (TMDB movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque credential for the text-generation endpoint.
///
/// Debug output never contains the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

/// A movie record as returned by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMovie {
    pub id: CatalogId,
    pub title: String,
    pub year: Option<u16>,
    /// Average user rating (0-10)
    pub rating: f64,
    pub popularity: f64,
    pub synopsis: String,
}

impl CatalogMovie {
    /// "Title (Year)", year omitted when unknown
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of movie results from TMDB list endpoints
/// (search, recommendations, similar)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMoviePage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// Raw movie record from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
}

impl From<TmdbMovie> for CatalogMovie {
    fn from(movie: TmdbMovie) -> Self {
        // TMDB sends "" for unknown release dates
        let year = movie
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<u16>().ok());

        CatalogMovie {
            id: CatalogId(movie.id),
            title: movie.title.trim().to_string(),
            year,
            rating: movie.vote_average,
            popularity: movie.popularity,
            synopsis: movie.overview.unwrap_or_default(),
        }
    }
}
