use serde::{Deserialize, Serialize};

use super::CatalogId;
use crate::error::{AppError, AppResult};

pub const MIN_SEEDS: usize = 1;
pub const MAX_SEEDS: usize = 5;

/// A movie the user picked as a taste signal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedMovie {
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
    /// Catalog id when the caller already knows it; resolved by title otherwise
    #[serde(default)]
    pub catalog_id: Option<CatalogId>,
}

impl SeedMovie {
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
            catalog_id: None,
        }
    }

    pub fn with_catalog_id(mut self, id: CatalogId) -> Self {
        self.catalog_id = Some(id);
        self
    }

    /// "Title (Year)", year omitted when unknown
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title.trim(), year),
            None => self.title.trim().to_string(),
        }
    }
}

/// Ordered, validated list of 1-5 seed movies for one request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct SeedSelection(Vec<SeedMovie>);

impl SeedSelection {
    pub fn new(seeds: Vec<SeedMovie>) -> AppResult<Self> {
        if seeds.len() < MIN_SEEDS || seeds.len() > MAX_SEEDS {
            return Err(AppError::InvalidInput(format!(
                "Select between {} and {} movies (got {})",
                MIN_SEEDS,
                MAX_SEEDS,
                seeds.len()
            )));
        }
        if seeds.iter().any(|seed| seed.title.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "Seed movie titles cannot be empty".to_string(),
            ));
        }
        Ok(Self(seeds))
    }

    pub fn movies(&self) -> &[SeedMovie] {
        &self.0
    }

    pub fn display_titles(&self) -> Vec<String> {
        self.0.iter().map(SeedMovie::display_title).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SeedSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seeds = Vec::<SeedMovie>::deserialize(deserializer)?;
        SeedSelection::new(seeds).map_err(serde::de::Error::custom)
    }
}
