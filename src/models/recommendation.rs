use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Number of recommendations a generated reply must contain
pub const RECOMMENDATION_COUNT: usize = 15;

/// Where a recommendation list came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Parsed and validated text-generation reply
    Llm,
    /// Catalog similarity fallback
    Fallback,
}

/// One numbered entry of a recommendation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    /// 1-based position in the list
    pub rank: usize,
    pub title: String,
    pub year: Option<u16>,
    pub description: String,
}

impl RecommendationItem {
    /// "Title (Year)", year omitted when unknown
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// A successful recommendation result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    pub source: RecommendationSource,
    /// Short taste analysis (at most two sentences), only from generated replies
    pub analysis: Option<String>,
    pub items: Vec<RecommendationItem>,
}

impl Recommendations {
    /// Builds a list ranked 1..n in the given order
    pub fn ranked(
        source: RecommendationSource,
        analysis: Option<String>,
        entries: Vec<(String, Option<u16>, String)>,
    ) -> Self {
        let items = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (title, year, description))| RecommendationItem {
                rank: idx + 1,
                title,
                year,
                description,
            })
            .collect();

        Self {
            source,
            analysis: analysis.filter(|a| !a.trim().is_empty()),
            items,
        }
    }

    /// Renders the list in the numbered plain-text layout shown to users:
    ///
    /// ```text
    /// Analysis:
    /// <analysis>
    ///
    /// RECOMMENDATIONS:
    ///
    /// 1. Title (Year)
    /// Description
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(analysis) = &self.analysis {
            let _ = write!(out, "Analysis:\n{}\n\n", analysis);
        }

        out.push_str("RECOMMENDATIONS:\n\n");
        for item in &self.items {
            let _ = write!(
                out,
                "{}. {}\n{}\n\n",
                item.rank,
                item.display_title(),
                item.description
            );
        }

        out.trim().to_string()
    }
}
