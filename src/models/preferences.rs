use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Earliest release year a user can ask for
pub const EARLIEST_RELEASE_YEAR: u16 = 1950;

/// Latest release year a user can ask for (the current calendar year)
pub fn latest_release_year() -> u16 {
    u16::try_from(Utc::now().year()).unwrap_or(u16::MAX)
}

/// One of the five guidance bands a [0, 1] preference value falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    StrongLow,
    LeanLow,
    Balanced,
    LeanHigh,
    StrongHigh,
}

impl Band {
    /// Thresholds: [<0.40, 0.40-0.45), [0.45-0.55), [0.55-0.60), >=0.60
    pub fn from_value(value: f32) -> Self {
        if value < 0.40 {
            Band::StrongLow
        } else if value < 0.45 {
            Band::LeanLow
        } else if value < 0.55 {
            Band::Balanced
        } else if value < 0.60 {
            Band::LeanHigh
        } else {
            Band::StrongHigh
        }
    }
}

/// The weighted taste axes, in the order they appear in the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceAxis {
    /// blockbuster (0.0) to indie (1.0)
    ProductionStyle,
    /// cult (0.0) to mainstream (1.0)
    Popularity,
    /// light (0.0) to dark (1.0)
    Tone,
    /// domestic (0.0) to international (1.0)
    Geography,
    /// traditional (0.0) to experimental (1.0)
    NarrativeStyle,
}

impl PreferenceAxis {
    pub fn label(self) -> &'static str {
        match self {
            PreferenceAxis::ProductionStyle => "Production Style",
            PreferenceAxis::Popularity => "Popularity Level",
            PreferenceAxis::Tone => "Tone/Mood",
            PreferenceAxis::Geography => "Geographic Focus",
            PreferenceAxis::NarrativeStyle => "Storytelling Style",
        }
    }

    pub fn band_text(self, band: Band) -> &'static str {
        use Band::*;
        use PreferenceAxis::*;

        match (self, band) {
            (ProductionStyle, StrongLow) => "STRONGLY favor mainstream blockbusters, big-budget studio films, and widely distributed theatrical releases. Avoid indie films.",
            (ProductionStyle, LeanLow) => "Lean heavily towards blockbusters and popular studio films.",
            (ProductionStyle, Balanced) => "Balance between mainstream hits and indie films.",
            (ProductionStyle, LeanHigh) => "Lean towards indie films, art house cinema, and smaller productions.",
            (ProductionStyle, StrongHigh) => "STRONGLY favor indie films, art house cinema, hidden gems, and lesser-known titles. Avoid mainstream blockbusters.",

            (Popularity, StrongLow) => "STRONGLY emphasize cult classics, obscure gems, and lesser-known films with niche followings. Avoid widely popular films.",
            (Popularity, LeanLow) => "Favor cult classics and hidden gems over mainstream hits.",
            (Popularity, Balanced) => "Mix popular mainstream films with lesser-known quality titles.",
            (Popularity, LeanHigh) => "Favor well-known, widely recognized films.",
            (Popularity, StrongHigh) => "STRONGLY focus on blockbuster hits, universally known films, and mainstream favorites. Avoid obscure titles.",

            (Tone, StrongLow) => "STRONGLY favor uplifting, feel-good films with lighter themes, comedy, and positive outcomes. Avoid dark content.",
            (Tone, LeanLow) => "Lean towards lighter, more uplifting films.",
            (Tone, Balanced) => "Balance between light-hearted entertainment and serious dramatic fare.",
            (Tone, LeanHigh) => "Lean towards more serious, dramatic films.",
            (Tone, StrongHigh) => "STRONGLY favor dark, intense, thought-provoking films with serious themes and complex subject matter. Avoid lighthearted content.",

            (Geography, StrongLow) => "ONLY recommend American and English-language films. Completely avoid foreign language films.",
            (Geography, LeanLow) => "Primarily recommend American/English films with rare international exceptions.",
            (Geography, Balanced) => "Include both Hollywood productions and notable international films.",
            (Geography, LeanHigh) => "Favor international cinema with some Hollywood films.",
            (Geography, StrongHigh) => "STRONGLY prioritize international cinema, foreign language films, and world cinema from diverse countries. Minimize Hollywood films.",

            (NarrativeStyle, StrongLow) => "ONLY recommend traditional narrative structures with conventional filmmaking. Completely avoid experimental films.",
            (NarrativeStyle, LeanLow) => "Strongly favor traditional storytelling and conventional approaches.",
            (NarrativeStyle, Balanced) => "Mix traditional storytelling with some innovative and creative filmmaking.",
            (NarrativeStyle, LeanHigh) => "Favor creative, innovative films with unique approaches.",
            (NarrativeStyle, StrongHigh) => "STRONGLY prioritize avant-garde, unconventional films with experimental techniques and non-traditional storytelling. Avoid conventional narratives.",
        }
    }
}

/// A continuous preference value with its on/off toggle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightedPreference {
    pub value: f32,
    pub enabled: bool,
}

impl Default for WeightedPreference {
    fn default() -> Self {
        Self {
            value: 0.5,
            enabled: true,
        }
    }
}

impl WeightedPreference {
    pub fn new(value: f32, enabled: bool) -> Self {
        Self { value, enabled }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn band(&self) -> Band {
        Band::from_value(self.value)
    }
}

/// Closed release-year interval
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct YearRange {
    pub start: u16,
    pub end: u16,
    pub enabled: bool,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: EARLIEST_RELEASE_YEAR,
            end: latest_release_year(),
            enabled: true,
        }
    }
}

/// User taste settings applied to a single recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreferenceSet {
    pub production_style: WeightedPreference,
    pub popularity: WeightedPreference,
    pub tone: WeightedPreference,
    pub geography: WeightedPreference,
    pub narrative_style: WeightedPreference,
    pub release_years: YearRange,
}

impl PreferenceSet {
    /// Every axis switched off
    pub fn none() -> Self {
        Self {
            production_style: WeightedPreference::disabled(),
            popularity: WeightedPreference::disabled(),
            tone: WeightedPreference::disabled(),
            geography: WeightedPreference::disabled(),
            narrative_style: WeightedPreference::disabled(),
            release_years: YearRange {
                enabled: false,
                ..YearRange::default()
            },
        }
    }

    pub fn get(&self, axis: PreferenceAxis) -> &WeightedPreference {
        match axis {
            PreferenceAxis::ProductionStyle => &self.production_style,
            PreferenceAxis::Popularity => &self.popularity,
            PreferenceAxis::Tone => &self.tone,
            PreferenceAxis::Geography => &self.geography,
            PreferenceAxis::NarrativeStyle => &self.narrative_style,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        for axis in [
            PreferenceAxis::ProductionStyle,
            PreferenceAxis::Popularity,
            PreferenceAxis::Tone,
            PreferenceAxis::Geography,
            PreferenceAxis::NarrativeStyle,
        ] {
            let value = self.get(axis).value;
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::InvalidInput(format!(
                    "{} must be between 0.0 and 1.0 (got {})",
                    axis.label(),
                    value
                )));
            }
        }

        let range = &self.release_years;
        let latest = latest_release_year();
        if range.start > range.end {
            return Err(AppError::InvalidInput(format!(
                "Release year range start {} is after end {}",
                range.start, range.end
            )));
        }
        if range.start < EARLIEST_RELEASE_YEAR || range.end > latest {
            return Err(AppError::InvalidInput(format!(
                "Release years must be within {}-{}",
                EARLIEST_RELEASE_YEAR, latest
            )));
        }

        Ok(())
    }
}
