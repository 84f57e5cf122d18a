/// Parsing and validation of free-text recommendation replies
///
/// The generator drifts from the requested layout, so entry detection is one
/// tolerant pattern ("1.", "1 .", "1.Title", leading whitespace) followed by
/// strict content checks. A reply is accepted only when 15 distinct,
/// well-formed, non-seed entries can be extracted; partial results are never
/// returned.
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::{
    error::{AppError, AppResult},
    models::{RecommendationSource, Recommendations, SeedSelection, RECOMMENDATION_COUNT},
};

/// Maximum words kept in a description
pub const MAX_DESCRIPTION_WORDS: usize = 75;
/// Maximum sentences kept in the leading analysis
pub const MAX_ANALYSIS_SENTENCES: usize = 2;
/// Substituted when an entry has no description line
pub const DEFAULT_DESCRIPTION: &str = "A strong match for your taste.";

/// One or two digits, optional whitespace, a mandatory period, optional whitespace
static NUMBERED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})\s*\.\s*").expect("valid regex"));
static YEAR_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("valid regex"));
static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}\s*$").expect("valid regex"));
static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(the|a|an)\s+").expect("valid regex"));
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Heading lines the layout itself uses; never part of the analysis
const HEADINGS: [&str; 2] = ["analysis:", "recommendations:"];

/// Numeric label of a numbered entry line, if the line is one
fn entry_label(line: &str) -> Option<u32> {
    NUMBERED_ENTRY
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|label| label.as_str().parse().ok())
}

fn is_numbered_entry(line: &str) -> bool {
    NUMBERED_ENTRY.is_match(line)
}

/// Reduces a title to the form used for duplicate detection: lowercase, no
/// "(YYYY)" annotation, no single leading article, alphanumerics only.
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let without_year = YEAR_IN_PARENS.replace_all(&lower, "");
    let trimmed = without_year.trim();
    let without_article = LEADING_ARTICLE.replace(trimmed, "");
    NON_ALPHANUMERIC
        .replace_all(&without_article, "")
        .into_owned()
}

/// Keeps at most `max` sentences. A sentence ends at '.', '!' or '?'
/// followed by whitespace.
pub fn limit_sentences(text: &str, max: usize) -> String {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let at_boundary = matches!(ch, '.' | '!' | '?')
            && chars.peek().is_some_and(|(_, next)| next.is_whitespace());
        if at_boundary {
            let end = idx + ch.len_utf8();
            sentences.push(&text[start..end]);
            while chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                chars.next();
            }
            start = chars.peek().map_or(text.len(), |(next_idx, _)| *next_idx);
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps at most `max` words, appending "…" when anything was cut.
/// Whitespace runs (line breaks included) collapse to single spaces.
pub fn truncate_words(text: &str, max: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max {
        words.join(" ")
    } else {
        format!("{}…", words[..max].join(" "))
    }
}

/// A title line is usable if it carries a year or is at least 3 characters
fn looks_like_title(title: &str) -> bool {
    YEAR_IN_PARENS.is_match(title)
        || TRAILING_YEAR.is_match(title)
        || title.chars().count() >= 3
}

/// Splits "Title (YYYY)" into the bare title and its year.
/// Titles without a parenthesized year are returned unchanged.
fn split_title_year(raw: &str) -> (String, Option<u16>) {
    let Some(caps) = YEAR_IN_PARENS.captures(raw) else {
        return (raw.to_string(), None);
    };
    let year = caps.get(1).and_then(|y| y.as_str().parse::<u16>().ok());
    let stripped = YEAR_IN_PARENS.replacen(raw, 1, "");
    let title = WHITESPACE_RUN.replace_all(stripped.trim(), " ").into_owned();

    if title.is_empty() {
        (raw.to_string(), None)
    } else {
        (title, year)
    }
}

fn extract_analysis(leading: &[&str]) -> Option<String> {
    let text = leading
        .iter()
        .map(|line| line.trim())
        .filter(|line| !HEADINGS.contains(&line.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    let analysis = limit_sentences(&text, MAX_ANALYSIS_SENTENCES);
    (!analysis.is_empty()).then_some(analysis)
}

/// Sequential extraction of a generated reply (analysis + 15 entries).
///
/// Entries whose normalized title repeats an earlier entry or matches a seed
/// are skipped without counting, and scanning continues for replacements.
/// Fewer than 15 accepted entries is a [`AppError::StructuralValidation`].
pub fn parse_reply(raw: &str, seeds: &SeedSelection) -> AppResult<Recommendations> {
    let lines: Vec<&str> = raw.lines().collect();

    let first_entry = lines
        .iter()
        .position(|line| is_numbered_entry(line))
        .ok_or_else(|| {
            AppError::StructuralValidation("reply contains no numbered entries".to_string())
        })?;

    let analysis = extract_analysis(&lines[..first_entry]);

    let seed_titles: HashSet<String> = seeds
        .display_titles()
        .iter()
        .map(|title| normalize_title(title))
        .collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(RECOMMENDATION_COUNT);

    let mut i = first_entry;
    while i < lines.len() && entries.len() < RECOMMENDATION_COUNT {
        let line = lines[i].trim();
        let Some(prefix) = NUMBERED_ENTRY.find(line) else {
            i += 1;
            continue;
        };

        let raw_title = line[prefix.end()..].trim();
        if !looks_like_title(raw_title) {
            tracing::debug!(line = %line, "Skipping malformed entry");
            i += 1;
            continue;
        }

        let normalized = normalize_title(raw_title);
        if seen.contains(&normalized) {
            tracing::debug!(title = %raw_title, "Skipping duplicate entry");
            i += 1;
            continue;
        }
        if seed_titles.contains(&normalized) {
            tracing::debug!(title = %raw_title, "Skipping seed title");
            i += 1;
            continue;
        }

        // Description is the next non-blank line, unless another entry comes first
        let mut j = i + 1;
        let mut description = None;
        while j < lines.len() {
            let candidate = lines[j].trim();
            if candidate.is_empty() {
                j += 1;
                continue;
            }
            if !is_numbered_entry(candidate) {
                description = Some(candidate);
            }
            break;
        }

        let next = if description.is_some() { j + 1 } else { j };
        let description = truncate_words(
            description.unwrap_or(DEFAULT_DESCRIPTION),
            MAX_DESCRIPTION_WORDS,
        );
        let (title, year) = split_title_year(raw_title);

        seen.insert(normalized);
        entries.push((title, year, description));
        i = next;
    }

    if entries.len() < RECOMMENDATION_COUNT {
        return Err(AppError::StructuralValidation(format!(
            "found {} of {} usable entries",
            entries.len(),
            RECOMMENDATION_COUNT
        )));
    }

    Ok(Recommendations::ranked(
        RecommendationSource::Llm,
        analysis,
        entries,
    ))
}

/// Order-insensitive sanity check: every label 1..=15 appears on some
/// numbered line of the reply.
pub fn numbering_is_complete(raw: &str) -> bool {
    let labels: HashSet<u32> = raw.lines().filter_map(entry_label).collect();
    (1..=RECOMMENDATION_COUNT as u32).all(|label| labels.contains(&label))
}
