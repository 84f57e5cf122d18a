/// Prompt construction for the recommendation request
///
/// Pure function of the seed selection, the genre label and the preference
/// set. Disabled axes contribute nothing to the prompt text.
use crate::models::{PreferenceAxis, PreferenceSet, SeedSelection, RECOMMENDATION_COUNT};

/// System role sent with every generation request
pub const SYSTEM_INSTRUCTION: &str = "You are a movie recommendation expert. Respond with plain text only, no markdown, no code blocks, no JSON formatting. Write naturally like you're talking to a friend.";

const WEIGHTED_AXES_BEFORE_YEARS: [PreferenceAxis; 2] =
    [PreferenceAxis::ProductionStyle, PreferenceAxis::Popularity];
const WEIGHTED_AXES_AFTER_YEARS: [PreferenceAxis; 3] = [
    PreferenceAxis::Tone,
    PreferenceAxis::Geography,
    PreferenceAxis::NarrativeStyle,
];

/// One guidance line per enabled axis, in prompt order
pub fn preference_lines(preferences: &PreferenceSet) -> Vec<String> {
    let weighted_line = |axis: PreferenceAxis| {
        let pref = preferences.get(axis);
        pref.enabled
            .then(|| format!("{}: {}", axis.label(), axis.band_text(pref.band())))
    };

    let mut lines: Vec<String> = WEIGHTED_AXES_BEFORE_YEARS
        .into_iter()
        .filter_map(weighted_line)
        .collect();

    let years = &preferences.release_years;
    if years.enabled {
        lines.push(format!(
            "Release Year: Only recommend films released between {} and {}.",
            years.start, years.end
        ));
    }

    lines.extend(WEIGHTED_AXES_AFTER_YEARS.into_iter().filter_map(weighted_line));
    lines
}

fn preferences_section(preferences: &PreferenceSet) -> String {
    let lines = preference_lines(preferences);
    if lines.is_empty() {
        return String::new();
    }

    let bullets = lines
        .iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n\nUSER PREFERENCES (STRICTLY FOLLOW THESE):\n{}\n\nIMPORTANT: These preferences are CRITICAL. Every recommendation MUST align with these settings. Do NOT suggest films that contradict these preferences.",
        bullets
    )
}

/// Builds the user prompt asking for exactly 15 recommendations
pub fn build_prompt(seeds: &SeedSelection, genre: &str, preferences: &PreferenceSet) -> String {
    let seed_list = seeds
        .display_titles()
        .iter()
        .enumerate()
        .map(|(idx, title)| format!("{}. {}", idx + 1, title))
        .collect::<Vec<_>>()
        .join("\n");

    let n = RECOMMENDATION_COUNT;

    format!(
        r#"You are a passionate movie expert and critic. The user is exploring the {genre} genre and has selected these movies they enjoyed:

{seed_list}

Based on these selections, recommend exactly {n} movies that match their taste and preferences.{preferences}

FORMAT YOUR RESPONSE EXACTLY LIKE THIS:

[Brief 2-3 sentence analysis of their taste]

RECOMMENDATIONS:

1. Movie Title (Year)
One or two concise sentences describing why this fits their taste.

2. Another Movie Title (Year)
One or two concise sentences about why this matches.

[Continue for all {n} movies]

CRITICAL FORMATTING RULES - FOLLOW EXACTLY:
- Recommend EXACTLY {n} movies, no more, no less
- NUMBERING FORMAT: Use "1. " (number, period, ONE space) - NO colons, NO extra spaces, NO missing spaces
- Title format: "Movie Title (Year)" with 4-digit year in parentheses
- Each movie title MUST be on its OWN LINE
- Description goes on the NEXT LINE after the title
- Keep descriptions to 1-3 sentences MAXIMUM (<= 75 words)

STRICT NUMBERING EXAMPLES (COPY THIS EXACTLY):
1. Movie Title (1994)
2. Another Movie (2001)
3. Third Movie (1987)

NOT LIKE THIS (WRONG):
1: Movie Title (wrong - colon)
1 . Movie (wrong - space before period)
1.Movie (wrong - no space after period)

ADDITIONAL RULES:
- Do NOT combine title and description on same line
- Do NOT repeat any movie title in the list
- Do NOT include any of the user's selected films
- Do NOT ask follow-up questions or add extra text after item {n}
- STRICTLY respect the active preferences"#,
        genre = genre.trim(),
        seed_list = seed_list,
        n = n,
        preferences = preferences_section(preferences),
    )
}
