//! Candidate filtering: junk rejection and episode matching.
//!
//! Both predicates run before any detail page is fetched, so every
//! candidate rejected here saves a network round trip.

use crate::resolver::types::{Candidate, EpisodeRef};
use crate::resolver::verify::{self, fold_lower, normalize_title};
use regex_lite::Regex;

/// Marker sets for promotional rows and non-content uploads, matched
/// against the normalized title. A title is junk when every substring
/// in any one set appears.
const JUNK_MARKER_SETS: &[&[&str]] = &[
    // Index UI chrome that leaks into scraped listings.
    &["nahla", "video"],
    &["stah", "soubor"],
    &["vyzkousejte", "prehravac"],
    &["aplikaci", "prehraj"],
    &["google", "play"],
    &["video stopped"],
    // Non-content uploads.
    &["trailer"],
    &["teaser"],
    &["sample"],
    &["camrip"],
    &["telesync"],
];

/// Returns true for promotional rows and uploads that are not the
/// actual content (trailers, samples, cam rips).
pub fn is_junk_release(raw_title: &str) -> bool {
    let normalized = normalize_title(raw_title);
    JUNK_MARKER_SETS
        .iter()
        .any(|set| set.iter().all(|marker| normalized.contains(marker)))
}

/// Compiled episode predicates for one requested season/episode pair.
///
/// Strict patterns ("S02E05", "2x05", "season 2 ... episode 5") are
/// decisive on their own. When none hits, a season word plus an episode
/// word for the requested numbers ("2. série" + "5. díl" styles) still
/// counts as a match. Every number is guarded on its digit boundaries,
/// so episode 5 never matches episode 15 or 51.
pub struct EpisodeMatcher {
    strict: Vec<Regex>,
    season_word: Regex,
    episode_word: Regex,
}

impl EpisodeMatcher {
    pub fn new(episode: EpisodeRef) -> Self {
        let s = episode.season;
        let e = episode.episode;
        let strict = vec![
            // S02E05, s2 e5, s02.e05
            compiled(format!(
                r"s\s*0?{s}\s*[\._\-\s]*e\s*0?{e}(?:[^0-9]|$)"
            )),
            // 2x05, 02×5
            compiled(format!(
                r"(?:^|[^0-9])0?{s}\s*[x×]\s*0?{e}(?:[^0-9]|$)"
            )),
            // season 2 ... episode 5
            compiled(format!(
                r"season\s*0?{s}(?:[^0-9].*)?episode\s*0?{e}(?:[^0-9]|$)"
            )),
        ];
        // Word lists are matched on diacritic-folded text, so "série",
        // "sezóna" and "díl" are covered by their plain spellings.
        let season_word = compiled(format!(
            r"s(?:eason)?\s*0?{s}(?:[^0-9]|$)|\b0?{s}\b\.?\s*(?:serie|seria|sezona|sezon)"
        ));
        let episode_word = compiled(format!(
            r"(?:e(?:pisode)?|ep\.?|dil)\s*0?{e}(?:[^0-9]|$)|\b0?{e}\b\.?\s*dil"
        ));
        Self {
            strict,
            season_word,
            episode_word,
        }
    }

    /// Tests a title or detail URL path against the predicates.
    pub fn matches(&self, text: &str) -> bool {
        let text = fold_lower(text);
        if self.strict.iter().any(|re| re.is_match(&text)) {
            return true;
        }
        self.season_word.is_match(&text) && self.episode_word.is_match(&text)
    }
}

fn compiled(pattern: String) -> Regex {
    Regex::new(&pattern).expect("Failed to compile episode pattern")
}

/// Result of filtering a candidate pool.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Junk-free candidates that passed the episode predicate (when one
    /// applies) and the identity check, in pool order.
    pub eligible: Vec<Candidate>,
    /// Junk-free candidates that only failed the episode predicate.
    /// Kept aside for the fallback pass; not yet identity-checked.
    pub deferred: Vec<Candidate>,
}

/// Splits a candidate pool into extractable and deferred sets.
///
/// Junk is dropped outright. With an episode matcher present, a
/// candidate whose title and detail URL both miss the predicates goes
/// to the deferred set instead of being discarded. Survivors must then
/// pass the identity check against the wanted names.
pub fn partition_candidates(
    candidates: Vec<Candidate>,
    wanted_names: &[String],
    matcher: Option<&EpisodeMatcher>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for candidate in candidates {
        if is_junk_release(&candidate.raw_title) {
            continue;
        }
        if let Some(matcher) = matcher {
            if !matcher.matches(&candidate.raw_title) && !matcher.matches(&candidate.detail_url) {
                outcome.deferred.push(candidate);
                continue;
            }
        }
        if verify::title_matches(&candidate.normalized_title, wanted_names) {
            outcome.eligible.push(candidate);
        }
    }
    outcome
}
