//! Search query generation.
//!
//! Turns a [`MediaRequest`] into index search queries ordered from most
//! to least specific. Specific queries hit precise release names first;
//! the bare title at the end catches loosely tagged uploads.

use crate::resolver::types::{MediaRequest, MediaType};
use std::collections::HashSet;

/// Builds the query list for one resolution.
///
/// For every requested name (primary title first, then alternates):
/// - series get "<name> SxxEyy" and "<name> <s>x<ee>",
/// - movies with a known year get "<name> <year>",
/// - the bare name always comes last.
///
/// Duplicates are removed case-insensitively, keeping the first
/// occurrence, so the overall order stays most-specific-first.
pub fn build_queries(request: &MediaRequest) -> Vec<String> {
    let mut queries = Vec::new();

    for name in requested_names(request) {
        if let Some(ep) = request.episode {
            queries.push(format!("{} {}", name, ep.sxxeyy()));
            queries.push(format!("{} {}", name, ep.sxe()));
        }
        if request.media_type == MediaType::Movie {
            if let Some(year) = request.year {
                queries.push(format!("{} {}", name, year));
            }
        }
        queries.push(name.to_string());
    }

    dedup_case_insensitive(queries)
}

fn requested_names(request: &MediaRequest) -> Vec<&str> {
    let mut names = Vec::with_capacity(1 + request.alternate_titles.len());
    if !request.title.trim().is_empty() {
        names.push(request.title.trim());
    }
    for alt in &request.alternate_titles {
        let alt = alt.trim();
        if !alt.is_empty() {
            names.push(alt);
        }
    }
    names
}

fn dedup_case_insensitive(queries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(q.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::types::EpisodeRef;

    fn make_movie(title: &str, year: Option<u16>) -> MediaRequest {
        MediaRequest {
            media_type: MediaType::Movie,
            canonical_id: "tt0133093".to_string(),
            title: title.to_string(),
            alternate_titles: vec![],
            year,
            episode: None,
        }
    }

    fn make_series(title: &str, season: u32, episode: u32) -> MediaRequest {
        MediaRequest {
            media_type: MediaType::Series,
            canonical_id: "tt0903747".to_string(),
            title: title.to_string(),
            alternate_titles: vec![],
            year: Some(2008),
            episode: Some(EpisodeRef { season, episode }),
        }
    }

    #[test]
    fn test_movie_queries_most_specific_first() {
        let request = make_movie("The Matrix", Some(1999));
        let queries = build_queries(&request);
        assert_eq!(queries, vec!["The Matrix 1999", "The Matrix"]);
    }

    #[test]
    fn test_movie_without_year_gets_bare_title_only() {
        let request = make_movie("The Matrix", None);
        let queries = build_queries(&request);
        assert_eq!(queries, vec!["The Matrix"]);
    }

    #[test]
    fn test_series_queries_include_both_episode_tags() {
        let request = make_series("Breaking Bad", 2, 5);
        let queries = build_queries(&request);
        assert_eq!(
            queries,
            vec![
                "Breaking Bad S02E05",
                "Breaking Bad 2x05",
                "Breaking Bad",
            ]
        );
    }

    #[test]
    fn test_series_without_episode_behaves_like_bare_search() {
        let mut request = make_series("Breaking Bad", 2, 5);
        request.episode = None;
        let queries = build_queries(&request);
        assert_eq!(queries, vec!["Breaking Bad"]);
    }

    #[test]
    fn test_alternate_titles_follow_primary() {
        let mut request = make_movie("Pelíšky", Some(1999));
        request.alternate_titles = vec!["Cosy Dens".to_string()];
        let queries = build_queries(&request);
        assert_eq!(
            queries,
            vec![
                "Pelíšky 1999",
                "Pelíšky",
                "Cosy Dens 1999",
                "Cosy Dens",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_are_merged_case_insensitively() {
        let mut request = make_movie("The Matrix", Some(1999));
        request.alternate_titles = vec!["THE MATRIX".to_string(), "Matrix".to_string()];
        let queries = build_queries(&request);
        assert_eq!(
            queries,
            vec!["The Matrix 1999", "The Matrix", "Matrix 1999", "Matrix"]
        );
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let mut request = make_movie("  ", None);
        request.alternate_titles = vec!["".to_string(), "Fallback Name".to_string()];
        let queries = build_queries(&request);
        assert_eq!(queries, vec!["Fallback Name"]);
    }
}
