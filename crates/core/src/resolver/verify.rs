//! Title normalization and identity matching.
//!
//! Release names on the index are messy: mixed case, dots and dashes as
//! separators, and Czech/Slovak titles written with or without
//! diacritics. Everything is compared in a normalized space so
//! "Pelíšky" and "Pelisky.1999.CZ.1080p" can still be recognized as the
//! same film.

use std::collections::HashSet;

/// Lowercases and folds accented letters, keeping punctuation intact.
/// Used where separators carry meaning, e.g. episode tags like "2x05".
pub fn fold_lower(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

/// Lowercases, folds accented letters to their base form, replaces any
/// non-alphanumeric run with a single space and trims the ends.
pub fn normalize_title(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        let c = fold_diacritic(c);
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Maps accented Latin letters to their base letter. Covers the full
/// Czech/Slovak alphabets plus the common Western European accents seen
/// in alternate titles; anything else passes through unchanged.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'ä' | 'à' | 'â' | 'ã' | 'å' => 'a',
        'č' | 'ç' | 'ć' => 'c',
        'ď' => 'd',
        'é' | 'ě' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ĺ' | 'ľ' | 'ł' => 'l',
        'ň' | 'ñ' | 'ń' => 'n',
        'ó' | 'ô' | 'ò' | 'õ' | 'ö' => 'o',
        'ŕ' | 'ř' => 'r',
        'š' | 'ś' => 's',
        'ť' => 't',
        'ú' | 'ů' | 'ù' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        other => other,
    }
}

/// Checks whether a candidate plausibly is the requested media.
///
/// `normalized_candidate` is the candidate's normalized title; wanted
/// names are normalized here. A candidate passes when its normalized
/// title contains any normalized wanted name as a substring, or the
/// wanted name contains the candidate title. The second direction keeps
/// tersely named uploads ("Matrix") for longer official titles.
pub fn title_matches(normalized_candidate: &str, wanted_names: &[String]) -> bool {
    if normalized_candidate.is_empty() {
        return false;
    }
    wanted_names.iter().any(|wanted| {
        let wanted = normalize_title(wanted);
        !wanted.is_empty()
            && (normalized_candidate.contains(&wanted) || wanted.contains(normalized_candidate))
    })
}

/// Removes names that normalize to the same string (or to nothing),
/// keeping the first spelling of each.
pub fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| {
            let key = normalize_title(name);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wanted(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_fold_lower_keeps_punctuation() {
        assert_eq!(fold_lower("2. Série, 5. Díl"), "2. serie, 5. dil");
        assert_eq!(fold_lower("S02×E05"), "s02×e05");
    }

    #[test]
    fn test_normalize_lowercases_and_collapses_separators() {
        assert_eq!(
            normalize_title("The.Matrix_1999-1080p  BluRay"),
            "the matrix 1999 1080p bluray"
        );
    }

    #[test]
    fn test_normalize_folds_czech_and_slovak_diacritics() {
        assert_eq!(normalize_title("Pelíšky"), "pelisky");
        assert_eq!(normalize_title("Želary"), "zelary");
        assert_eq!(normalize_title("Príbeh ľadového ŕečníka"), "pribeh ladoveho recnika");
        assert_eq!(normalize_title("ČĎŇŘŠŤŽŮ"), "cdnrstzu");
    }

    #[test]
    fn test_normalize_trims_edges() {
        assert_eq!(normalize_title("  --Matrix-- "), "matrix");
        assert_eq!(normalize_title("!!!"), "");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_title_matches_candidate_contains_wanted() {
        let candidate = normalize_title("Pelisky.1999.CZ.1080p.WEB-DL");
        assert!(title_matches(&candidate, &wanted(&["Pelíšky"])));
    }

    #[test]
    fn test_title_matches_wanted_contains_candidate() {
        let candidate = normalize_title("Matrix CZ dabing");
        assert!(!title_matches(&candidate, &wanted(&["The Matrix"])));

        let candidate = normalize_title("Matrix");
        assert!(title_matches(&candidate, &wanted(&["The Matrix"])));
    }

    #[test]
    fn test_title_matches_any_alternate_name() {
        let candidate = normalize_title("Cosy.Dens.1999.720p");
        assert!(title_matches(
            &candidate,
            &wanted(&["Pelíšky", "Cosy Dens"])
        ));
    }

    #[test]
    fn test_title_matches_rejects_unrelated() {
        let candidate = normalize_title("Totally Different Film 2020");
        assert!(!title_matches(&candidate, &wanted(&["The Matrix"])));
        assert!(!title_matches("", &wanted(&["The Matrix"])));
    }

    #[test]
    fn test_dedup_names_by_normalized_form() {
        let names = wanted(&["Pelíšky", "Pelisky", "PELÍŠKY", "Cosy Dens", "  ", "!!!"]);
        assert_eq!(dedup_names(names), wanted(&["Pelíšky", "Cosy Dens"]));
    }
}
