//! Release attribute classification.
//!
//! Pure text analysis: quality, format and language recognition are
//! table-driven so the keyword sets stay in one place, and the size and
//! duration parsers feed the bitrate estimate used when a release
//! carries no quality keyword at all.

use crate::resolver::types::{FormatFlags, LanguageFlags, Quality};
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Classified attributes of one release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attributes {
    pub quality: Quality,
    pub format: FormatFlags,
    pub language: LanguageFlags,
    /// Megabits per second, present when size and duration are known.
    pub bitrate_mbps: Option<f64>,
}

/// Below this estimated bitrate an unlabeled release is assumed SD.
const SD_BITRATE_CUTOFF_MBPS: f64 = 4.0;

// Ordered highest tier first; the first matching row decides.
const QUALITY_RULES: &[(&str, Quality)] = &[
    (r"2160p|4k|uhd", Quality::UltraHd),
    (r"1080p|full\s*hd", Quality::FullHd),
    (r"720p|[^a-z]hd[^a-z]", Quality::Hd),
    (r"480p|576p|360p|sd", Quality::Sd),
];

#[derive(Clone, Copy)]
enum FormatMarker {
    Hdr,
    Remux,
    Bluray,
    WebDl,
    WebRip,
}

const FORMAT_RULES: &[(&str, FormatMarker)] = &[
    (r"hdr10\+?|dolby\s*vision|dv\b|hdr\b", FormatMarker::Hdr),
    (r"\bremux\b", FormatMarker::Remux),
    (r"blu[\s\.\-]?ray|bdrip|brrip|\bbd\b", FormatMarker::Bluray),
    (r"web[\s\.\-]?dl", FormatMarker::WebDl),
    (r"web[\s\.\-]?rip", FormatMarker::WebRip),
];

#[derive(Clone, Copy)]
enum LanguageMarker {
    Cz,
    Sk,
    En,
    Dub,
    Sub,
}

const LANGUAGE_RULES: &[(&str, LanguageMarker)] = &[
    (r"\bcz\b|czech|česk|cesk", LanguageMarker::Cz),
    (r"\bsk\b|slovak|slovensk", LanguageMarker::Sk),
    (r"\beng\b|english", LanguageMarker::En),
    (r"dabing|dubbing|\bdab\b", LanguageMarker::Dub),
    (r"titulk|\btit\b|\bsub(?:s|bed)?\b", LanguageMarker::Sub),
];

static QUALITY_TABLE: Lazy<Vec<(Regex, Quality)>> = Lazy::new(|| {
    QUALITY_RULES
        .iter()
        .map(|(pattern, quality)| (compiled(pattern), *quality))
        .collect()
});

static FORMAT_TABLE: Lazy<Vec<(Regex, FormatMarker)>> = Lazy::new(|| {
    FORMAT_RULES
        .iter()
        .map(|(pattern, marker)| (compiled(pattern), *marker))
        .collect()
});

static LANGUAGE_TABLE: Lazy<Vec<(Regex, LanguageMarker)>> = Lazy::new(|| {
    LANGUAGE_RULES
        .iter()
        .map(|(pattern, marker)| (compiled(pattern), *marker))
        .collect()
});

fn compiled(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile classifier pattern")
}

/// Classifies one release from its title and listing card text.
pub fn classify(
    raw_title: &str,
    raw_tag_text: &str,
    size_bytes: Option<u64>,
    duration_secs: Option<u32>,
) -> Attributes {
    // Padded so edge-guarded patterns also match at the ends.
    let text = format!(" {} {} ", raw_title, raw_tag_text).to_lowercase();

    let mut quality = QUALITY_TABLE
        .iter()
        .find(|(re, _)| re.is_match(&text))
        .map(|(_, quality)| *quality)
        .unwrap_or(Quality::Unknown);

    let format = classify_format(&text);
    let language = classify_language(&text);
    let bitrate_mbps = bitrate_mbps(size_bytes, duration_secs);

    // No keyword anywhere but a visibly starved bitrate: call it SD
    // rather than ranking it alongside genuinely unknown releases.
    if quality == Quality::Unknown {
        if let Some(mbps) = bitrate_mbps {
            if mbps > 0.0 && mbps < SD_BITRATE_CUTOFF_MBPS {
                quality = Quality::Sd;
            }
        }
    }

    Attributes {
        quality,
        format,
        language,
        bitrate_mbps,
    }
}

fn classify_format(text: &str) -> FormatFlags {
    let mut flags = FormatFlags::default();
    for (re, marker) in FORMAT_TABLE.iter() {
        if re.is_match(text) {
            match marker {
                FormatMarker::Hdr => flags.hdr = true,
                FormatMarker::Remux => flags.remux = true,
                FormatMarker::Bluray => flags.bluray = true,
                FormatMarker::WebDl => flags.web_dl = true,
                FormatMarker::WebRip => flags.webrip = true,
            }
        }
    }
    flags
}

fn classify_language(text: &str) -> LanguageFlags {
    let mut flags = LanguageFlags::default();
    for (re, marker) in LANGUAGE_TABLE.iter() {
        if re.is_match(text) {
            match marker {
                LanguageMarker::Cz => flags.cz = true,
                LanguageMarker::Sk => flags.sk = true,
                LanguageMarker::En => flags.en = true,
                LanguageMarker::Dub => flags.dub = true,
                LanguageMarker::Sub => flags.sub = true,
            }
        }
    }
    flags
}

/// Estimated stream bitrate in megabits per second.
pub fn bitrate_mbps(size_bytes: Option<u64>, duration_secs: Option<u32>) -> Option<f64> {
    match (size_bytes, duration_secs) {
        (Some(bytes), Some(secs)) if secs > 0 => {
            Some(bytes as f64 * 8.0 / secs as f64 / 1_000_000.0)
        }
        _ => None,
    }
}

static SIZE_TOKEN: Lazy<Regex> =
    Lazy::new(|| compiled(r"(\d+(?:\.\d+)?)\s*(gb|g|mb|m|kb|k|tb|t)\b"));

/// Parses the first size token in `text` into bytes.
///
/// Comma decimals ("1,4 GB") are accepted; units are binary multiples.
pub fn parse_size_bytes(text: &str) -> Option<u64> {
    let text = text.to_lowercase().replace(',', ".");
    let caps = SIZE_TOKEN.captures(&text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let exponent = match caps.get(2)?.as_str().chars().next() {
        Some('k') => 1,
        Some('m') => 2,
        Some('g') => 3,
        Some('t') => 4,
        _ => return None,
    };
    Some((value * 1024f64.powi(exponent)).round() as u64)
}

static HMS_TOKEN: Lazy<Regex> = Lazy::new(|| compiled(r"\b(\d{1,2}):(\d{2}):(\d{2})\b"));
static HM_TOKEN: Lazy<Regex> = Lazy::new(|| compiled(r"\b(\d+)\s*h\s*(\d+)\s*m(?:in)?\b"));

/// Parses the first duration token ("01:52:03" or "1h 52m") into seconds.
pub fn parse_duration_secs(text: &str) -> Option<u32> {
    let text = text.to_lowercase();
    if let Some(caps) = HMS_TOKEN.captures(&text) {
        let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
        let seconds: u32 = caps.get(3)?.as_str().parse().ok()?;
        return Some(hours * 3600 + minutes * 60 + seconds);
    }
    if let Some(caps) = HM_TOKEN.captures(&text) {
        let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
        return Some(hours * 3600 + minutes * 60);
    }
    None
}
