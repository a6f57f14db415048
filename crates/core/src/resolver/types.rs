//! Core domain types shared across the resolution pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of media a resolution targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

/// Error for unrecognized media type strings.
#[derive(Debug, Error)]
#[error("Unknown media type: {0}")]
pub struct UnknownMediaType(pub String);

impl std::str::FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            other => Err(UnknownMediaType(other.to_string())),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Season/episode locator for series requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeRef {
    /// Zero-padded tag, e.g. "S02E05".
    pub fn sxxeyy(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.episode)
    }

    /// Compact cross tag, e.g. "2x05".
    pub fn sxe(&self) -> String {
        format!("{}x{:02}", self.season, self.episode)
    }
}

/// Everything known about the requested media before searching starts.
///
/// `title`, `alternate_titles` and `year` come from the metadata layer;
/// `episode` is parsed out of the inbound media id for series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub media_type: MediaType,
    /// Opaque canonical identifier, e.g. "tt0133093".
    pub canonical_id: String,
    pub title: String,
    pub alternate_titles: Vec<String>,
    pub year: Option<u16>,
    pub episode: Option<EpisodeRef>,
}

impl MediaRequest {
    /// Title plus episode tag for series, used in stream labels.
    pub fn display_name(&self) -> String {
        match self.episode {
            Some(ep) => format!("{} {}", self.title, ep.sxxeyy()),
            None => self.title.clone(),
        }
    }
}

/// One search result row scraped from an index listing page.
///
/// `detail_url` is the dedup key within a resolution; it is kept
/// site-relative so cached entries stay valid across mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub detail_url: String,
    pub raw_title: String,
    /// Lowercased, diacritic-folded form of `raw_title` used by identity checks.
    pub normalized_title: String,
    /// Full visible text of the listing card; size/duration/format tokens live here.
    pub raw_tag_text: String,
    pub size_bytes: Option<u64>,
    pub duration_secs: Option<u32>,
}

/// Video quality tier recognized in release names.
///
/// The variant order matters: later variants outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    Unknown,
    Sd,
    Hd,
    FullHd,
    UltraHd,
}

impl Quality {
    pub fn rank(&self) -> u8 {
        match self {
            Quality::Unknown => 0,
            Quality::Sd => 1,
            Quality::Hd => 2,
            Quality::FullHd => 3,
            Quality::UltraHd => 4,
        }
    }

    /// Short display form used in stream labels.
    pub fn label(&self) -> &'static str {
        match self {
            Quality::Unknown => "?",
            Quality::Sd => "SD",
            Quality::Hd => "HD",
            Quality::FullHd => "FullHD",
            Quality::UltraHd => "4K",
        }
    }
}

/// Source/encode markers recognized in release names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatFlags {
    pub hdr: bool,
    pub remux: bool,
    pub bluray: bool,
    pub web_dl: bool,
    pub webrip: bool,
}

impl FormatFlags {
    /// Rank of the best marker present. HDR outranks everything,
    /// then remux, disc, web-dl, webrip.
    pub fn rank(&self) -> u8 {
        if self.hdr {
            5
        } else if self.remux {
            4
        } else if self.bluray {
            3
        } else if self.web_dl {
            2
        } else if self.webrip {
            1
        } else {
            0
        }
    }
}

/// Language markers recognized in release names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageFlags {
    pub cz: bool,
    pub sk: bool,
    pub en: bool,
    pub dub: bool,
    pub sub: bool,
}

/// Preference tier derived from [`LanguageFlags`], best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageTier {
    None,
    Mention,
    Subbed,
    SkDub,
    CzDub,
}

impl LanguageTier {
    pub fn rank(&self) -> u8 {
        match self {
            LanguageTier::None => 0,
            LanguageTier::Mention => 1,
            LanguageTier::Subbed => 2,
            LanguageTier::SkDub => 3,
            LanguageTier::CzDub => 4,
        }
    }
}

impl LanguageFlags {
    /// Collapses the individual flags into a preference tier.
    ///
    /// A dub marker without an explicit language counts as Czech: the
    /// indexes this resolver targets are Czech-first and an unqualified
    /// "dabing" means a local dub in practice. An explicitly English
    /// dub is just a mention.
    pub fn tier(&self) -> LanguageTier {
        if self.dub {
            if self.cz {
                LanguageTier::CzDub
            } else if self.sk {
                LanguageTier::SkDub
            } else if self.en {
                LanguageTier::Mention
            } else {
                LanguageTier::CzDub
            }
        } else if self.sub {
            LanguageTier::Subbed
        } else if self.cz || self.sk || self.en {
            LanguageTier::Mention
        } else {
            LanguageTier::None
        }
    }

    /// Two-letter tag shown in stream labels, empty when nothing applies.
    pub fn tag(&self) -> &'static str {
        match self.tier() {
            LanguageTier::CzDub => "CZ",
            LanguageTier::SkDub => "SK",
            _ if self.cz => "CZ",
            _ if self.sk => "SK",
            _ => "",
        }
    }
}

/// A playable stream with its classified attributes, ready for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub playback_url: String,
    pub source: Candidate,
    pub quality: Quality,
    pub format: FormatFlags,
    pub language: LanguageFlags,
    pub size_bytes: Option<u64>,
    pub duration_secs: Option<u32>,
    /// Estimated from size and duration when both are known.
    pub bitrate_mbps: Option<f64>,
}

/// Outcome of one resolution run.
///
/// Resolution never fails outright: upstream trouble surfaces as fewer
/// (or zero) streams, so this carries no error side.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Correlation id, also present on every log line of the run.
    pub resolution_id: String,
    pub request: MediaRequest,
    /// Ranked, deduplicated streams, best first.
    pub streams: Vec<StreamDescriptor>,
    pub queries_tried: Vec<String>,
    pub duration_ms: u64,
}
