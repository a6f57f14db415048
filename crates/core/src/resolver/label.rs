//! Human-readable stream labels.
//!
//! Players show these labels verbatim in their stream pickers, so each
//! one packs name, quality, size, language and throughput into three
//! short lines.

use crate::resolver::types::{MediaRequest, StreamDescriptor};

/// Renders the multi-line label for one stream.
///
/// Line 1: display name, year and quality tier with size if known.
/// Line 2: language tag, quality tier and an HDR badge.
/// Line 3: estimated bitrate and runtime; omitted entirely when
/// neither is known.
pub fn render_label(request: &MediaRequest, stream: &StreamDescriptor) -> String {
    let quality = stream.quality.label();

    let year = request
        .year
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    let size = stream
        .size_bytes
        .map(format_bytes)
        .filter(|s| !s.is_empty())
        .map(|s| format!(" • {s}"))
        .unwrap_or_default();
    let line1 = format!("{}{} • {}{}", request.display_name(), year, quality, size);

    let lang = stream.language.tag();
    let mut line2 = if lang.is_empty() {
        "🌐".to_string()
    } else {
        format!("🌐 {lang}")
    };
    line2.push_str(&format!("  📺 {quality}"));
    if stream.format.hdr {
        line2.push_str("  🌈 HDR");
    }

    let mut parts = Vec::new();
    if let Some(mbps) = stream.bitrate_mbps {
        let mbps = format_mbps(mbps);
        if !mbps.is_empty() {
            parts.push(format!("⚡ {mbps}"));
        }
    }
    if let Some(secs) = stream.duration_secs {
        if secs > 0 {
            parts.push(format!("🕒 {}m", secs.div_ceil(60)));
        }
    }
    let line3 = parts.join("  ");

    let mut lines = vec![line1, line2];
    if !line3.is_empty() {
        lines.push(line3);
    }
    lines.join("\n")
}

/// Formats a byte count the way listing pages do: "1.40 GB", "700 MB",
/// "512 KB". Values of at least 10 drop the decimals, and a trailing
/// ".00" is stripped. Zero renders as empty.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }
    let gb = bytes as f64 / (1024f64 * 1024.0 * 1024.0);
    if gb >= 1.0 {
        return format!("{} GB", trim_decimal(gb));
    }
    let mb = bytes as f64 / (1024f64 * 1024.0);
    if mb >= 1.0 {
        return format!("{} MB", trim_decimal(mb));
    }
    let kb = (bytes as f64 / 1024.0).round();
    format!("{kb:.0} KB")
}

fn trim_decimal(value: f64) -> String {
    let text = if value >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    text.replace(".00", "")
}

/// Formats a bitrate as "8.4 Mbps", dropping the decimal at 10 and
/// rendering nothing for nonsense values.
pub fn format_mbps(mbps: f64) -> String {
    if !mbps.is_finite() || mbps <= 0.0 {
        return String::new();
    }
    if mbps >= 10.0 {
        format!("{mbps:.0} Mbps")
    } else {
        format!("{mbps:.1} Mbps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::types::{
        Candidate, EpisodeRef, FormatFlags, LanguageFlags, MediaType, Quality,
    };

    fn make_request() -> MediaRequest {
        MediaRequest {
            media_type: MediaType::Movie,
            canonical_id: "tt0133093".to_string(),
            title: "The Matrix".to_string(),
            alternate_titles: vec![],
            year: Some(1999),
            episode: None,
        }
    }

    fn make_stream() -> StreamDescriptor {
        StreamDescriptor {
            playback_url: "https://cdn.example.com/v.mp4".to_string(),
            source: Candidate {
                detail_url: "/matrix".to_string(),
                raw_title: "The Matrix 1080p CZ".to_string(),
                normalized_title: "the matrix 1080p cz".to_string(),
                raw_tag_text: String::new(),
                size_bytes: None,
                duration_secs: None,
            },
            quality: Quality::FullHd,
            format: FormatFlags::default(),
            language: LanguageFlags {
                cz: true,
                ..Default::default()
            },
            size_bytes: Some(4_509_715_661),
            duration_secs: Some(8_160),
            bitrate_mbps: Some(4.42),
        }
    }

    #[test]
    fn test_full_label() {
        let label = render_label(&make_request(), &make_stream());
        assert_eq!(
            label,
            "The Matrix (1999) • FullHD • 4.20 GB\n🌐 CZ  📺 FullHD\n⚡ 4.4 Mbps  🕒 136m"
        );
    }

    #[test]
    fn test_label_with_hdr_badge() {
        let mut stream = make_stream();
        stream.format.hdr = true;
        let label = render_label(&make_request(), &stream);
        assert!(label.contains("🌈 HDR"));
    }

    #[test]
    fn test_label_without_year_or_size() {
        let mut request = make_request();
        request.year = None;
        let mut stream = make_stream();
        stream.size_bytes = None;
        stream.bitrate_mbps = None;
        stream.duration_secs = None;
        let label = render_label(&request, &stream);
        assert_eq!(label, "The Matrix • FullHD\n🌐 CZ  📺 FullHD");
    }

    #[test]
    fn test_label_unknown_language_keeps_globe() {
        let mut stream = make_stream();
        stream.language = LanguageFlags::default();
        let label = render_label(&make_request(), &stream);
        assert!(label.contains("🌐  📺 FullHD"));
    }

    #[test]
    fn test_series_label_uses_episode_tag() {
        let mut request = make_request();
        request.media_type = MediaType::Series;
        request.title = "Breaking Bad".to_string();
        request.year = Some(2008);
        request.episode = Some(EpisodeRef {
            season: 2,
            episode: 5,
        });
        let label = render_label(&request, &make_stream());
        assert!(label.starts_with("Breaking Bad S02E05 (2008) • FullHD"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "");
        assert_eq!(format_bytes(4_509_715_661), "4.20 GB");
        assert_eq!(format_bytes(1_073_741_824), "1 GB");
        assert_eq!(format_bytes(16_106_127_360), "15 GB");
        assert_eq!(format_bytes(734_003_200), "700 MB");
        assert_eq!(format_bytes(5_452_595), "5.20 MB");
        assert_eq!(format_bytes(524_288), "512 KB");
    }

    #[test]
    fn test_format_mbps() {
        assert_eq!(format_mbps(4.42), "4.4 Mbps");
        assert_eq!(format_mbps(12.6), "13 Mbps");
        assert_eq!(format_mbps(0.0), "");
        assert_eq!(format_mbps(-1.0), "");
        assert_eq!(format_mbps(f64::NAN), "");
    }
}
