//! Resolution engine: drives one media id from metadata to ranked streams.
//!
//! The pipeline runs search queries most-specific-first, merges and caps
//! the candidate pool, filters it, resolves surviving detail pages with
//! bounded concurrency and ranks whatever played out. Every stage
//! swallows upstream trouble: a failed search or extraction costs its
//! own results and nothing else, so a resolution always completes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::metadata::{CanonicalMeta, MetadataProvider};
use crate::metrics;
use crate::resolver::classify::classify;
use crate::resolver::extractor::StreamExtractor;
use crate::resolver::filter::{partition_candidates, EpisodeMatcher};
use crate::resolver::query_builder::build_queries;
use crate::resolver::rank::sort_streams;
use crate::resolver::search_client::SearchClient;
use crate::resolver::types::{
    Candidate, EpisodeRef, MediaRequest, MediaType, Resolution, StreamDescriptor,
};
use crate::resolver::verify::{dedup_names, title_matches};

/// Resolves media ids to ranked playable streams.
pub struct StreamResolver {
    config: ResolverConfig,
    metadata: Arc<dyn MetadataProvider>,
    search: SearchClient,
    extractor: StreamExtractor,
}

impl StreamResolver {
    pub fn new(
        config: ResolverConfig,
        metadata: Arc<dyn MetadataProvider>,
        search: SearchClient,
        extractor: StreamExtractor,
    ) -> Self {
        Self {
            config,
            metadata,
            search,
            extractor,
        }
    }

    /// Resolves an inbound media id, e.g. "tt0133093" or "tt0903747:2:5".
    ///
    /// The id is split into its canonical part and optional episode
    /// locator, enriched through the metadata provider, and handed to
    /// [`resolve_request`](Self::resolve_request). A failed metadata
    /// lookup downgrades to a title-less request, which resolves to an
    /// empty stream list rather than an error.
    pub async fn resolve_id(&self, media_type: MediaType, media_id: &str) -> Resolution {
        let (canonical_id, episode) = parse_media_id(media_type, media_id);

        let meta = match self.metadata.canonical_meta(media_type, &canonical_id).await {
            Ok(meta) => {
                metrics::METADATA_REQUESTS.with_label_values(&["ok"]).inc();
                meta
            }
            Err(e) => {
                metrics::METADATA_REQUESTS
                    .with_label_values(&["error"])
                    .inc();
                warn!(
                    canonical_id = canonical_id.as_str(),
                    error = %e,
                    "Metadata lookup failed, resolving without titles"
                );
                CanonicalMeta {
                    title: String::new(),
                    alternate_titles: Vec::new(),
                    year: None,
                }
            }
        };

        let CanonicalMeta {
            title,
            alternate_titles,
            year,
        } = meta;
        let mut names = Vec::with_capacity(1 + alternate_titles.len());
        names.push(title);
        names.extend(alternate_titles);
        let mut names = dedup_names(names).into_iter();
        let title = names.next().unwrap_or_default();
        let alternate_titles: Vec<String> = names.collect();

        let request = MediaRequest {
            media_type,
            canonical_id,
            title,
            alternate_titles,
            year,
            episode,
        };
        self.resolve_request(request).await
    }

    /// Runs the full pipeline for an already-enriched request.
    ///
    /// Never fails: any combination of upstream errors degrades to a
    /// [`Resolution`] with fewer, possibly zero, streams.
    pub async fn resolve_request(&self, request: MediaRequest) -> Resolution {
        let resolution_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        metrics::RESOLUTIONS_TOTAL
            .with_label_values(&[request.media_type.as_str()])
            .inc();
        info!(
            resolution_id,
            media_type = request.media_type.as_str(),
            canonical_id = request.canonical_id.as_str(),
            name = %request.display_name(),
            "Starting resolution"
        );

        let queries = build_queries(&request);
        metrics::QUERIES_GENERATED
            .with_label_values(&[])
            .observe(queries.len() as f64);

        let pool = self.gather_candidates(&resolution_id, &queries).await;
        metrics::CANDIDATES_FOUND
            .with_label_values(&[])
            .observe(pool.len() as f64);

        let wanted = wanted_names(&request);
        let matcher = request.episode.map(EpisodeMatcher::new);
        let outcome = partition_candidates(pool, &wanted, matcher.as_ref());
        debug!(
            resolution_id,
            eligible = outcome.eligible.len(),
            deferred = outcome.deferred.len(),
            "Filtered candidate pool"
        );

        let mut seen_urls = HashSet::new();
        let mut streams = self
            .extract_streams(&resolution_id, outcome.eligible, &mut seen_urls)
            .await;

        // Episode fallback: when nothing carried the episode tag, retry a
        // bounded slice of the deferred candidates that still look like the
        // requested title. Season packs and unlabeled uploads live here.
        if streams.is_empty()
            && matcher.is_some()
            && self.config.allow_episode_fallback
            && !outcome.deferred.is_empty()
        {
            let retry: Vec<Candidate> = outcome
                .deferred
                .into_iter()
                .take(self.config.deferred_retry_limit)
                .filter(|candidate| title_matches(&candidate.normalized_title, &wanted))
                .collect();
            info!(
                resolution_id,
                count = retry.len(),
                "No episode-tagged streams, retrying deferred candidates"
            );
            streams = self
                .extract_streams(&resolution_id, retry, &mut seen_urls)
                .await;
        }

        sort_streams(&mut streams);

        let duration_ms = started.elapsed().as_millis() as u64;
        metrics::RESOLUTION_DURATION
            .with_label_values(&[request.media_type.as_str()])
            .observe(duration_ms as f64 / 1000.0);
        metrics::STREAMS_RETURNED
            .with_label_values(&[])
            .observe(streams.len() as f64);
        info!(
            resolution_id,
            streams = streams.len(),
            duration_ms,
            "Resolution finished"
        );

        Resolution {
            resolution_id,
            request,
            streams,
            queries_tried: queries,
            duration_ms,
        }
    }

    /// Runs all queries with bounded concurrency and merges their results
    /// into one pool, deduplicated by detail URL and capped.
    ///
    /// Queries run most-specific-first and merge in that order, so when
    /// the cap cuts the pool it keeps the best-targeted candidates.
    async fn gather_candidates(&self, resolution_id: &str, queries: &[String]) -> Vec<Candidate> {
        let mut pool = Vec::new();
        let mut seen = HashSet::new();

        // Futures are materialized up front (they stay inert until polled)
        // so the closure's higher-ranked lifetime never reaches the stream
        // type; mapping lazily trips rust-lang/rust#89976 when the caller
        // needs the resolution future to be Send.
        let searches: Vec<_> = queries
            .iter()
            .map(|query| {
                let search = &self.search;
                async move { (query.as_str(), search.search(query).await) }
            })
            .collect();
        let mut searches =
            stream::iter(searches).buffered(self.config.search_concurrency.max(1));

        while let Some((query, result)) = searches.next().await {
            match result {
                Ok(candidates) => {
                    metrics::SEARCHES_TOTAL.with_label_values(&["ok"]).inc();
                    debug!(
                        resolution_id,
                        query,
                        count = candidates.len(),
                        "Search finished"
                    );
                    for candidate in candidates {
                        if pool.len() >= self.config.max_candidates {
                            break;
                        }
                        if seen.insert(candidate.detail_url.clone()) {
                            pool.push(candidate);
                        }
                    }
                }
                Err(e) => {
                    metrics::SEARCHES_TOTAL.with_label_values(&["error"]).inc();
                    warn!(resolution_id, query, error = %e, "Search failed, continuing without it");
                }
            }
            if pool.len() >= self.config.max_candidates {
                debug!(resolution_id, "Candidate pool full, skipping remaining searches");
                break;
            }
        }
        pool
    }

    /// Resolves candidates to streams with bounded concurrency.
    ///
    /// Completion order follows candidate order, so the result cap keeps
    /// the earliest candidates. Dropping the in-flight buffer on cap
    /// cancels whatever is still fetching. `seen_urls` spans the strict
    /// and fallback passes; candidates resolving to an already-seen
    /// playback URL are dropped as duplicates.
    async fn extract_streams(
        &self,
        resolution_id: &str,
        candidates: Vec<Candidate>,
        seen_urls: &mut HashSet<String>,
    ) -> Vec<StreamDescriptor> {
        let mut streams = Vec::new();
        if candidates.is_empty() {
            return streams;
        }

        let mut extractions = stream::iter(candidates.into_iter().map(|candidate| {
            let extractor = &self.extractor;
            async move {
                let result = extractor.extract(&candidate.detail_url).await;
                (candidate, result)
            }
        }))
        .buffered(self.config.extract_concurrency.max(1));

        while let Some((candidate, result)) = extractions.next().await {
            match result {
                Ok(Some(playback_url)) => {
                    metrics::EXTRACTIONS_TOTAL.with_label_values(&["ok"]).inc();
                    if !seen_urls.insert(playback_url.clone()) {
                        debug!(
                            resolution_id,
                            detail_url = candidate.detail_url.as_str(),
                            "Duplicate playback URL, skipping"
                        );
                        continue;
                    }
                    streams.push(make_descriptor(candidate, playback_url));
                    if streams.len() >= self.config.max_results {
                        debug!(
                            resolution_id,
                            count = streams.len(),
                            "Stream cap reached, cancelling remaining extractions"
                        );
                        break;
                    }
                }
                Ok(None) => {
                    metrics::EXTRACTIONS_TOTAL.with_label_values(&["none"]).inc();
                    debug!(
                        resolution_id,
                        detail_url = candidate.detail_url.as_str(),
                        "No playable stream on detail page"
                    );
                }
                Err(e) => {
                    metrics::EXTRACTIONS_TOTAL
                        .with_label_values(&["error"])
                        .inc();
                    warn!(
                        resolution_id,
                        detail_url = candidate.detail_url.as_str(),
                        error = %e,
                        "Extraction failed, dropping candidate"
                    );
                }
            }
        }
        streams
    }
}

/// Classifies a resolved candidate into a ranked stream descriptor.
fn make_descriptor(candidate: Candidate, playback_url: String) -> StreamDescriptor {
    let attributes = classify(
        &candidate.raw_title,
        &candidate.raw_tag_text,
        candidate.size_bytes,
        candidate.duration_secs,
    );
    StreamDescriptor {
        playback_url,
        quality: attributes.quality,
        format: attributes.format,
        language: attributes.language,
        size_bytes: candidate.size_bytes,
        duration_secs: candidate.duration_secs,
        bitrate_mbps: attributes.bitrate_mbps,
        source: candidate,
    }
}

/// All names a candidate may be checked against, deduplicated.
fn wanted_names(request: &MediaRequest) -> Vec<String> {
    let mut names = Vec::with_capacity(1 + request.alternate_titles.len());
    names.push(request.title.clone());
    names.extend(request.alternate_titles.iter().cloned());
    dedup_names(names)
}

/// Splits an inbound media id into its canonical part and episode locator.
///
/// Series ids carry a ":season:episode" suffix. A malformed or partial
/// locator (zero, non-numeric, missing a part) yields no episode rather
/// than an error; movie ids pass through whole.
fn parse_media_id(media_type: MediaType, media_id: &str) -> (String, Option<EpisodeRef>) {
    if media_type != MediaType::Series {
        return (media_id.to_string(), None);
    }
    match media_id.split_once(':') {
        Some((canonical, locator)) => {
            let mut parts = locator.split(':');
            let season = parts.next().and_then(parse_positive);
            let episode = parts.next().and_then(parse_positive);
            let episode_ref = match (season, episode) {
                (Some(season), Some(episode)) => Some(EpisodeRef { season, episode }),
                _ => None,
            };
            (canonical.to_string(), episode_ref)
        }
        None => (media_id.to_string(), None),
    }
}

fn parse_positive(part: &str) -> Option<u32> {
    part.trim().parse::<u32>().ok().filter(|n| *n > 0)
}
