//! Stream resolution pipeline.
//!
//! Turns a media id into a ranked list of directly playable streams:
//! queries are built most-specific-first from canonical titles, listing
//! pages are scraped into a capped candidate pool, junk and wrong
//! episodes are filtered out, surviving detail pages are resolved to
//! playback URLs with bounded concurrency, and the results are
//! classified and ranked by language, quality, format and size.
//!
//! The pipeline degrades instead of failing: a dead mirror, a blocked
//! page or a missing metadata record costs results, never the whole
//! resolution.

mod classify;
mod engine;
mod extractor;
mod filter;
mod label;
mod query_builder;
mod rank;
mod search_client;
mod types;
mod verify;

pub use engine::StreamResolver;
pub use extractor::StreamExtractor;
pub use label::render_label;
pub use search_client::SearchClient;
pub use types::{
    Candidate, EpisodeRef, FormatFlags, LanguageFlags, LanguageTier, MediaRequest, MediaType,
    Quality, Resolution, StreamDescriptor, UnknownMediaType,
};
