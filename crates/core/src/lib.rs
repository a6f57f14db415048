pub mod cache;
pub mod config;
pub mod fetch;
pub mod metadata;
pub mod metrics;
pub mod resolver;
pub mod testing;

pub use cache::{
    search_key, stream_key, CacheError, MemoryCache, NoopCache, ResultCache, SqliteCache,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CacheBackend, Config, ConfigError,
    SanitizedConfig,
};
pub use fetch::{FetchError, FetchedPage, HttpPageFetcher, PageFetcher};
pub use metadata::{
    CanonicalMeta, CinemetaClient, LayeredMetadataProvider, MetadataError, MetadataProvider,
    TmdbClient,
};
pub use resolver::{
    render_label, EpisodeRef, MediaRequest, MediaType, Resolution, SearchClient, StreamDescriptor,
    StreamExtractor, StreamResolver,
};
