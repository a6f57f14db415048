use pramen_core::{Config, SanitizedConfig, StreamResolver};

/// Shared application state
pub struct AppState {
    config: Config,
    resolver: StreamResolver,
}

impl AppState {
    pub fn new(config: Config, resolver: StreamResolver) -> Self {
        Self { config, resolver }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn resolver(&self) -> &StreamResolver {
        &self.resolver
    }
}
