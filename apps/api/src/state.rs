use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Runs are stateless and isolated; the only shared data is the
/// immutable configuration, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}
