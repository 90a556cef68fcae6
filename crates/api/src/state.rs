use marquee_core::catalog::CatalogService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the catalog holds its gateway behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Movie catalog service over the configured storage backend.
    pub catalog: CatalogService,
}
