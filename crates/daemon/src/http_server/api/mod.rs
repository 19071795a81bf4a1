use axum::Router;

pub mod bucket;
pub mod client;
pub mod mgr;

use crate::ServiceState;

/// Authenticated routes: the bucket itself plus the `/mgr` admin surface
pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .merge(bucket::router(state.clone()))
        .nest("/mgr", mgr::router(state.clone()))
        .with_state(state)
}
