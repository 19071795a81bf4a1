use axum::routing::get;
use axum::Router;

pub mod healthz;
pub mod version;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(healthz::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
