use axum::middleware;
use axum::routing::post;
use axum::Router;

pub mod car;
pub mod gc;
pub mod pins;

pub use car::{ImportRequest, ImportResponse};
pub use gc::{GcRequest, GcResponse};
pub use pins::{PinInfo, PinsLsRequest, PinsLsResponse, PinsRmRequest, PinsRmResponse};

use crate::http_server::auth::require_basic_auth;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/gc", post(gc::handler))
        .route("/pins/ls", post(pins::ls_handler))
        .route("/pins/rm/:id", post(pins::rm_handler))
        .route("/car/import", post(car::handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
        .with_state(state)
}
