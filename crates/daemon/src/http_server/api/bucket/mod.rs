use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

pub mod add;
pub mod list;
pub mod remove;
pub mod set_root;

pub use add::{AddRequest, AddResponse};
pub use list::{ListRequest, ListResponse};
pub use remove::{RemoveRequest, RemoveResponse};
pub use set_root::{SetRootRequest, SetRootResponse};

use crate::http_server::auth::require_basic_auth;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/add", post(add::handler))
        .route("/remove/:id", post(remove::handler))
        .route("/list", get(list::handler))
        .route("/set-bucket-root/:id", post(set_root::handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
        .with_state(state)
}
