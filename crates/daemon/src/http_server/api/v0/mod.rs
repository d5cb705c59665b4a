use axum::routing::post;
use axum::Router;

pub mod authenticate;
pub mod documents;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/authenticate", post(authenticate::handler))
        .nest("/documents", documents::router(state.clone()))
        .with_state(state)
}
