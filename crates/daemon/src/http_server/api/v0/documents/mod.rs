use axum::routing::get;
use axum::Router;

pub mod create;
pub mod list;

pub use create::{CreateDocumentRequest, CreateDocumentResponse};
pub use list::{ListDocumentsRequest, ListDocumentsResponse, NO_DOCUMENTS_MESSAGE};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .with_state(state)
}
