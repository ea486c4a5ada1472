//! HTTP surface — DTOs and axum routes.

mod dto;
mod routes;

pub use dto::{AcceptedResponse, ChatRequest, ChatResponse, ProposalRequest, UploadResponse};
pub use routes::{app_routes, AppState};
