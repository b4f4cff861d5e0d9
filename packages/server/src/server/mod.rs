// HTTP server
pub mod app;
pub mod error;
pub mod routes;

pub use app::{build_app, AppState};
pub use error::ApiError;
