//! HTTP API handlers for leme-api

pub mod error;
pub mod health;
pub mod predict;
pub mod request;
pub mod suggest;

pub use error::ApiError;
pub use health::health_routes;
pub use predict::predict_success;
pub use request::parse_profile;
pub use suggest::suggest_track;
