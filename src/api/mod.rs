//! # Backend and Image Clients
//!
//! - [`backend`]: the `ArmoryBackend` trait and `ApiError`
//! - [`http`]: the reqwest implementation
//! - [`fetcher`]: one-pass inventory assembly
//! - [`images`]: image loading through the proxy
//! - [`types`]: wire request/response bodies

pub mod backend;
pub mod fetcher;
pub mod http;
pub mod images;
pub mod types;

pub use backend::{ApiError, ArmoryBackend};
pub use http::HttpBackend;
