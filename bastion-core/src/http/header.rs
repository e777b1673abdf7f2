pub use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
pub use axum::http::request::Parts;
pub use axum::http::{HeaderMap, Method, StatusCode};
