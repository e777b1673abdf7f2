pub mod header;

pub use axum::{serve, Extension, Json, Router};
pub use axum::body::Body;
pub use axum::extract::{
    FromRef, FromRequestParts, MatchedPath, OptionalFromRequestParts, Request, State,
};
pub use axum::http::Uri;
pub use axum::middleware::{from_fn, from_fn_with_state, Next};
pub use axum::response::{IntoResponse, Response};
pub use self::header::{
    HeaderMap, HeaderName, HeaderValue, Method, Parts, StatusCode, AUTHORIZATION, CONTENT_TYPE,
};
