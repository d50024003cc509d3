//! # gather-api
//!
//! The transport seam between the Gather sync engine and the server.
//!
//! - [`ApiClient`]: one async method per consumed endpoint, returning parsed
//!   wire types or a structured [`ApiError`]. The store depends only on this
//!   trait; tests inject programmable fakes.
//! - [`HttpApiClient`]: the reqwest implementation, mapping HTTP statuses to
//!   the error taxonomy (402 → payment required, 403 → permission denied).
//!
//! ## Crate Position
//!
//! Depends on `gather-core` for wire shapes. Depended on by `gather-store`.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod http;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use http::HttpApiClient;
