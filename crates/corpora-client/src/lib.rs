//! # corpora-client
//!
//! HTTP implementation of [`corpora_core::SearchService`].
//!
//! - Bearer-token or email + password authentication
//! - JSON request and response bodies with camelCase names
//! - Streamed data-file upload with an explicit `Content-Length`
//! - Optional certificate bypass, loopback hosts only

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;

pub use client::HttpSearchService;
pub use config::{ClientConfig, Credentials};
