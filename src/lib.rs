//! Client core for the Okta identity-management REST API.
//!
//! [`Client`] builds requests, injects the static API token, refuses calls
//! whose rate-limit category is known to be exhausted, and turns responses
//! into typed values, [`Response`] metadata (rate, pagination, request id) or
//! a typed [`Error`]. Resource helpers live in [`resources`].

pub mod config;
pub mod error;
pub mod http;
pub mod rate;
pub mod resources;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use http::{CallContext, Client, Response, NO_BODY};
pub use rate::{Category, RateTracker};
pub use types::{Pagination, Rate};
