//! Storefront API access
//!
//! A thin layer over reqwest: URL construction, the owned session, and the
//! typed request/response shapes of the endpoints the harness exercises.

mod client;
mod session;
pub mod types;

pub use client::{api_root, ApiClient, RawResponse, TransportError};
pub use session::{ActiveIdentity, Session};
