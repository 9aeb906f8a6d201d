//! Transport adapters.

mod http;

pub use http::HttpTransport;
