//! Generic typed HTTP client.
//!
//! # Overview
//! `TypedHttpClient<T>` performs exactly one HTTP call per invocation against
//! a configured base address, with optional bearer-token authorization and
//! JSON bodies of type `T`. Success yields the response text; any non-2xx
//! status, transport failure or empty path surfaces as a `ClientError`.
//!
//! # Design
//! - Requests are built as plain `HttpRequest` values carrying their own
//!   headers, then executed by a shared `Transport`. Nothing per-call is
//!   stored on the transport.
//! - No retries, no backoff, no caching. Timeouts are the transport's.
//! - Logging and reachability are injected capabilities (`AppLogger`,
//!   `Connectivity`); configuration comes from an `OptionsProvider`.

pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod http;
pub mod logger;
pub mod transport;

pub use client::TypedHttpClient;
pub use config::{HttpClientConfig, OptionsProvider};
pub use connectivity::{Connectivity, NetworkAccess, StaticConnectivity};
pub use error::{ClientError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logger::{AppLogger, TracingLogger};
pub use transport::{ReqwestTransport, Transport};
