//! Blocking client SDK for the things/groups management API.
//!
//! # Overview
//! Two clients, [`GroupsClient`] and [`ThingsClient`], each hold only a
//! base URL, a route style and a [`Transport`]. Every operation issues
//! exactly one HTTP request and maps the status code through a fixed
//! per-operation table (see [`status`]).
//!
//! # Design
//! - Operations are split into `build_*` (produces an [`HttpRequest`]) and
//!   `parse_*` (consumes an [`HttpResponse`]) so callers can bring their own
//!   I/O; the one-call methods run both through the client's transport.
//! - Results are `Result<T, ApiError>`. [`envelope::Response`] flattens a
//!   result into the value/status/message form for FFI callers.
//! - [`RouteStyle::Literal`] keeps the URLs deployed servers already
//!   receive; [`RouteStyle::Encoded`] builds them with the `url` crate.

pub mod config;
pub mod envelope;
pub mod error;
pub mod groups;
pub mod http;
mod routes;
pub mod status;
pub mod things;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, RouteStyle};
pub use envelope::Response;
pub use error::{ApiError, ErrorKind};
pub use groups::GroupsClient;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use status::Operation;
pub use things::ThingsClient;
pub use transport::{Transport, UreqTransport};
pub use types::{ChannelThingsQuery, ConnectRequest, Group, GroupQuery, Thing, ThingQuery};
