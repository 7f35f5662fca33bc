//! Generic JSON-over-HTTPS request pipeline.
//!
//! A [`RequestDescriptor`] describes an outbound request; [`ApiClient`] turns it into a
//! `reqwest` request, dispatches it on the tokio runtime, classifies the status code and
//! decodes the body into the caller's type. The same operation is offered as a callback
//! ([`ApiClient::request`]) and as a future ([`ApiClient::execute`]), the latter being a
//! thin bridge over the former.

pub mod bridge;
pub mod client;
pub mod descriptor;
pub mod error;
pub mod method;
pub mod params;

pub use client::{ApiClient, StatusClass, interpret, pretty_body};
pub use descriptor::RequestDescriptor;
pub use error::{ApiError, ErrorKind};
pub use method::HttpMethod;
pub use params::{ParamValue, Params};
