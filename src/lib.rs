//! `newt` is a minimal CoAP-style request/response server & client.
//!
//! ## The protocol
//! Like CoAP, `newt` copies the semantics of HTTP into a small
//! resource-oriented protocol over UDP:
//! - a server exposes named **resources** addressable by URI path
//! - clients issue GET, PUT, POST and DELETE requests against those paths
//! - every request is answered by a response carrying a CoAP-modeled
//!   status code (`2.05 Content`, `4.04 NotFound`, ...)
//!
//! Resources come in three kinds:
//! - `Static` resources are registered once at server start and support
//!   GET and PUT
//! - `Collection` resources own dynamically created members and support
//!   POST, which allocates a new member id (monotonic, never reused)
//! - `Item` resources are collection members and support GET and DELETE
//!
//! ## Differences from CoAP
//! - the wire format is a line-oriented datagram, not the RFC 7252 binary
//!   encoding (see [`msg`])
//! - there is no CON/NON/ACK message layering; reliability is the client's
//!   bounded retransmit in [`blocking::Client`], which resolves to a
//!   synthetic `5.03 ServiceUnavailable` response when the host never
//!   answers

// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]


pub(crate) mod logging;

/// Blocking request client
pub mod blocking;

/// customizable retrying of fallible operations
pub mod retry;

/// responses
pub mod resp;

/// requests
pub mod req;

/// the server: socket loop, resource registry, request dispatch
pub mod server;

/// wire codec
pub mod msg;

/// network abstractions
pub mod net;

/// URI paths
pub mod path;

/// `coap://` URIs
pub mod uri;

/// configuring client runtime behavior
pub mod config;
