//! Background worker for listing and details requests.
//!
//! All network I/O happens here so the engine's event handling never blocks. The
//! engine posts [`WorkerMessage`]s and later receives [`WorkerResponse`]s as
//! events; trace context travels with every message.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `client`: The [`ListingClient`] seam and its HTTP implementation
//! - `handler`: Worker thread and message processing

pub mod client;
pub mod handler;
pub mod messages;

pub use client::{HttpListingClient, ListingClient};
pub use handler::{ListingWorker, WorkerHandle};
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
