//! Worker message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the engine's
//! thread and the background worker that talks to the listing API. Requests
//! carry the caller's trace context so the worker's spans join the same trace.

use crate::app::pagination::PageRequest;
use crate::domain::ListingPage;
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry to maintain
/// trace continuity when passing messages to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the current
    /// span context is invalid.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if span_context.is_valid() {
            Some(Self {
                trace_id: format!("{:032x}", span_context.trace_id()),
                parent_span_id: format!("{:016x}", span_context.span_id()),
            })
        } else {
            tracing::trace!("no valid span context to propagate");
            None
        }
    }
}

/// Macro to generate builder methods for `WorkerMessage` variants.
///
/// Generates convenience constructors that automatically attach the current
/// trace context to each message variant.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    fetch_page(FetchPage { request: PageRequest }),
    fetch_details(FetchDetails { path: String }),
}

/// Messages sent to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Fetch one listing page.
    FetchPage {
        /// The request issued by the pagination controller, echoed back in the
        /// response so staleness can be judged.
        request: PageRequest,

        /// Trace context for linking spans across threads.
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Fetch the metadata record of one image for the details view.
    FetchDetails {
        /// Source path of the image, as listed.
        path: String,

        /// Trace context for linking spans across threads.
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    pub(crate) const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::FetchPage { trace_context, .. } | Self::FetchDetails { trace_context, .. } => {
                trace_context.as_ref()
            }
        }
    }
}

/// Responses sent from the worker thread back to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    PageLoaded {
        request: PageRequest,
        page: ListingPage,
    },

    PageFailed {
        request: PageRequest,
        /// Human-readable failure reason.
        reason: String,
    },

    DetailsLoaded {
        path: String,
        /// Opaque metadata record, forwarded as-is.
        details: serde_json::Value,
    },

    DetailsFailed {
        path: String,
        reason: String,
    },
}
