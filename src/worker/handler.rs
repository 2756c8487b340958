//! Worker thread implementation for listing and details requests.
//!
//! The engine never blocks on the network: every fetch is posted to a background
//! thread which answers on a response channel. Each message carries the sender's
//! trace context, so the worker's spans are linked to the engine span that
//! issued the request.

use crate::domain::error::{GalleryError, Result};
use crate::worker::client::ListingClient;
use crate::worker::{WorkerMessage, WorkerResponse};
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;

/// Message processor running on the worker thread.
///
/// Owns the [`ListingClient`] and turns each [`WorkerMessage`] into exactly one
/// [`WorkerResponse`]. Failures are answered, never dropped, so the engine can
/// always leave its in-flight state.
pub struct ListingWorker<C> {
    client: C,
}

impl<C: ListingClient> ListingWorker<C> {
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Helper for turning client results into responses with consistent logging.
    fn handle_client_result<T, F, E>(operation: &str, result: Result<T>, on_success: F, on_error: E) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
        E: FnOnce(String) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "request successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "request failed");
                on_error(e.to_string())
            }
        }
    }

    /// Attaches the parent trace context from a message to the current thread.
    ///
    /// Returns a context guard that must be held for the duration of the operation.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;

        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }

    /// Processes a worker message and returns its response.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("worker_handle_message", message_type = ?message);
        let _guard = span.entered();

        match message {
            WorkerMessage::FetchPage { request, .. } => {
                let result = self.client.list(&request.dir, request.offset, request.recursive);
                let failed = request.clone();
                Self::handle_client_result(
                    "fetch page",
                    result,
                    |page| {
                        tracing::debug!(
                            dir = %request.dir,
                            offset = request.offset,
                            files = page.files.as_ref().map_or(0, Vec::len),
                            "page fetched"
                        );
                        WorkerResponse::PageLoaded { request, page }
                    },
                    |reason| WorkerResponse::PageFailed { request: failed, reason },
                )
            }

            WorkerMessage::FetchDetails { path, .. } => {
                let result = self.client.details(&path);
                let failed = path.clone();
                Self::handle_client_result(
                    "fetch details",
                    result,
                    |details| WorkerResponse::DetailsLoaded { path, details },
                    |reason| WorkerResponse::DetailsFailed { path: failed, reason },
                )
            }
        }
    }

    fn run(mut self, requests: &Receiver<WorkerMessage>, responses: &Sender<WorkerResponse>) {
        tracing::debug!("worker thread started");
        for message in requests {
            let response = self.handle_message(message);
            if responses.send(response).is_err() {
                tracing::debug!("response channel closed, stopping worker");
                break;
            }
        }
        tracing::debug!("worker thread stopped");
    }
}

/// Engine-side handle to the worker thread.
///
/// Dropping the handle closes the request channel and joins the thread.
pub struct WorkerHandle {
    requests: Option<Sender<WorkerMessage>>,
    responses: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawns the worker thread around `client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn<C: ListingClient + 'static>(client: C) -> Result<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();

        let worker = ListingWorker::new(client);
        let thread = std::thread::Builder::new()
            .name("galleria-worker".to_string())
            .spawn(move || worker.run(&request_rx, &response_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            thread: Some(thread),
        })
    }

    /// Queues a message for the worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped.
    pub fn post(&self, message: WorkerMessage) -> Result<()> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| GalleryError::Worker("worker already shut down".to_string()))?;
        sender
            .send(message)
            .map_err(|_| GalleryError::Worker("worker thread is gone".to_string()))
    }

    /// Response channel, for use in a `select!` next to the runtime's other
    /// inputs. It disconnects once the worker thread has stopped.
    #[must_use]
    pub const fn responses(&self) -> &Receiver<WorkerResponse> {
        &self.responses
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }
}
