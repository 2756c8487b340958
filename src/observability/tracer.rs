//! OpenTelemetry tracer provider exporting spans to a local file.
//!
//! A custom `SpanExporter` appends each finished span as one JSON line to a
//! rotating file instead of sending it to a collector.

use super::file_writer::FileWriter;
use super::span_formatter::SpanFormatter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// File-based OpenTelemetry span exporter.
struct FileSpanExporter {
    writer: Arc<FileWriter>,
    formatter: SpanFormatter,
    /// Set by `shutdown`; exports after it fail.
    is_shutdown: AtomicBool,
}

impl FileSpanExporter {
    fn new(writer: Arc<FileWriter>, resource: &Resource) -> Self {
        Self {
            writer,
            formatter: SpanFormatter::new(resource),
            is_shutdown: AtomicBool::new(false),
        }
    }

    fn write_batch(&self, batch: &[SpanData]) -> std::io::Result<()> {
        for span in batch {
            self.writer.write_line(&self.formatter.format_span(span).to_string())?;
        }
        Ok(())
    }
}

impl SpanExporter for FileSpanExporter {
    /// Writes every span of the batch, one line each.
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let result = self
            .write_batch(&batch)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, res: &Resource) {
        self.formatter = SpanFormatter::new(res);
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("writer", &self.writer)
            .field("formatter", &self.formatter)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Creates a tracer provider exporting through `writer`.
///
/// Spans are exported as soon as they end (simple processor, no batching), so
/// nothing is lost when the process exits without an orderly shutdown.
pub fn create_tracer_provider(writer: Arc<FileWriter>, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter::new(writer, &resource);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
