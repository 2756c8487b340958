//! Tracing with local file export.
//!
//! ```text
//! tracing ─┬─ fmt layer ─────────────────────────────────→ galleria.log
//!          └─ tracing-opentelemetry → SDK → FileSpanExporter → galleria-otlp.json
//! ```
//!
//! Both files live in the data directory and rotate at 10 MB, keeping three
//! backups. Worker messages carry a trace context, so spans recorded on the
//! worker thread join the trace of the event that posted them.
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - `tracer`: Tracer provider and file span exporter
//! - `span_formatter`: Span to JSON line conversion
//! - `file_writer`: Rotating file writer shared by both outputs

mod file_writer;
pub mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
