//! # uplink-core
//!
//! Capture-to-sink pipeline core.
//!
//! Takes byte buffers from user-facing capture controls (a microphone
//! recorder widget, a CSV file picker), normalizes them (WAV framing,
//! tabular type inference), and dispatches them to exactly one sink per
//! user trigger: a browser download, a local temp-file round trip, or a
//! webhook POST. Every completed dispatch lands in an in-memory session
//! ledger.
//!
//! ## Architecture
//!
//! ```text
//! uplink-core (this crate)
//! ├── models/     ← PipelineError, CaptureResult, AudioFormat, UploadRecord,
//! │                 WebhookTarget, PipelineConfig
//! ├── capture/    ← CaptureSource trait, WidgetBridge shared-slot adapter
//! ├── transform/  ← WAV framing, Dataset load + type inference + stats,
//! │                 export serializers
//! ├── sink/       ← download attachment, local round trip, webhook POST
//! ├── session/    ← SessionLedger, SessionContext, Action/Effect loop
//! └── docs/       ← authenticated read-only document fetches
//! ```
//!
//! One action executes at a time: capture adapter → transform → sink →
//! ledger, a linear handoff with no feedback loop.

pub mod capture;
pub mod docs;
pub mod models;
pub mod session;
pub mod sink;
pub mod transform;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types at crate root for convenience.
pub use capture::bridge::WidgetBridge;
pub use capture::source::CaptureSource;
pub use docs::client::{DocsClient, Document, DocumentMetadata};
pub use models::capture::{CaptureResult, MediaKind};
pub use models::config::{AudioFormat, PipelineConfig};
pub use models::error::PipelineError;
pub use models::record::{Destination, UploadRecord};
pub use models::webhook::WebhookTarget;
pub use session::actions::{Action, ActionQueue, Effect};
pub use session::context::SessionContext;
pub use session::ledger::{LedgerTotals, SessionLedger};
pub use sink::download::Attachment;
pub use sink::local::with_local_copy;
pub use sink::webhook::{Dispatcher, WebhookReceipt};
pub use transform::dataset::{Column, ColumnType, Dataset, LoadOptions};
pub use transform::export::ExportFormat;
