//! The session's explicit event loop.
//!
//! User interactions become [`Action`]s on a queue, consumed one at a time;
//! each action runs to completion against the session context before the
//! next starts, so at most one dispatch is ever outstanding and the ledger
//! needs no locking. A failed action is fully re-triggerable and leaves the
//! ledger and any loaded dataset exactly as they were.

use std::collections::VecDeque;

use super::context::SessionContext;
use crate::models::capture::CaptureResult;
use crate::models::error::PipelineError;
use crate::models::record::{buffer_checksum, Destination, UploadRecord};
use crate::models::webhook::WebhookTarget;
use crate::sink::download::Attachment;
use crate::transform::dataset::{Dataset, LoadOptions};
use crate::transform::export::{self, ExportFormat};
use crate::transform::wav;

/// One user-triggered operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Adopt a capture produced by an adapter (recorder widget, upload).
    SetCapture(CaptureResult),

    /// Parse CSV bytes from the file-picker into the current capture.
    LoadTable {
        name: String,
        bytes: Vec<u8>,
        options: LoadOptions,
    },

    /// Deliver the current capture to the browser as a named attachment.
    Download { basename: String },

    /// Deliver the current capture to a user-supplied webhook.
    SendWebhook {
        basename: String,
        target: WebhookTarget,
    },

    /// Deliver the loaded dataset in an export format.
    Export {
        basename: String,
        format: ExportFormat,
    },

    ClearCapture,
    ClearHistory,
}

/// Observable side effect of a completed action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Attachment(Attachment),
    Delivered { status: u16 },
}

/// Apply one action to the session. Pure routing: (state, action) → (state,
/// effects); all I/O happens through the sinks.
pub fn apply(ctx: &mut SessionContext, action: Action) -> Result<Vec<Effect>, PipelineError> {
    match action {
        Action::SetCapture(result) => {
            ctx.capture = result;
            Ok(Vec::new())
        }

        Action::LoadTable {
            name,
            bytes,
            options,
        } => {
            // Atomic: a parse failure leaves the previous capture in place.
            let dataset = Dataset::from_csv(&bytes, &options)?;
            log::debug!("loaded {}: {} rows", name, dataset.row_count());
            ctx.capture = CaptureResult::Table { name, dataset };
            Ok(Vec::new())
        }

        Action::Download { basename } => {
            let (bytes, filename, mime) = render_capture(ctx, &basename)?;
            let quantity = ctx.capture.quantity();
            let checksum = buffer_checksum(&bytes);
            let attachment = Attachment::new(&filename, mime, bytes);

            ctx.ledger.append(UploadRecord::new(
                &filename,
                quantity,
                attachment.size_bytes(),
                Destination::Download,
                &checksum,
            ));
            Ok(vec![Effect::Attachment(attachment)])
        }

        Action::SendWebhook { basename, target } => {
            let (bytes, filename, mime) = render_capture(ctx, &basename)?;
            let target = augment_target(target, &ctx.capture);

            let receipt = ctx.dispatcher.post_webhook(&bytes, &filename, mime, &target)?;

            ctx.ledger.append(UploadRecord::new(
                &filename,
                ctx.capture.quantity(),
                bytes.len() as u64,
                Destination::Webhook,
                &buffer_checksum(&bytes),
            ));
            Ok(vec![Effect::Delivered {
                status: receipt.status,
            }])
        }

        Action::Export { basename, format } => {
            let dataset = ctx
                .dataset()
                .ok_or_else(|| PipelineError::CaptureUnavailable("no dataset loaded".into()))?;
            let bytes = export::export(dataset, format)?;
            let filename = format!("{}.{}", basename, format.extension());
            let checksum = buffer_checksum(&bytes);
            let quantity = dataset.row_count() as f64;
            let attachment = Attachment::new(&filename, format.mime(), bytes);

            ctx.ledger.append(UploadRecord::new(
                &filename,
                quantity,
                attachment.size_bytes(),
                Destination::Download,
                &checksum,
            ));
            Ok(vec![Effect::Attachment(attachment)])
        }

        Action::ClearCapture => {
            ctx.clear_capture();
            Ok(Vec::new())
        }

        Action::ClearHistory => {
            ctx.clear_history();
            Ok(Vec::new())
        }
    }
}

/// Render the current capture into dispatchable bytes + filename + MIME.
fn render_capture(
    ctx: &SessionContext,
    basename: &str,
) -> Result<(Vec<u8>, String, &'static str), PipelineError> {
    match &ctx.capture {
        CaptureResult::Empty => Err(PipelineError::CaptureUnavailable(
            "no capture to dispatch".into(),
        )),
        CaptureResult::Audio { pcm, format } => {
            let bytes = wav::wrap_pcm(pcm, format)?;
            Ok((bytes, format!("{basename}.wav"), "audio/wav"))
        }
        CaptureResult::Table { dataset, .. } => {
            let bytes = export::to_csv(dataset)?;
            Ok((bytes, format!("{basename}.csv"), "text/csv"))
        }
    }
}

/// Add the capture's descriptive fields to the outgoing form, without
/// overriding anything the user supplied.
fn augment_target(mut target: WebhookTarget, capture: &CaptureResult) -> WebhookTarget {
    let mut add = |key: &str, value: String| {
        if !target.fields.iter().any(|(k, _)| k == key) {
            target.fields.push((key.to_string(), value));
        }
    };

    add("timestamp", chrono::Utc::now().to_rfc3339());
    match capture {
        CaptureResult::Audio { format, .. } => {
            add("duration", format!("{:.3}", capture.quantity()));
            add("sample_rate", format.sample_rate.to_string());
        }
        CaptureResult::Table { dataset, .. } => {
            add("row_count", dataset.row_count().to_string());
        }
        CaptureResult::Empty => {}
    }
    target
}

/// FIFO queue of pending actions, drained one at a time.
#[derive(Default)]
pub struct ActionQueue {
    pending: VecDeque<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consume every queued action in order. Each action's outcome stands
    /// alone; a failure does not stop the actions behind it.
    pub fn drain(
        &mut self,
        ctx: &mut SessionContext,
    ) -> Vec<Result<Vec<Effect>, PipelineError>> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(action) = self.pending.pop_front() {
            outcomes.push(apply(ctx, action));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{AudioFormat, PipelineConfig};
    use crate::testutil::one_shot_server;
    use approx::assert_relative_eq;

    fn context() -> SessionContext {
        SessionContext::new(PipelineConfig::default()).unwrap()
    }

    fn five_second_clip() -> CaptureResult {
        // 5 seconds at 44100 Hz, 16-bit mono.
        CaptureResult::audio(vec![0u8; 441_000], AudioFormat::default())
    }

    #[test]
    fn record_save_clear_scenario() {
        let mut ctx = context();
        let mut queue = ActionQueue::new();
        queue.push(Action::SetCapture(five_second_clip()));
        queue.push(Action::Download {
            basename: "session".into(),
        });

        let outcomes = queue.drain(&mut ctx);
        assert!(outcomes.iter().all(|o| o.is_ok()));

        let records = ctx.ledger.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "session.wav");
        assert_relative_eq!(records[0].quantity, 5.0, max_relative = 1e-9);
        assert_eq!(records[0].destination, Destination::Download);

        apply(&mut ctx, Action::ClearHistory).unwrap();
        assert!(ctx.ledger.is_empty());
        assert_relative_eq!(ctx.ledger.totals().total_quantity, 0.0);
    }

    #[test]
    fn download_yields_wav_attachment() {
        let mut ctx = context();
        apply(&mut ctx, Action::SetCapture(five_second_clip())).unwrap();
        let effects = apply(
            &mut ctx,
            Action::Download {
                basename: "clip".into(),
            },
        )
        .unwrap();

        let [Effect::Attachment(attachment)] = &effects[..] else {
            panic!("expected one attachment effect");
        };
        assert_eq!(attachment.filename, "clip.wav");
        assert_eq!(attachment.mime, "audio/wav");
        // 44-byte header + PCM payload.
        assert_eq!(attachment.bytes.len(), 44 + 441_000);
    }

    #[test]
    fn download_with_no_capture_is_refused() {
        let mut ctx = context();
        let err = apply(
            &mut ctx,
            Action::Download {
                basename: "clip".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::CaptureUnavailable(_)));
        assert!(ctx.ledger.is_empty());
    }

    #[test]
    fn webhook_200_appends_exactly_one_record() {
        let mut ctx = context();
        apply(&mut ctx, Action::SetCapture(five_second_clip())).unwrap();

        let (url, handle) = one_shot_server(200, "ok");
        let effects = apply(
            &mut ctx,
            Action::SendWebhook {
                basename: "clip".into(),
                target: WebhookTarget::new(url).field("name", "Jane"),
            },
        )
        .unwrap();
        let request = handle.join().unwrap();

        assert_eq!(effects, vec![Effect::Delivered { status: 200 }]);
        assert_eq!(ctx.ledger.all().len(), 1);
        assert_eq!(ctx.ledger.all()[0].destination, Destination::Webhook);

        // Descriptive fields ride along with the file part.
        assert!(request.contains("name=\"duration\""));
        assert!(request.contains("name=\"sample_rate\""));
        assert!(request.contains("name=\"timestamp\""));
    }

    #[test]
    fn webhook_500_appends_no_record() {
        let mut ctx = context();
        apply(&mut ctx, Action::SetCapture(five_second_clip())).unwrap();

        let (url, handle) = one_shot_server(500, "boom");
        let err = apply(
            &mut ctx,
            Action::SendWebhook {
                basename: "clip".into(),
                target: WebhookTarget::new(url),
            },
        )
        .unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, PipelineError::Network(_)));
        assert!(ctx.ledger.is_empty());
        // The capture is still there to re-trigger.
        assert!(!ctx.capture.is_empty());
    }

    #[test]
    fn invalid_target_is_refused_with_no_side_effects() {
        let mut ctx = context();
        apply(&mut ctx, Action::SetCapture(five_second_clip())).unwrap();

        for bad in ["ftp://bad", "ab"] {
            let err = apply(
                &mut ctx,
                Action::SendWebhook {
                    basename: "clip".into(),
                    target: WebhookTarget::new(bad),
                },
            )
            .unwrap_err();
            assert!(matches!(err, PipelineError::Validation { .. }));
        }
        assert!(ctx.ledger.is_empty());
    }

    #[test]
    fn load_table_and_export_json() {
        let mut ctx = context();
        apply(
            &mut ctx,
            Action::LoadTable {
                name: "books.csv".into(),
                bytes: b"title,pages\nDune,412\nEmma,474\n".to_vec(),
                options: LoadOptions::default(),
            },
        )
        .unwrap();
        assert_eq!(ctx.dataset().unwrap().row_count(), 2);

        let effects = apply(
            &mut ctx,
            Action::Export {
                basename: "books".into(),
                format: ExportFormat::Json,
            },
        )
        .unwrap();

        let [Effect::Attachment(attachment)] = &effects[..] else {
            panic!("expected one attachment effect");
        };
        assert_eq!(attachment.filename, "books.json");
        assert_eq!(ctx.ledger.all().len(), 1);
        assert_relative_eq!(ctx.ledger.all()[0].quantity, 2.0);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut ctx = context();
        apply(
            &mut ctx,
            Action::LoadTable {
                name: "ok.csv".into(),
                bytes: b"a,b\n1,2\n".to_vec(),
                options: LoadOptions::default(),
            },
        )
        .unwrap();

        let err = apply(
            &mut ctx,
            Action::LoadTable {
                name: "broken.csv".into(),
                bytes: b"a,b\n1,2\n3\n".to_vec(),
                options: LoadOptions::default(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));

        // The earlier table is untouched.
        assert_eq!(ctx.dataset().unwrap().row_count(), 1);
    }

    #[test]
    fn queue_keeps_going_after_a_failed_action() {
        let mut ctx = context();
        let mut queue = ActionQueue::new();
        queue.push(Action::Download {
            basename: "nothing".into(),
        }); // fails: no capture
        queue.push(Action::SetCapture(five_second_clip()));
        queue.push(Action::Download {
            basename: "clip".into(),
        });

        let outcomes = queue.drain(&mut ctx);
        assert!(outcomes[0].is_err());
        assert!(outcomes[1].is_ok());
        assert!(outcomes[2].is_ok());
        assert_eq!(ctx.ledger.all().len(), 1);
        assert!(queue.is_empty());
    }
}
