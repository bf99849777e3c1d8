//! Webhook dispatch: one multipart POST per user trigger.
//!
//! The buffer goes out as a `file` part with the target's auxiliary text
//! fields alongside. HTTP 200 is the only success; any other status or a
//! transport error is a failure whose detail (truncated) is surfaced to the
//! user. There is no retry; a failed dispatch must be re-triggered.

use std::time::Duration;

use reqwest::blocking::multipart;

use crate::models::config::PipelineConfig;
use crate::models::error::PipelineError;
use crate::models::webhook::WebhookTarget;

/// Proof that a webhook dispatch was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookReceipt {
    pub status: u16,
}

/// Blocking HTTP dispatcher with the session's fixed timeout.
pub struct Dispatcher {
    http: reqwest::blocking::Client,
    max_error_detail: usize,
}

impl Dispatcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        Ok(Self {
            http,
            max_error_detail: config.max_error_detail,
        })
    }

    /// POST `bytes` to the target as `multipart/form-data`.
    ///
    /// Validation runs first; a malformed target is refused before any
    /// network I/O happens. Exactly one attempt is made.
    pub fn post_webhook(
        &self,
        bytes: &[u8],
        filename: &str,
        mime: &str,
        target: &WebhookTarget,
    ) -> Result<WebhookReceipt, PipelineError> {
        target.validate()?;

        let part = multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| PipelineError::Encoding(e.to_string()))?;

        let mut form = multipart::Form::new().part("file", part);
        for (key, value) in &target.fields {
            form = form.text(key.clone(), value.clone());
        }

        log::debug!("dispatching {} ({} bytes) to {}", filename, bytes.len(), target.url);

        let response = self
            .http
            .post(&target.url)
            .multipart(form)
            .send()
            .map_err(|e| PipelineError::Network(truncate_detail(&e.to_string(), self.max_error_detail)))?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(WebhookReceipt { status })
        } else {
            let body = response.text().unwrap_or_default();
            log::error!("webhook returned HTTP {}", status);
            Err(PipelineError::Network(truncate_detail(
                &format!("HTTP {}: {}", status, body),
                self.max_error_detail,
            )))
        }
    }
}

/// Cap surfaced failure text at `max` characters.
fn truncate_detail(detail: &str, max: usize) -> String {
    if detail.chars().count() <= max {
        detail.to_string()
    } else {
        let cut: String = detail.chars().take(max).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::one_shot_server;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn refuses_bad_scheme_without_network() {
        // No server anywhere; validation must short-circuit before I/O.
        let target = WebhookTarget::new("ftp://bad");
        let err = dispatcher()
            .post_webhook(b"data", "clip.wav", "audio/wav", &target)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }

    #[test]
    fn refuses_short_url_without_network() {
        let target = WebhookTarget::new("ab");
        let err = dispatcher()
            .post_webhook(b"data", "clip.wav", "audio/wav", &target)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }

    #[test]
    fn http_200_yields_receipt() {
        let (url, handle) = one_shot_server(200, "ok");
        let target = WebhookTarget::new(url).field("name", "Jane");
        let receipt = dispatcher()
            .post_webhook(b"wav bytes", "clip.wav", "audio/wav", &target)
            .unwrap();
        assert_eq!(receipt.status, 200);

        let request = handle.join().unwrap();
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("clip.wav"));
        assert!(request.contains("name=\"name\""));
    }

    #[test]
    fn http_500_is_a_network_failure_with_status() {
        let (url, handle) = one_shot_server(500, "boom");
        let target = WebhookTarget::new(url);
        let err = dispatcher()
            .post_webhook(b"bytes", "clip.wav", "audio/wav", &target)
            .unwrap_err();
        handle.join().unwrap();

        match err {
            PipelineError::Network(detail) => {
                assert!(detail.contains("500"));
                assert!(detail.contains("boom"));
            }
            other => panic!("expected network failure, got {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_a_network_failure() {
        // Grab a port, then free it so nothing listens there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = WebhookTarget::new(format!("http://127.0.0.1:{port}/hook"));
        let err = dispatcher()
            .post_webhook(b"bytes", "clip.wav", "audio/wav", &target)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Network(_)));
    }

    #[test]
    fn failure_detail_is_truncated() {
        let long_body = "x".repeat(2000);
        let (url, handle) = one_shot_server(500, &long_body);
        let err = dispatcher()
            .post_webhook(b"bytes", "clip.wav", "audio/wav", &WebhookTarget::new(url))
            .unwrap_err();
        handle.join().unwrap();

        match err {
            PipelineError::Network(detail) => {
                assert!(detail.chars().count() <= 301); // limit + ellipsis
            }
            other => panic!("expected network failure, got {other:?}"),
        }
    }

    #[test]
    fn truncate_keeps_short_text_intact() {
        assert_eq!(truncate_detail("short", 300), "short");
        assert_eq!(truncate_detail(&"a".repeat(10), 5), "aaaaa…");
    }
}
