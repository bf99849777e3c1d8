use super::ledger::SessionLedger;
use crate::docs::client::DocsClient;
use crate::models::capture::CaptureResult;
use crate::models::config::PipelineConfig;
use crate::models::error::PipelineError;
use crate::sink::webhook::Dispatcher;
use crate::transform::dataset::Dataset;

/// Everything one page session owns, passed explicitly to every operation.
///
/// Created empty at session start, dropped at session end; no state lives
/// outside it.
pub struct SessionContext {
    pub config: PipelineConfig,
    pub ledger: SessionLedger,
    pub capture: CaptureResult,
    pub docs: DocsClient,
    pub(crate) dispatcher: Dispatcher,
}

impl SessionContext {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::validation("config", e))?;
        let dispatcher = Dispatcher::new(&config)?;
        let docs = DocsClient::new(&config)?;
        Ok(Self {
            config,
            ledger: SessionLedger::new(),
            capture: CaptureResult::Empty,
            docs,
            dispatcher,
        })
    }

    /// The loaded dataset, when the current capture is tabular.
    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.capture {
            CaptureResult::Table { dataset, .. } => Some(dataset),
            _ => None,
        }
    }

    pub fn clear_capture(&mut self) {
        self.capture = CaptureResult::Empty;
    }

    pub fn clear_history(&mut self) {
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ctx = SessionContext::new(PipelineConfig::default()).unwrap();
        assert!(ctx.capture.is_empty());
        assert!(ctx.ledger.is_empty());
        assert!(ctx.dataset().is_none());
        assert!(!ctx.docs.is_authenticated());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PipelineConfig {
            webhook_timeout_secs: 0,
            ..Default::default()
        };
        assert!(SessionContext::new(config).is_err());
    }
}
