use once_cell::sync::Lazy;
use regex::Regex;

use super::error::PipelineError;

/// Shortest URL accepted by the dispatcher. Chosen so that an obviously
/// truncated value like `"ab"` is refused before the scheme check runs.
const MIN_URL_LEN: usize = 8;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("email regex failed to compile: {e}"))
});

/// A user-supplied webhook destination, validated before any network call.
///
/// Never stored past the session; each dispatch takes a fresh target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,

    /// Auxiliary text fields sent alongside the file part (name, email, ...).
    pub fields: Vec<(String, String)>,
}

impl WebhookTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Checks URL length, scheme prefix, and the shape of any `email` field.
    ///
    /// Failure means the dispatch is refused outright; no request is made.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.url.len() < MIN_URL_LEN {
            return Err(PipelineError::validation("url", "too short"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(PipelineError::validation(
                "url",
                "must start with http:// or https://",
            ));
        }
        for (key, value) in &self.fields {
            if key == "email" && !EMAIL_SHAPE.is_match(value) {
                return Err(PipelineError::validation("email", "not a valid address"));
            }
        }
        Ok(())
    }
}
