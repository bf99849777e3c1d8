//! Read-only client for the external document API.
//!
//! The OAuth authorization-code exchange happens outside this crate; the
//! client only holds the resulting bearer token. Its two-valued
//! authenticated/not state is the sole gate on fetches; there is no other
//! state machine here.

use std::time::Duration;

use serde_json::Value;

use crate::models::config::PipelineConfig;
use crate::models::error::PipelineError;

const DEFAULT_ENDPOINT: &str = "https://docs.googleapis.com/v1/documents";

/// Identity and revision details of a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub document_id: String,
    pub revision_id: Option<String>,
    pub modified_time: Option<String>,
}

/// A fetched document: metadata plus the concatenated body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub body: String,
}

impl Document {
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    /// Estimated reading time at 200 words per minute.
    pub fn reading_time_minutes(&self) -> usize {
        self.word_count() / 200
    }
}

/// Authenticated read-only document fetcher.
pub struct DocsClient {
    http: reqwest::blocking::Client,
    token: Option<String>,
    endpoint: String,
    max_error_detail: usize,
}

impl DocsClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Network(e.to_string()))?;
        Ok(Self {
            http,
            token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_error_detail: config.max_error_detail,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Adopt a bearer token obtained from the external OAuth flow.
    pub fn authenticate(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Fetch a document's body text and metadata.
    ///
    /// Refused locally when not authenticated; no request is made.
    pub fn fetch(&self, document_id: &str) -> Result<Document, PipelineError> {
        let token = self.token.as_ref().ok_or(PipelineError::NotAuthenticated)?;
        if document_id.trim().is_empty() {
            return Err(PipelineError::validation("document_id", "must not be empty"));
        }

        let url = format!("{}/{}", self.endpoint, document_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().unwrap_or_default();
            let detail: String = format!("HTTP {}: {}", status, body)
                .chars()
                .take(self.max_error_detail)
                .collect();
            return Err(PipelineError::Network(detail));
        }

        let value: Value = response
            .json()
            .map_err(|e| PipelineError::Parse(e.to_string()))?;
        Ok(parse_document(&value))
    }
}

/// Build a [`Document`] from the API's JSON representation.
pub fn parse_document(value: &Value) -> Document {
    let metadata = DocumentMetadata {
        title: value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string(),
        document_id: value
            .get("documentId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        revision_id: value
            .get("revisionId")
            .and_then(Value::as_str)
            .map(str::to_string),
        modified_time: value
            .get("modifiedTime")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    Document {
        metadata,
        body: extract_body(value),
    }
}

/// Concatenate the text runs of every paragraph in the document body.
fn extract_body(value: &Value) -> String {
    let mut text = String::new();
    let elements = value
        .pointer("/body/content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for element in elements {
        let runs = element
            .pointer("/paragraph/elements")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for run in runs {
            if let Some(content) = run.pointer("/textRun/content").and_then(Value::as_str) {
                text.push_str(content);
            }
        }
    }
    text
}
