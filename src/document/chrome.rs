use crate::document::{DocumentAccess, ElementHandle, ExtractionRequest, ExtractionResponse};
use crate::dom::BoundingBox;
use crate::error::{AuditError, Result};
use headless_chrome::Tab;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};

const QUERY_JS: &str = include_str!("js/query.js");
const READ_JS: &str = include_str!("js/read.js");
const HEADINGS_JS: &str = include_str!("js/headings.js");
const LINKS_JS: &str = include_str!("js/links.js");
const IMAGES_JS: &str = include_str!("js/images.js");
const HOSTNAME_JS: &str = "JSON.stringify({ ok: window.location.hostname || null })";

/// Envelope every page-side script answers with
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PageReply<T> {
    Ok(T),
    Stale(String),
    InvalidSelector(String),
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct QueryReply {
    document: u64,
    indices: Vec<usize>,
}

/// A live page in a Chrome tab
///
/// Elements returned by queries stay registered inside the page under a
/// per-document token. A navigation replaces the page's globals, so every
/// handle collected before it reads as stale afterwards.
pub struct ChromeDocument {
    tab: Arc<Tab>,
    timeout: Duration,
}

impl ChromeDocument {
    pub fn new(tab: Arc<Tab>, timeout: Duration) -> Self {
        tab.set_default_timeout(timeout);
        Self { tab, timeout }
    }

    /// The tab this document reads from
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn call<T: DeserializeOwned>(&self, operation: &str, script: &str) -> Result<PageReply<T>> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| classify_error(operation, self.timeout, e))?;

        let json_value = result
            .value
            .ok_or_else(|| AuditError::EvaluationFailed(format!("{}: no value returned", operation)))?;

        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| AuditError::EvaluationFailed(format!("{}: expected a JSON string: {}", operation, e)))?;

        serde_json::from_str(&json_str)
            .map_err(|e| AuditError::EvaluationFailed(format!("{}: malformed reply: {}", operation, e)))
    }

    fn read<T: DeserializeOwned>(&self, operation: &str, script: &str) -> Result<T> {
        match self.call(operation, script)? {
            PageReply::Ok(value) => Ok(value),
            PageReply::Stale(reason) => Err(AuditError::StaleElement(format!("{}: {}", operation, reason))),
            PageReply::InvalidSelector(reason) | PageReply::Failed(reason) => {
                Err(AuditError::EvaluationFailed(format!("{}: {}", operation, reason)))
            }
        }
    }

    fn query(&self, selector: &str, scope: Option<&ElementHandle>) -> Result<Vec<ElementHandle>> {
        let script = format!(
            "{}({}, {})",
            QUERY_JS.trim_end(),
            serde_json::to_string(selector)?,
            serde_json::to_string(&scope)?
        );

        match self.call::<QueryReply>("query", &script)? {
            PageReply::Ok(reply) => {
                log::debug!("'{}' matched {} elements", selector, reply.indices.len());
                Ok(reply
                    .indices
                    .into_iter()
                    .map(|index| ElementHandle::new(reply.document, index))
                    .collect())
            }
            PageReply::InvalidSelector(reason) => Err(AuditError::invalid_selector(selector, reason)),
            PageReply::Stale(reason) => Err(AuditError::StaleElement(format!("query '{}': {}", selector, reason))),
            PageReply::Failed(reason) => Err(AuditError::EvaluationFailed(format!("query '{}': {}", selector, reason))),
        }
    }

    fn read_element<T: DeserializeOwned>(&self, element: &ElementHandle, op: &str, name: Option<&str>) -> Result<T> {
        let script = format!(
            "{}({}, {}, {})",
            READ_JS.trim_end(),
            serde_json::to_string(element)?,
            serde_json::to_string(op)?,
            serde_json::to_string(&name)?
        );
        self.read(op, &script)
    }
}

impl DocumentAccess for ChromeDocument {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.query(selector, None)
    }

    fn query_all_within(&self, scope: &ElementHandle, selector: &str) -> Result<Vec<ElementHandle>> {
        self.query(selector, Some(scope))
    }

    fn text_content(&self, element: &ElementHandle) -> Result<Option<String>> {
        self.read_element(element, "text", None)
    }

    fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.read_element(element, "attribute", Some(name))
    }

    fn bounding_box(&self, element: &ElementHandle) -> Result<Option<BoundingBox>> {
        self.read_element(element, "box", None)
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse> {
        log::debug!("Extracting {:?} in page context", request);
        Ok(match request {
            ExtractionRequest::Headings => ExtractionResponse::Headings(self.read("headings", HEADINGS_JS)?),
            ExtractionRequest::Links => ExtractionResponse::Links(self.read("links", LINKS_JS)?),
            ExtractionRequest::Images => ExtractionResponse::Images(self.read("images", IMAGES_JS)?),
            ExtractionRequest::Hostname => ExtractionResponse::Hostname(self.read("hostname", HOSTNAME_JS)?),
        })
    }
}

/// Map a CDP failure onto the audit error taxonomy
fn classify_error(operation: &str, timeout: Duration, err: anyhow::Error) -> AuditError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("timeout") || lower.contains("never came") {
        AuditError::EvaluationTimeout(format!("{} did not answer within {:?}: {}", operation, timeout, message))
    } else if lower.contains("no node")
        || lower.contains("context was destroyed")
        || lower.contains("cannot find context")
    {
        AuditError::StaleElement(format!("{}: {}", operation, message))
    } else {
        AuditError::EvaluationFailed(format!("{}: {}", operation, message))
    }
}
