//! Document access
//!
//! The audits never talk to a browser directly. They go through
//! [`DocumentAccess`], the small capability set needed to read a loaded
//! page: query elements by selector, read text and attributes, read layout
//! geometry, and run one of a fixed set of bulk extractions.
//!
//! Bulk extractions are described by [`ExtractionRequest`] and answered with
//! an [`ExtractionResponse`], so no arbitrary code crosses into the page.
//! Implementations that cannot do better inherit
//! [`extract_with_primitives`], which answers every request with the
//! per-element calls.
//!
//! Two implementations ship with the crate:
//! - [`ChromeDocument`]: a live page in a headless Chrome tab
//! - [`SnapshotDocument`]: a captured [`DomTree`](crate::dom::DomTree)

pub mod chrome;
pub mod snapshot;

pub use chrome::ChromeDocument;
pub use snapshot::SnapshotDocument;

use crate::audit::{HeadingRecord, ImageRecord, LinkRecord};
use crate::dom::BoundingBox;
use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};

/// Opaque reference to an element of one particular document
///
/// Handles are only valid against the document that produced them. Using one
/// after the page navigated, or after the element was removed, fails with
/// [`AuditError::StaleElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub(crate) document: u64,
    pub(crate) index: usize,
}

impl ElementHandle {
    pub(crate) fn new(document: u64, index: usize) -> Self {
        Self { document, index }
    }
}

/// Bulk reads a document can answer in one round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionRequest {
    /// Every h1..h6, grouped by level then document order, visible or not
    Headings,
    /// Every anchor in document order
    Links,
    /// Every image in document order
    Images,
    /// Host name of the loaded page
    Hostname,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExtractionResponse {
    Headings(Vec<HeadingRecord>),
    Links(Vec<LinkRecord>),
    Images(Vec<ImageRecord>),
    Hostname(Option<String>),
}

impl ExtractionResponse {
    fn kind(&self) -> &'static str {
        match self {
            ExtractionResponse::Headings(_) => "headings",
            ExtractionResponse::Links(_) => "links",
            ExtractionResponse::Images(_) => "images",
            ExtractionResponse::Hostname(_) => "hostname",
        }
    }

    fn mismatch(self, expected: &str) -> AuditError {
        AuditError::EvaluationFailed(format!(
            "expected a {} extraction, got {}",
            expected,
            self.kind()
        ))
    }

    pub fn into_headings(self) -> Result<Vec<HeadingRecord>> {
        match self {
            ExtractionResponse::Headings(records) => Ok(records),
            other => Err(other.mismatch("headings")),
        }
    }

    pub fn into_links(self) -> Result<Vec<LinkRecord>> {
        match self {
            ExtractionResponse::Links(records) => Ok(records),
            other => Err(other.mismatch("links")),
        }
    }

    pub fn into_images(self) -> Result<Vec<ImageRecord>> {
        match self {
            ExtractionResponse::Images(records) => Ok(records),
            other => Err(other.mismatch("images")),
        }
    }

    pub fn into_hostname(self) -> Result<Option<String>> {
        match self {
            ExtractionResponse::Hostname(host) => Ok(host),
            other => Err(other.mismatch("hostname")),
        }
    }
}

/// Read access to a loaded page
pub trait DocumentAccess {
    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Descendants of `scope` matching `selector`, in document order
    fn query_all_within(&self, scope: &ElementHandle, selector: &str) -> Result<Vec<ElementHandle>>;

    /// DOM `textContent` of the element
    fn text_content(&self, element: &ElementHandle) -> Result<Option<String>>;

    /// Attribute value, `None` when the attribute is absent
    fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Layout box of the element, `None` when it is not laid out
    fn bounding_box(&self, element: &ElementHandle) -> Result<Option<BoundingBox>>;

    /// Answer a bulk extraction request
    fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse> {
        extract_with_primitives(self, request)
    }
}

/// Answer an extraction request with one round trip per element read
pub fn extract_with_primitives<D: DocumentAccess + ?Sized>(
    doc: &D,
    request: &ExtractionRequest,
) -> Result<ExtractionResponse> {
    match request {
        ExtractionRequest::Headings => {
            let mut records = Vec::new();
            for level in 1..=6u8 {
                for element in doc.query_all(&format!("h{}", level))? {
                    let text = doc.text_content(&element)?.unwrap_or_default();
                    let layout = doc.bounding_box(&element)?;
                    records.push(HeadingRecord {
                        level,
                        text: text.trim().to_string(),
                        visible: layout.is_some(),
                        vertical_position: layout.map_or(0.0, |b| b.y),
                    });
                }
            }
            Ok(ExtractionResponse::Headings(records))
        }
        ExtractionRequest::Links => {
            let mut records = Vec::new();
            for anchor in doc.query_all("a")? {
                let mut has_image_with_alt = false;
                for image in doc.query_all_within(&anchor, "img[alt]")? {
                    if doc
                        .get_attribute(&image, "alt")?
                        .is_some_and(|alt| !alt.trim().is_empty())
                    {
                        has_image_with_alt = true;
                        break;
                    }
                }

                records.push(LinkRecord {
                    href: doc.get_attribute(&anchor, "href")?,
                    text: doc.text_content(&anchor)?.unwrap_or_default().trim().to_string(),
                    aria_label: doc.get_attribute(&anchor, "aria-label")?,
                    title: doc.get_attribute(&anchor, "title")?,
                    target: doc.get_attribute(&anchor, "target")?,
                    rel: doc.get_attribute(&anchor, "rel")?,
                    has_image_with_alt,
                });
            }
            Ok(ExtractionResponse::Links(records))
        }
        ExtractionRequest::Images => {
            let mut records = Vec::new();
            for image in doc.query_all("img")? {
                records.push(ImageRecord {
                    src: doc.get_attribute(&image, "src")?,
                    alt: doc.get_attribute(&image, "alt")?,
                });
            }
            Ok(ExtractionResponse::Images(records))
        }
        ExtractionRequest::Hostname => Ok(ExtractionResponse::Hostname(None)),
    }
}
