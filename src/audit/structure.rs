//! Counting primitives and page-level content checks
//!
//! Thresholds ("at least two sidebar widgets", "five posts per page") are
//! the caller's business; these functions only count and read.

use crate::document::DocumentAccess;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of elements matching `selector`
pub fn count<D: DocumentAccess + ?Sized>(doc: &D, selector: &str) -> Result<usize> {
    Ok(doc.query_all(selector)?.len())
}

pub fn exists<D: DocumentAccess + ?Sized>(doc: &D, selector: &str) -> Result<bool> {
    Ok(count(doc, selector)? > 0)
}

/// Whether at least `min` elements match `selector`
pub fn has_at_least<D: DocumentAccess + ?Sized>(doc: &D, selector: &str, min: usize) -> Result<bool> {
    Ok(count(doc, selector)? >= min)
}

/// Trimmed text of every element matching `selector`, in document order
pub fn text_contents<D: DocumentAccess + ?Sized>(doc: &D, selector: &str) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for element in doc.query_all(selector)? {
        texts.push(doc.text_content(&element)?.unwrap_or_default().trim().to_string());
    }
    Ok(texts)
}

/// Content of the first `<meta name="description">`, if any
pub fn meta_description<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Option<String>> {
    match doc.query_all("meta[name=\"description\"]")?.first() {
        Some(meta) => doc.get_attribute(meta, "content"),
        None => Ok(None),
    }
}

/// Parse a post date written as "Month DD, YYYY" (English month names)
pub fn parse_post_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%b %d, %Y"))
        .ok()
}

/// Outcome of checking that a listing runs newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateOrder {
    NewestFirst,
    /// `dates[index]` is older than `dates[index + 1]`
    OutOfOrder { index: usize },
    /// `dates[index]` is not a recognizable date
    Unparseable { index: usize },
}

/// Check that post dates are in reverse chronological order
///
/// Equal dates are in order. Fewer than two dates are trivially in order.
pub fn check_date_order<S: AsRef<str>>(dates: &[S]) -> DateOrder {
    let mut parsed = Vec::with_capacity(dates.len());
    for (index, text) in dates.iter().enumerate() {
        match parse_post_date(text.as_ref()) {
            Some(date) => parsed.push(date),
            None => return DateOrder::Unparseable { index },
        }
    }

    match parsed.windows(2).position(|pair| pair[0] < pair[1]) {
        Some(index) => DateOrder::OutOfOrder { index },
        None => DateOrder::NewestFirst,
    }
}
