//! # markup-audit
//!
//! Content and markup auditing for web pages: heading hierarchy, broken
//! links, accessible link text, image alt text and external link security.
//!
//! ## Features
//!
//! - **Audits**: pure inspection routines returning records and findings
//! - **Document access**: one small trait over a loaded page, with a live
//!   Chrome implementation (CDP) and an in-memory snapshot implementation
//! - **Snapshots**: capture a page once, save it as JSON, audit it offline
//! - **CLI**: `markup-audit <url>` prints a JSON report (feature `cli`)
//!
//! ## Auditing a live page
//!
//! ```rust,no_run
//! use markup_audit::{AuditConfig, BrowserSession, LaunchOptions};
//! use markup_audit::audit::{audit_broken_links, audit_heading_hierarchy, run_all};
//!
//! # fn main() -> markup_audit::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//!
//! let config = AuditConfig::new().site_host("example.com");
//! let doc = session.document(config.timeout())?;
//!
//! for heading in audit_heading_hierarchy(&doc)? {
//!     println!("h{} {}", heading.level, heading.text);
//! }
//! println!("{} broken links", audit_broken_links(&doc)?.len());
//!
//! let report = run_all(&doc, &config);
//! println!("clean: {}", report.is_clean());
//! # Ok(())
//! # }
//! ```
//!
//! ## Auditing a snapshot
//!
//! ```rust
//! use markup_audit::{DomTree, ElementNode, SnapshotDocument};
//! use markup_audit::audit::audit_images_without_alt;
//!
//! # fn main() -> markup_audit::Result<()> {
//! let body = ElementNode::new("body")
//!     .with_child(ElementNode::new("img").with_attribute("src", "x.png"))
//!     .with_child(ElementNode::new("img").with_attribute("src", "y.png").with_attribute("alt", "desc"));
//! let doc = SnapshotDocument::new(&DomTree::new(ElementNode::new("html").with_child(body)));
//!
//! let missing = audit_images_without_alt(&doc)?;
//! assert_eq!(missing.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`audit`]: the audits, findings, check registry and reports
//! - [`document`]: the [`DocumentAccess`] trait and its implementations
//! - [`dom`]: snapshot representation and the selector subset used to query it
//! - [`browser`]: Chrome session management and configuration
//! - [`error`]: Error types and result aliases

pub mod audit;
pub mod browser;
pub mod document;
pub mod dom;
pub mod error;

pub use audit::{AuditConfig, AuditFinding, AuditReport, FindingCategory, HeadingRecord, ImageRecord, LinkRecord};
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use document::{ChromeDocument, DocumentAccess, ElementHandle, ExtractionRequest, ExtractionResponse, SnapshotDocument};
pub use dom::{BoundingBox, DomTree, ElementNode, Selector};
pub use error::{AuditError, Result};
