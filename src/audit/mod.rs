//! Content and markup audits
//!
//! Every audit takes the document explicitly and reads it fresh on each call;
//! nothing is cached between calls, so auditing an unchanged page twice gives
//! the same ordered result. Errors from the document layer propagate
//! unchanged: a read that fails mid-audit aborts that audit only.
//!
//! - [`audit_heading_hierarchy`] / [`validate_heading_hierarchy`]: headings in visual order
//!   ([`collect_headings`] keeps hidden ones for the h1 count)
//! - [`audit_broken_links`], [`audit_links_without_accessible_text`],
//!   [`audit_insecure_external_links`]: anchor classification
//! - [`audit_images_without_alt`]: alt text
//! - [`structure`]: counting primitives, meta description, post date order
//! - [`CheckRegistry`] / [`run_all`]: named checks producing an [`AuditReport`]

pub mod check;
pub mod config;
pub mod finding;
pub mod headings;
pub mod images;
pub mod links;
pub mod records;
pub mod structure;

pub use check::{AuditReport, Check, CheckOutcome, CheckRegistry, CheckStatus, run_all};
pub use config::{AuditConfig, LengthBounds};
pub use finding::{AuditFinding, FindingCategory};
pub use headings::{audit_heading_hierarchy, collect_headings, validate_heading_hierarchy};
pub use images::audit_images_without_alt;
pub use links::{
    audit_broken_links, audit_insecure_external_links, audit_links_without_accessible_text, collect_links,
    resolve_hostname,
};
pub use records::{HeadingRecord, ImageRecord, LinkRecord};
pub use structure::{DateOrder, check_date_order, count, exists, has_at_least, meta_description, parse_post_date, text_contents};
