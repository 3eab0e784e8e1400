use crate::audit::{ImageRecord, LinkRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of problem a finding reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    BrokenLink,
    MissingAccessibleText,
    MissingAlt,
    InsecureExternalLink,
    DuplicateHeading,
    HeadingHierarchyViolation,
    MetaDescription,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingCategory::BrokenLink => "broken link",
            FindingCategory::MissingAccessibleText => "missing accessible text",
            FindingCategory::MissingAlt => "missing alt",
            FindingCategory::InsecureExternalLink => "insecure external link",
            FindingCategory::DuplicateHeading => "duplicate heading",
            FindingCategory::HeadingHierarchyViolation => "heading hierarchy violation",
            FindingCategory::MetaDescription => "meta description",
        };
        f.write_str(name)
    }
}

/// A single problem found by an audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub category: FindingCategory,
    pub detail: String,
}

impl AuditFinding {
    pub fn new(category: FindingCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: detail.into(),
        }
    }

    pub fn broken_link(link: &LinkRecord) -> Self {
        let href = match link.href.as_deref() {
            Some(href) => format!("href=\"{}\"", href),
            None => "no href".to_string(),
        };
        Self::new(
            FindingCategory::BrokenLink,
            format!("link \"{}\" has {}", link.text, href),
        )
    }

    pub fn missing_accessible_text(link: &LinkRecord) -> Self {
        Self::new(
            FindingCategory::MissingAccessibleText,
            format!(
                "link to {} has no text, aria-label, title or alt-bearing image",
                link.href.as_deref().unwrap_or("no href")
            ),
        )
    }

    pub fn insecure_external_link(link: &LinkRecord) -> Self {
        Self::new(
            FindingCategory::InsecureExternalLink,
            format!(
                "link \"{}\" to {} opens _blank without rel=noopener (rel={})",
                link.text,
                link.href.as_deref().unwrap_or_default(),
                link.rel.as_deref().unwrap_or("none")
            ),
        )
    }

    pub fn missing_alt(image: &ImageRecord) -> Self {
        let alt = if image.alt.is_some() { "blank alt" } else { "no alt attribute" };
        Self::new(
            FindingCategory::MissingAlt,
            format!("image {} has {}", image.src.as_deref().unwrap_or("without src"), alt),
        )
    }
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.detail)
    }
}
