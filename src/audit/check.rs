use crate::audit::{
    AuditConfig, AuditFinding, FindingCategory, audit_broken_links, collect_headings,
    audit_images_without_alt, audit_insecure_external_links, audit_links_without_accessible_text,
    meta_description, validate_heading_hierarchy,
};
use crate::document::DocumentAccess;
use crate::error::{AuditError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named audit producing findings
pub trait Check: Send + Sync {
    /// Name used to select the check (e.g. "broken-links")
    fn name(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    fn run(&self, doc: &dyn DocumentAccess, config: &AuditConfig) -> Result<Vec<AuditFinding>>;
}

#[derive(Default)]
pub struct HeadingHierarchyCheck;

impl Check for HeadingHierarchyCheck {
    fn name(&self) -> &str {
        "heading-hierarchy"
    }

    fn description(&self) -> &str {
        "One h1 (hidden ones included), first visible heading is h1, h2 present, no duplicate headings"
    }

    fn run(&self, doc: &dyn DocumentAccess, _config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        Ok(validate_heading_hierarchy(&collect_headings(doc)?))
    }
}

#[derive(Default)]
pub struct BrokenLinksCheck;

impl Check for BrokenLinksCheck {
    fn name(&self) -> &str {
        "broken-links"
    }

    fn description(&self) -> &str {
        "Links with a missing, empty, '#' or 'null' href"
    }

    fn run(&self, doc: &dyn DocumentAccess, _config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        Ok(audit_broken_links(doc)?.iter().map(AuditFinding::broken_link).collect())
    }
}

#[derive(Default)]
pub struct LinkTextCheck;

impl Check for LinkTextCheck {
    fn name(&self) -> &str {
        "link-text"
    }

    fn description(&self) -> &str {
        "Links without text, aria-label, title or alt-bearing image"
    }

    fn run(&self, doc: &dyn DocumentAccess, _config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        Ok(audit_links_without_accessible_text(doc)?
            .iter()
            .map(AuditFinding::missing_accessible_text)
            .collect())
    }
}

#[derive(Default)]
pub struct ImageAltCheck;

impl Check for ImageAltCheck {
    fn name(&self) -> &str {
        "image-alt"
    }

    fn description(&self) -> &str {
        "Images with absent or blank alt text"
    }

    fn run(&self, doc: &dyn DocumentAccess, _config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        Ok(audit_images_without_alt(doc)?.iter().map(AuditFinding::missing_alt).collect())
    }
}

#[derive(Default)]
pub struct ExternalLinkSecurityCheck;

impl Check for ExternalLinkSecurityCheck {
    fn name(&self) -> &str {
        "external-link-security"
    }

    fn description(&self) -> &str {
        "External links opening _blank without rel=noopener"
    }

    fn run(&self, doc: &dyn DocumentAccess, config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        Ok(audit_insecure_external_links(doc, config.site_host.as_deref())?
            .iter()
            .map(AuditFinding::insecure_external_link)
            .collect())
    }
}

#[derive(Default)]
pub struct MetaDescriptionCheck;

impl Check for MetaDescriptionCheck {
    fn name(&self) -> &str {
        "meta-description"
    }

    fn description(&self) -> &str {
        "Meta description present, non-empty and within the configured length"
    }

    fn run(&self, doc: &dyn DocumentAccess, config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        let finding = match meta_description(doc)? {
            None => Some("page has no meta description".to_string()),
            Some(content) if content.trim().is_empty() => Some("meta description is empty".to_string()),
            Some(content) => {
                let len = content.trim().chars().count();
                config
                    .meta_description_length
                    .filter(|bounds| !bounds.contains(len))
                    .map(|bounds| {
                        format!(
                            "meta description is {} characters, expected {}-{}",
                            len, bounds.min, bounds.max
                        )
                    })
            }
        };

        Ok(finding
            .map(|detail| AuditFinding::new(FindingCategory::MetaDescription, detail))
            .into_iter()
            .collect())
    }
}

/// Registry of checks, run in registration order
pub struct CheckRegistry {
    checks: IndexMap<String, Box<dyn Check>>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            checks: IndexMap::new(),
        }
    }

    /// Registry with every built-in check
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HeadingHierarchyCheck);
        registry.register(BrokenLinksCheck);
        registry.register(LinkTextCheck);
        registry.register(ImageAltCheck);
        registry.register(ExternalLinkSecurityCheck);
        registry.register(MetaDescriptionCheck);
        registry
    }

    /// Register a check, replacing any check with the same name
    pub fn register<C: Check + 'static>(&mut self, check: C) {
        self.checks.insert(check.name().to_string(), Box::new(check));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Check> {
        self.checks.get(name).map(|c| c.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run one check by name
    pub fn run_check(&self, name: &str, doc: &dyn DocumentAccess, config: &AuditConfig) -> Result<Vec<AuditFinding>> {
        let check = self
            .get(name)
            .ok_or_else(|| AuditError::UnknownCheck(name.to_string()))?;
        log::debug!("Running check '{}'", name);
        check.run(doc, config)
    }

    /// Run the checks selected by `config`
    ///
    /// A check that errors is recorded as such; the remaining checks still run.
    pub fn run(&self, doc: &dyn DocumentAccess, config: &AuditConfig) -> AuditReport {
        let selected: Vec<&str> = if config.checks.is_empty() {
            self.names().collect()
        } else {
            config.checks.iter().map(String::as_str).collect()
        };

        let mut report = AuditReport::default();
        for name in selected {
            let status = match self.run_check(name, doc, config) {
                Ok(findings) if findings.is_empty() => CheckStatus::Passed,
                Ok(findings) => CheckStatus::Failed { findings },
                Err(e) => {
                    log::warn!("Check '{}' aborted: {}", name, e);
                    CheckStatus::Errored { error: e.to_string() }
                }
            };
            report.outcomes.push(CheckOutcome {
                check: name.to_string(),
                status,
            });
        }
        report
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Run every built-in check selected by `config`
pub fn run_all(doc: &dyn DocumentAccess, config: &AuditConfig) -> AuditReport {
    CheckRegistry::with_defaults().run(doc, config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed { findings: Vec<AuditFinding> },
    Errored { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: String,
    pub status: CheckStatus,
}

/// Outcomes of one audit run over one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub outcomes: Vec<CheckOutcome>,
}

impl AuditReport {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// All findings across checks
    pub fn findings(&self) -> impl Iterator<Item = &AuditFinding> {
        self.outcomes.iter().flat_map(|outcome| {
            let findings: &[AuditFinding] = match &outcome.status {
                CheckStatus::Failed { findings } => findings,
                _ => &[],
            };
            findings
        })
    }

    pub fn findings_in(&self, category: FindingCategory) -> impl Iterator<Item = &AuditFinding> {
        self.findings().filter(move |f| f.category == category)
    }

    pub fn outcome(&self, check: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    pub fn error_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, CheckStatus::Errored { .. }))
            .count()
    }

    /// No findings and no errored checks
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.status == CheckStatus::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ElementHandle, SnapshotDocument};
    use crate::dom::{BoundingBox, DomTree, ElementNode};

    fn clean_page() -> SnapshotDocument {
        let head = ElementNode::new("head").with_child(
            ElementNode::new("meta")
                .with_attribute("name", "description")
                .with_attribute("content", "Software testing, consulting and writing."),
        );
        let body = ElementNode::new("body")
            .laid_out(0.0, 0.0, 1024.0, 2000.0)
            .with_child(ElementNode::new("h1").with_text("Excelon Development").laid_out(0.0, 10.0, 800.0, 40.0))
            .with_child(ElementNode::new("h2").with_text("Testing").laid_out(0.0, 100.0, 800.0, 30.0))
            .with_child(
                ElementNode::new("a")
                    .with_attribute("href", "https://twitter.com/excelon")
                    .with_attribute("target", "_blank")
                    .with_attribute("rel", "noopener noreferrer")
                    .with_child(ElementNode::new("img").with_attribute("src", "t.png").with_attribute("alt", "Twitter")),
            );
        let tree = DomTree::new(ElementNode::new("html").with_child(head).with_child(body)).with_url("https://xndev.com/");
        SnapshotDocument::new(&tree)
    }

    fn broken_page() -> SnapshotDocument {
        let body = ElementNode::new("body")
            .with_child(ElementNode::new("h3").with_text("Search results").laid_out(0.0, 0.0, 800.0, 30.0))
            .with_child(ElementNode::new("a").with_attribute("href", "#"))
            .with_child(ElementNode::new("img").with_attribute("src", "x.png"));
        SnapshotDocument::from_root(ElementNode::new("html").with_child(body))
    }

    /// Document whose every read fails as if the page navigated away
    struct NavigatedAway;

    impl DocumentAccess for NavigatedAway {
        fn query_all(&self, _selector: &str) -> Result<Vec<ElementHandle>> {
            Err(AuditError::StaleElement("document changed".into()))
        }

        fn query_all_within(&self, _scope: &ElementHandle, _selector: &str) -> Result<Vec<ElementHandle>> {
            Err(AuditError::StaleElement("document changed".into()))
        }

        fn text_content(&self, _element: &ElementHandle) -> Result<Option<String>> {
            Err(AuditError::StaleElement("document changed".into()))
        }

        fn get_attribute(&self, _element: &ElementHandle, _name: &str) -> Result<Option<String>> {
            Err(AuditError::StaleElement("document changed".into()))
        }

        fn bounding_box(&self, _element: &ElementHandle) -> Result<Option<BoundingBox>> {
            Err(AuditError::StaleElement("document changed".into()))
        }
    }

    #[test]
    fn test_default_registry_order() {
        let registry = CheckRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "heading-hierarchy",
                "broken-links",
                "link-text",
                "image-alt",
                "external-link-security",
                "meta-description",
            ]
        );
        assert_eq!(registry.len(), 6);
        assert!(registry.get("link-text").is_some());
    }

    #[test]
    fn test_clean_page_passes() {
        let report = run_all(&clean_page(), &AuditConfig::new());
        assert!(report.is_clean(), "{:#?}", report);
        assert_eq!(report.findings().count(), 0);
    }

    #[test]
    fn test_broken_page_findings() {
        let report = run_all(&broken_page(), &AuditConfig::new());

        assert!(!report.is_clean());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.findings_in(FindingCategory::BrokenLink).count(), 1);
        assert_eq!(report.findings_in(FindingCategory::MissingAccessibleText).count(), 1);
        assert_eq!(report.findings_in(FindingCategory::MissingAlt).count(), 1);
        assert_eq!(report.findings_in(FindingCategory::HeadingHierarchyViolation).count(), 2);
        assert_eq!(report.findings_in(FindingCategory::MetaDescription).count(), 1);
        assert_eq!(
            report.outcome("external-link-security").map(|o| &o.status),
            Some(&CheckStatus::Passed)
        );
    }

    #[test]
    fn test_heading_check_counts_hidden_h1() {
        let body = ElementNode::new("body")
            .laid_out(0.0, 0.0, 1024.0, 2000.0)
            .with_child(ElementNode::new("h1").with_text("Search results"))
            .with_child(ElementNode::new("h1").with_text("Excelon").laid_out(0.0, 10.0, 800.0, 40.0))
            .with_child(ElementNode::new("h2").with_text("Sub").laid_out(0.0, 80.0, 800.0, 30.0));
        let doc = SnapshotDocument::from_root(ElementNode::new("html").with_child(body));

        let findings = CheckRegistry::with_defaults()
            .run_check("heading-hierarchy", &doc, &AuditConfig::new())
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::HeadingHierarchyViolation);
        assert!(findings[0].detail.starts_with("expected exactly one h1, found 2"));
    }

    #[test]
    fn test_selected_checks_only() {
        let config = AuditConfig::new().only(["image-alt"]);
        let report = run_all(&broken_page(), &config);

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].check, "image-alt");
    }

    #[test]
    fn test_unknown_check_is_errored_not_fatal() {
        let config = AuditConfig::new().only(["no-such-check", "broken-links"]);
        let report = run_all(&broken_page(), &config);

        assert_eq!(report.error_count(), 1);
        assert_eq!(
            report.outcome("no-such-check").map(|o| &o.status),
            Some(&CheckStatus::Errored {
                error: "Unknown check: no-such-check".to_string()
            })
        );
        assert_eq!(report.findings_in(FindingCategory::BrokenLink).count(), 1);
    }

    #[test]
    fn test_stale_document_errors_every_check() {
        let report = run_all(&NavigatedAway, &AuditConfig::new().site_host("xndev.com"));

        assert_eq!(report.outcomes.len(), 6);
        assert_eq!(report.error_count(), 6);
        assert!(report.outcomes.iter().all(|o| matches!(
            &o.status,
            CheckStatus::Errored { error } if error.starts_with("Stale element")
        )));
    }

    #[test]
    fn test_meta_description_length_bounds() {
        let config = AuditConfig::new().meta_description_length(120, 160);
        let findings = CheckRegistry::with_defaults()
            .run_check("meta-description", &clean_page(), &config)
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detail, "meta description is 41 characters, expected 120-160");
    }

    #[test]
    fn test_report_serialization() {
        let report = run_all(&broken_page(), &AuditConfig::new().only(["broken-links"])).with_url("https://xndev.com/");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["url"], "https://xndev.com/");
        assert_eq!(json["outcomes"][0]["check"], "broken-links");
        assert_eq!(json["outcomes"][0]["status"]["status"], "failed");
        assert_eq!(json["outcomes"][0]["status"]["findings"][0]["category"], "broken_link");
    }
}
