use crate::audit::{AuditFinding, FindingCategory, HeadingRecord};
use crate::document::{DocumentAccess, ExtractionRequest};
use crate::error::Result;
use indexmap::IndexMap;

/// Every h1-h6 element, hidden ones included, in level-then-DOM order
pub fn collect_headings<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<HeadingRecord>> {
    doc.extract(&ExtractionRequest::Headings)?.into_headings()
}

/// Visible headings in visual order (top to bottom)
///
/// Headings that are not laid out are dropped. The sort is stable, so
/// headings sharing a vertical position keep level-then-DOM order. A
/// zero-area heading still has a layout box and is kept.
pub fn audit_heading_hierarchy<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<HeadingRecord>> {
    let all = collect_headings(doc)?;
    let headings: Vec<HeadingRecord> = visual_order(all.iter()).into_iter().cloned().collect();
    log::debug!("Found {} visible headings", headings.len());
    Ok(headings)
}

fn visual_order<'a>(headings: impl Iterator<Item = &'a HeadingRecord>) -> Vec<&'a HeadingRecord> {
    let mut visible: Vec<_> = headings.filter(|h| h.visible).collect();
    visible.sort_by(|a, b| a.vertical_position.total_cmp(&b.vertical_position));
    visible
}

/// Structural problems in a page's headings
///
/// The h1 count covers every record given, so pass [`collect_headings`] to
/// catch a second h1 that is hidden. The remaining rules (first heading,
/// h2 present, duplicates) look at the visible records in visual order.
pub fn validate_heading_hierarchy(headings: &[HeadingRecord]) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    let h1s: Vec<&HeadingRecord> = headings.iter().filter(|h| h.level == 1).collect();
    if h1s.len() != 1 {
        let texts: Vec<String> = h1s
            .iter()
            .map(|h| {
                if h.visible {
                    format!("\"{}\"", h.text)
                } else {
                    format!("\"{}\" (hidden)", h.text)
                }
            })
            .collect();
        findings.push(AuditFinding::new(
            FindingCategory::HeadingHierarchyViolation,
            format!("expected exactly one h1, found {} [{}]", h1s.len(), texts.join(", ")),
        ));
    }

    let visible = visual_order(headings.iter());

    if let Some(first) = visible.first()
        && first.level != 1
    {
        findings.push(AuditFinding::new(
            FindingCategory::HeadingHierarchyViolation,
            format!("first visible heading is h{} \"{}\", expected h1", first.level, first.text),
        ));
    }

    if visible.iter().any(|h| h.level == 1) && !visible.iter().any(|h| h.level == 2) {
        findings.push(AuditFinding::new(
            FindingCategory::HeadingHierarchyViolation,
            "page has an h1 but no h2",
        ));
    }

    let mut counts: IndexMap<(u8, &str), usize> = IndexMap::new();
    for heading in &visible {
        *counts.entry((heading.level, heading.text.trim())).or_default() += 1;
    }
    for ((level, text), count) in counts {
        if count > 1 {
            findings.push(AuditFinding::new(
                FindingCategory::DuplicateHeading,
                format!("h{} \"{}\" appears {} times", level, text, count),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SnapshotDocument;
    use crate::dom::ElementNode;

    fn heading(level: u8, text: &str, y: f64) -> ElementNode {
        ElementNode::new(format!("h{}", level))
            .with_text(text)
            .laid_out(0.0, y, 600.0, 30.0)
    }

    fn page(children: Vec<ElementNode>) -> SnapshotDocument {
        SnapshotDocument::from_root(
            ElementNode::new("html").with_child(ElementNode::new("body").laid_out(0.0, 0.0, 1024.0, 3000.0).with_children(children)),
        )
    }

    fn record(level: u8, text: &str, y: f64) -> HeadingRecord {
        HeadingRecord {
            level,
            text: text.to_string(),
            visible: true,
            vertical_position: y,
        }
    }

    #[test]
    fn test_visual_order_overrides_source_order() {
        let doc = page(vec![heading(2, "Late", 500.0), heading(1, "Early", 100.0)]);

        let headings = audit_heading_hierarchy(&doc).unwrap();
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Early", "Late"]);
    }

    #[test]
    fn test_hidden_headings_dropped_zero_area_kept() {
        let doc = page(vec![
            heading(1, "Title", 10.0),
            ElementNode::new("h2").with_text("Collapsed menu"),
            ElementNode::new("h2").with_text("Clipped").laid_out(0.0, 40.0, 0.0, 0.0),
        ]);

        let headings = audit_heading_hierarchy(&doc).unwrap();
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Clipped"]);
    }

    #[test]
    fn test_ties_keep_level_then_dom_order() {
        let doc = page(vec![
            heading(3, "c", 50.0),
            heading(2, "b2", 50.0),
            heading(2, "b1", 50.0),
            heading(1, "a", 50.0),
        ]);

        let headings = audit_heading_hierarchy(&doc).unwrap();
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b2", "b1", "c"]);
    }

    #[test]
    fn test_sorted_and_idempotent() {
        let doc = page(vec![
            heading(2, "Services", 700.0),
            heading(3, "Testing", 300.0),
            heading(1, "Excelon", 20.0),
            heading(2, "Writing", 300.0),
        ]);

        let first = audit_heading_hierarchy(&doc).unwrap();
        let second = audit_heading_hierarchy(&doc).unwrap();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].vertical_position <= w[1].vertical_position));
    }

    #[test]
    fn test_text_is_trimmed() {
        let doc = page(vec![heading(1, "  Blog \n", 0.0)]);
        assert_eq!(audit_heading_hierarchy(&doc).unwrap()[0].text, "Blog");
    }

    #[test]
    fn test_hidden_second_h1_is_counted() {
        let doc = page(vec![
            ElementNode::new("h1").with_text("Search results"),
            heading(1, "Excelon", 20.0),
            heading(2, "Sub", 80.0),
        ]);

        let all = collect_headings(&doc).unwrap();
        assert_eq!(all.len(), 3);

        let findings = validate_heading_hierarchy(&all);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].detail,
            "expected exactly one h1, found 2 [\"Search results\" (hidden), \"Excelon\"]"
        );

        // Visible-only input cannot see the hidden one
        assert!(validate_heading_hierarchy(&audit_heading_hierarchy(&doc).unwrap()).is_empty());
    }

    #[test]
    fn test_hidden_headings_skip_order_and_duplicate_rules() {
        let hidden = |level: u8, text: &str| HeadingRecord {
            level,
            text: text.to_string(),
            visible: false,
            vertical_position: 0.0,
        };
        let findings = validate_heading_hierarchy(&[
            hidden(3, "Menu"),
            hidden(2, "Blog"),
            record(2, "Blog", 300.0),
            record(1, "Blog", 10.0),
        ]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_two_h1_is_violation() {
        let findings = validate_heading_hierarchy(&[record(1, "A", 0.0), record(1, "B", 10.0), record(2, "C", 20.0)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::HeadingHierarchyViolation);
        assert_eq!(findings[0].detail, "expected exactly one h1, found 2 [\"A\", \"B\"]");
    }

    #[test]
    fn test_missing_h1_and_wrong_first_heading() {
        let findings = validate_heading_hierarchy(&[record(3, "Search results", 0.0), record(2, "Posts", 50.0)]);
        let details: Vec<_> = findings.iter().map(|f| f.detail.as_str()).collect();
        assert_eq!(
            details,
            vec![
                "expected exactly one h1, found 0 []",
                "first visible heading is h3 \"Search results\", expected h1",
            ]
        );
    }

    #[test]
    fn test_h1_without_h2() {
        let findings = validate_heading_hierarchy(&[record(1, "Blog", 0.0), record(3, "Archive", 50.0)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detail, "page has an h1 but no h2");
    }

    #[test]
    fn test_duplicate_headings_per_level() {
        let findings = validate_heading_hierarchy(&[
            record(1, "Excelon", 0.0),
            record(2, "Software Testing", 10.0),
            record(2, "Software Testing", 20.0),
            record(3, "Software Testing", 30.0),
            record(2, "Writing", 40.0),
        ]);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::DuplicateHeading);
        assert_eq!(findings[0].detail, "h2 \"Software Testing\" appears 2 times");
    }

    #[test]
    fn test_clean_hierarchy() {
        let findings = validate_heading_hierarchy(&[record(1, "Blog", 0.0), record(2, "Post one", 10.0), record(2, "Post two", 20.0)]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_empty_document_only_reports_h1_count() {
        let findings = validate_heading_hierarchy(&[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].detail, "expected exactly one h1, found 0 []");
    }
}
