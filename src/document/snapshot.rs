use crate::document::{DocumentAccess, ElementHandle, ExtractionRequest, ExtractionResponse, extract_with_primitives};
use crate::dom::{BoundingBox, DomTree, ElementNode, ElementTree, Selector};
use crate::error::{AuditError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A captured page, queried in memory
///
/// Nodes are flattened in pre-order, so a subtree is the contiguous range
/// `index..end` and document order is index order.
#[derive(Debug)]
pub struct SnapshotDocument {
    id: u64,
    hostname: Option<String>,
    nodes: Vec<FlatNode>,
}

#[derive(Debug)]
struct FlatNode {
    tag_name: String,
    attributes: HashMap<String, String>,
    text: Option<String>,
    is_text: bool,
    is_visible: bool,
    bounding_box: Option<BoundingBox>,
    parent: Option<usize>,
    end: usize,
}

impl SnapshotDocument {
    pub fn new(tree: &DomTree) -> Self {
        let mut nodes: Vec<FlatNode> = tree
            .preorder()
            .into_iter()
            .enumerate()
            .map(|(index, (parent, node))| FlatNode {
                tag_name: node.tag_name.to_ascii_lowercase(),
                attributes: node.attributes.clone(),
                text: node.text_content.clone(),
                is_text: node.is_text_node(),
                is_visible: node.is_visible,
                bounding_box: node.bounding_box,
                parent,
                end: index + 1,
            })
            .collect();

        // A subtree ends where its last descendant's subtree ends
        for index in (1..nodes.len()).rev() {
            if let Some(parent) = nodes[index].parent {
                nodes[parent].end = nodes[parent].end.max(nodes[index].end);
            }
        }

        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            hostname: tree.hostname(),
            nodes,
        }
    }

    /// Snapshot of a bare element tree with no URL
    pub fn from_root(root: ElementNode) -> Self {
        Self::new(&DomTree::new(root))
    }

    fn resolve(&self, element: &ElementHandle) -> Result<&FlatNode> {
        if element.document != self.id {
            return Err(AuditError::StaleElement(
                "element handle belongs to a different document".to_string(),
            ));
        }
        self.nodes
            .get(element.index)
            .filter(|node| !node.is_text)
            .ok_or_else(|| AuditError::StaleElement(format!("no element at index {}", element.index)))
    }

    fn select(&self, selector: &str, range: std::ops::Range<usize>) -> Result<Vec<ElementHandle>> {
        let selector = Selector::parse(selector)?;
        Ok(range
            .filter(|&i| !self.nodes[i].is_text)
            .filter(|&i| selector.matches(self, i))
            .map(|i| ElementHandle::new(self.id, i))
            .collect())
    }
}

impl From<DomTree> for SnapshotDocument {
    fn from(tree: DomTree) -> Self {
        Self::new(&tree)
    }
}

impl ElementTree for SnapshotDocument {
    fn tag_name(&self, node: usize) -> &str {
        &self.nodes[node].tag_name
    }

    fn attribute(&self, node: usize, name: &str) -> Option<&str> {
        self.nodes[node].attributes.get(name).map(String::as_str)
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }
}

impl DocumentAccess for SnapshotDocument {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.select(selector, 0..self.nodes.len())
    }

    fn query_all_within(&self, scope: &ElementHandle, selector: &str) -> Result<Vec<ElementHandle>> {
        let end = self.resolve(scope)?.end;
        self.select(selector, scope.index + 1..end)
    }

    fn text_content(&self, element: &ElementHandle) -> Result<Option<String>> {
        let end = self.resolve(element)?.end;
        let text = self.nodes[element.index..end]
            .iter()
            .filter_map(|node| node.text.as_deref())
            .collect::<String>();
        Ok(Some(text))
    }

    fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.resolve(element)?.attributes.get(name).cloned())
    }

    fn bounding_box(&self, element: &ElementHandle) -> Result<Option<BoundingBox>> {
        let node = self.resolve(element)?;
        if !node.is_visible {
            return Ok(None);
        }
        // Laid out but captured without geometry: a zero box at the origin
        Ok(Some(node.bounding_box.unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))))
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse> {
        match request {
            ExtractionRequest::Hostname => Ok(ExtractionResponse::Hostname(self.hostname.clone())),
            _ => extract_with_primitives(self, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> SnapshotDocument {
        let body = ElementNode::new("body")
            .laid_out(0.0, 0.0, 1024.0, 2000.0)
            .with_child(
                ElementNode::new("nav").laid_out(0.0, 0.0, 1024.0, 40.0).with_child(
                    ElementNode::new("a")
                        .with_attribute("href", "/")
                        .laid_out(0.0, 0.0, 60.0, 20.0)
                        .with_child(ElementNode::new("img").with_attribute("alt", "Logo"))
                        .with_child(ElementNode::text(" Home ")),
                ),
            )
            .with_child(ElementNode::new("h2").with_text("Hidden"));

        SnapshotDocument::new(&DomTree::new(ElementNode::new("html").with_child(body)).with_url("https://xndev.com/"))
    }

    #[test]
    fn test_query_all_in_document_order() {
        let doc = document();
        let all = doc.query_all("*").unwrap();
        let tags: Vec<_> = all.iter().map(|h| doc.tag_name(h.index).to_string()).collect();
        assert_eq!(tags, vec!["html", "body", "nav", "a", "img", "h2"]);
    }

    #[test]
    fn test_query_all_within_scope() {
        let doc = document();
        let nav = doc.query_all("nav").unwrap()[0];
        assert_eq!(doc.query_all_within(&nav, "img[alt]").unwrap().len(), 1);
        assert!(doc.query_all_within(&nav, "h2").unwrap().is_empty());
        // The scope itself is not part of its own subtree query
        assert!(doc.query_all_within(&nav, "nav").unwrap().is_empty());
    }

    #[test]
    fn test_text_and_attributes() {
        let doc = document();
        let link = doc.query_all("a").unwrap()[0];

        assert_eq!(doc.text_content(&link).unwrap().as_deref(), Some(" Home "));
        assert_eq!(doc.get_attribute(&link, "href").unwrap().as_deref(), Some("/"));
        assert_eq!(doc.get_attribute(&link, "title").unwrap(), None);
    }

    #[test]
    fn test_bounding_box_reflects_layout() {
        let doc = document();
        let link = doc.query_all("a").unwrap()[0];
        let heading = doc.query_all("h2").unwrap()[0];
        let image = doc.query_all("img").unwrap()[0];

        assert_eq!(doc.bounding_box(&link).unwrap().map(|b| b.width), Some(60.0));
        assert_eq!(doc.bounding_box(&heading).unwrap(), None);
        assert_eq!(doc.bounding_box(&image).unwrap(), None);
    }

    #[test]
    fn test_deep_nesting_keeps_subtree_ranges() {
        let mut node = ElementNode::new("p").with_child(ElementNode::text("bottom"));
        for _ in 0..200 {
            node = ElementNode::new("div").with_child(node);
        }
        let tree = DomTree::new(ElementNode::new("html").with_child(node).with_child(ElementNode::new("footer")));
        let doc = SnapshotDocument::new(&DomTree::from_json(&tree.to_json().unwrap()).unwrap());

        let outer = doc.query_all("html > div").unwrap()[0];
        assert_eq!(doc.text_content(&outer).unwrap().as_deref(), Some("bottom"));
        assert_eq!(doc.query_all_within(&outer, "div").unwrap().len(), 199);
        assert!(doc.query_all_within(&outer, "footer").unwrap().is_empty());
    }

    #[test]
    fn test_foreign_handle_is_stale() {
        let first = document();
        let second = document();
        let link = first.query_all("a").unwrap()[0];

        let err = second.text_content(&link).unwrap_err();
        assert!(err.is_stale());
    }

    #[test]
    fn test_invalid_selector_propagates() {
        let err = document().query_all("a[href").unwrap_err();
        assert!(matches!(err, AuditError::InvalidSelector { .. }));
    }

    #[test]
    fn test_hostname_extraction() {
        let doc = document();
        let host = doc.extract(&ExtractionRequest::Hostname).unwrap().into_hostname().unwrap();
        assert_eq!(host.as_deref(), Some("xndev.com"));

        let bare = SnapshotDocument::from_root(ElementNode::new("html"));
        let host = bare.extract(&ExtractionRequest::Hostname).unwrap().into_hostname().unwrap();
        assert_eq!(host, None);
    }
}
