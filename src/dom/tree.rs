use crate::dom::element::{BoundingBox, ElementNode};
use crate::error::{AuditError, Result};
use headless_chrome::Tab;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::HashMap, path::Path, sync::Arc};

/// A point-in-time capture of a page's DOM
///
/// On disk (and on the wire from the capture script) a snapshot is a flat
/// list of nodes in document order, each naming its parent by index. Parents
/// always precede their children, so page depth never turns into JSON depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DomTree {
    /// Address of the page at capture time
    pub url: Option<String>,

    /// Root element (normally `<html>`)
    pub root: ElementNode,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    nodes: Vec<NodeRef<'a>>,
}

#[derive(Serialize)]
struct NodeRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<usize>,
    tag_name: &'a str,
    #[serde(skip_serializing_if = "no_attributes")]
    attributes: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounding_box: Option<BoundingBox>,
}

fn no_attributes(attributes: &&HashMap<String, String>) -> bool {
    attributes.is_empty()
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    url: Option<String>,
    nodes: Vec<SnapshotNode>,
}

#[derive(Deserialize)]
struct SnapshotNode {
    #[serde(default)]
    parent: Option<usize>,
    tag_name: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    text_content: Option<String>,
    #[serde(default)]
    is_visible: bool,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

impl DomTree {
    /// Create a tree with no known URL
    pub fn new(root: ElementNode) -> Self {
        Self { url: None, root }
    }

    /// Builder method: set the page URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Capture the DOM of a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("capture_snapshot.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| AuditError::DomParseFailed(format!("Failed to execute snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| AuditError::DomParseFailed("No value returned from snapshot script".to_string()))?;

        // The script returns a JSON string rather than an object
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| AuditError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let tree = Self::from_json(&json_str)?;
        log::debug!(
            "Captured snapshot of {} ({} nodes)",
            tree.url.as_deref().unwrap_or("<unknown>"),
            tree.count_elements()
        );
        Ok(tree)
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuditError::DomParseFailed(format!("Failed to parse snapshot JSON: {}", e)))
    }

    /// Convert the snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::DomParseFailed(format!("Failed to serialize snapshot to JSON: {}", e)))
    }

    /// Read a snapshot previously written with [`DomTree::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Host name of the captured page, if the URL has one
    pub fn hostname(&self) -> Option<String> {
        let url = url::Url::parse(self.url.as_deref()?).ok()?;
        url.host_str().map(str::to_string)
    }

    /// Every node (text nodes included) in document order, paired with the
    /// index of its parent in the same list
    pub fn preorder(&self) -> Vec<(Option<usize>, &ElementNode)> {
        let mut order = Vec::new();
        let mut stack = vec![(None, &self.root)];

        while let Some((parent, node)) = stack.pop() {
            let index = order.len();
            order.push((parent, node));
            stack.extend(node.children.iter().rev().map(|child| (Some(index), child)));
        }
        order
    }

    /// Count element nodes (text nodes excluded)
    pub fn count_elements(&self) -> usize {
        self.preorder().iter().filter(|(_, node)| !node.is_text_node()).count()
    }

    fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut parents = Vec::with_capacity(snapshot.nodes.len());
        let mut built = Vec::with_capacity(snapshot.nodes.len());

        for (index, node) in snapshot.nodes.into_iter().enumerate() {
            match (index, node.parent) {
                (0, None) => {}
                (0, Some(_)) => {
                    return Err(AuditError::DomParseFailed("root node cannot have a parent".to_string()));
                }
                (_, Some(parent)) if parent < index => {}
                (_, parent) => {
                    return Err(AuditError::DomParseFailed(format!(
                        "node {} has parent {:?}; a parent must come before its children",
                        index, parent
                    )));
                }
            }

            parents.push(node.parent);
            built.push(Some(ElementNode {
                tag_name: node.tag_name,
                attributes: node.attributes,
                text_content: node.text_content,
                children: Vec::new(),
                is_visible: node.is_visible,
                bounding_box: node.bounding_box,
            }));
        }

        // Walking backwards, every node is complete by the time it is handed
        // to its parent. Children arrive last-first and are flipped once.
        for index in (1..built.len()).rev() {
            if let (Some(parent), Some(mut node)) = (parents[index], built[index].take()) {
                node.children.reverse();
                if let Some(parent_node) = built[parent].as_mut() {
                    parent_node.children.push(node);
                }
            }
        }

        let mut root = built
            .first_mut()
            .and_then(Option::take)
            .ok_or_else(|| AuditError::DomParseFailed("snapshot has no nodes".to_string()))?;
        root.children.reverse();

        Ok(Self { url: snapshot.url, root })
    }
}

impl Serialize for DomTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let nodes = self
            .preorder()
            .into_iter()
            .map(|(parent, node)| NodeRef {
                parent,
                tag_name: &node.tag_name,
                attributes: &node.attributes,
                text_content: node.text_content.as_deref(),
                is_visible: node.is_visible,
                bounding_box: node.bounding_box,
            })
            .collect();

        SnapshotRef {
            url: self.url.as_deref(),
            nodes,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DomTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let snapshot = Snapshot::deserialize(deserializer)?;
        Self::from_snapshot(snapshot).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tree() -> DomTree {
        let body = ElementNode::new("body")
            .with_child(
                ElementNode::new("header").with_child(
                    ElementNode::new("a")
                        .with_attribute("href", "/")
                        .with_child(ElementNode::text("Home")),
                ),
            )
            .with_child(
                ElementNode::new("main")
                    .with_child(ElementNode::new("h1").with_text("Blog").laid_out(0.0, 80.0, 600.0, 40.0))
                    .with_child(ElementNode::new("img").with_attribute("src", "x.png").with_attribute("alt", "")),
            );

        DomTree::new(ElementNode::new("html").with_child(body)).with_url("https://xndev.com/blog/")
    }

    #[test]
    fn test_count_elements_skips_text_nodes() {
        // html, body, header, a, main, h1, img
        assert_eq!(create_test_tree().count_elements(), 7);
    }

    #[test]
    fn test_preorder_parents() {
        let tree = create_test_tree();
        let order: Vec<_> = tree
            .preorder()
            .into_iter()
            .map(|(parent, node)| (parent, node.tag_name.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![
                (None, "html"),
                (Some(0), "body"),
                (Some(1), "header"),
                (Some(2), "a"),
                (Some(3), "#text"),
                (Some(1), "main"),
                (Some(5), "h1"),
                (Some(5), "img"),
            ]
        );
    }

    #[test]
    fn test_hostname() {
        assert_eq!(create_test_tree().hostname().as_deref(), Some("xndev.com"));
        assert_eq!(DomTree::new(ElementNode::new("html")).hostname(), None);
        assert_eq!(
            DomTree::new(ElementNode::new("html")).with_url("data:text/html,<p>x</p>").hostname(),
            None
        );
    }

    #[test]
    fn test_json_is_flat_with_parent_indices() {
        let json = create_test_tree().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["url"], "https://xndev.com/blog/");
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 8);
        assert!(nodes[0].get("parent").is_none());
        assert_eq!(nodes[6]["tag_name"], "h1");
        assert_eq!(nodes[6]["parent"], 5);
        assert_eq!(nodes[6]["is_visible"], true);
        assert_eq!(nodes[7]["attributes"]["alt"], "");
    }

    #[test]
    fn test_json_roundtrip_preserves_structure() {
        let tree = create_test_tree();
        assert_eq!(DomTree::from_json(&tree.to_json().unwrap()).unwrap(), tree);
    }

    #[test]
    fn test_deeply_nested_page_roundtrips() {
        let mut node = ElementNode::new("p").with_child(ElementNode::text("bottom"));
        for _ in 0..150 {
            node = ElementNode::new("div").with_child(node);
        }
        let tree = DomTree::new(ElementNode::new("html").with_child(node));

        let reloaded = DomTree::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.count_elements(), 152);
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn test_from_json_rejects_bad_parents() {
        let forward = r#"{"nodes": [{"tag_name": "html"}, {"tag_name": "body", "parent": 2}, {"tag_name": "p", "parent": 1}]}"#;
        assert!(matches!(DomTree::from_json(forward), Err(AuditError::DomParseFailed(_))));

        let orphan = r#"{"nodes": [{"tag_name": "html"}, {"tag_name": "body"}]}"#;
        assert!(matches!(DomTree::from_json(orphan), Err(AuditError::DomParseFailed(_))));

        let empty = r#"{"nodes": []}"#;
        assert!(matches!(DomTree::from_json(empty), Err(AuditError::DomParseFailed(_))));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = DomTree::from_json("{\"root\": 5}").unwrap_err();
        assert!(matches!(err, AuditError::DomParseFailed(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let tree = create_test_tree();
        tree.save(&path).unwrap();

        assert_eq!(DomTree::load(&path).unwrap(), tree);
    }
}
