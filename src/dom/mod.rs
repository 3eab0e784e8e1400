//! Page snapshots
//!
//! This module holds the offline representation of a page:
//! - ElementNode: one node of a captured DOM, with layout participation and geometry
//! - DomTree: a whole captured page plus its URL, stored as a flat node list
//! - Selector: the CSS subset used to query snapshots

pub mod element;
pub mod selector;
pub mod tree;

pub use element::{BoundingBox, ElementNode};
pub use selector::{ElementTree, Selector};
pub use tree::DomTree;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_export() {
        let element = ElementNode::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_selector_export() {
        let selector = Selector::parse("nav a").unwrap();
        assert_eq!(selector.as_str(), "nav a");
    }

    #[test]
    fn test_dom_tree_export() {
        let root = ElementNode::new("html");
        let tree = DomTree::new(root);
        assert_eq!(tree.root.tag_name, "html");
    }
}
