use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag name used for text nodes inside a snapshot
pub const TEXT_NODE_TAG: &str = "#text";

/// A node in a captured page snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    /// Lowercase HTML tag name (e.g., "h1", "a", "img"), or `#text` for text nodes
    pub tag_name: String,

    /// Element attributes exactly as authored (an empty `alt=""` is kept)
    pub attributes: HashMap<String, String>,

    /// Text carried by this node itself (text nodes, or hand-built fixtures)
    pub text_content: Option<String>,

    /// Child nodes in document order
    pub children: Vec<ElementNode>,

    /// Whether the element participates in layout (has at least one layout box)
    pub is_visible: bool,

    /// Page-relative geometry at capture time
    pub bounding_box: Option<BoundingBox>,
}

/// Bounding box coordinates for an element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
            is_visible: false,
            bounding_box: None,
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(TEXT_NODE_TAG).with_text(text)
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: mark as laid out at the given position
    pub fn laid_out(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.is_visible = true;
        self.bounding_box = Some(BoundingBox { x, y, width, height });
        self
    }

    pub fn is_text_node(&self) -> bool {
        self.tag_name == TEXT_NODE_TAG
    }
}

impl BoundingBox {
    /// Create a new BoundingBox
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}
