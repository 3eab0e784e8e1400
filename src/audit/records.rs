use serde::{Deserialize, Serialize};

/// One heading element as seen at audit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// 1 for `<h1>` through 6 for `<h6>`
    pub level: u8,
    /// Trimmed text content
    pub text: String,
    /// Whether the heading participates in layout
    pub visible: bool,
    /// Top edge in page coordinates; 0 when not laid out
    pub vertical_position: f64,
}

/// The accessibility-relevant attributes of one anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub href: Option<String>,
    /// Trimmed text content
    pub text: String,
    pub aria_label: Option<String>,
    pub title: Option<String>,
    pub target: Option<String>,
    pub rel: Option<String>,
    /// The anchor contains an image with a non-blank `alt`
    #[serde(default)]
    pub has_image_with_alt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub src: Option<String>,
    pub alt: Option<String>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl LinkRecord {
    /// A link with no `href` at all
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            href: None,
            text: text.into(),
            aria_label: None,
            title: None,
            target: None,
            rel: None,
            has_image_with_alt: false,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// `href` is missing, empty, `#`, or the literal string `null`
    pub fn is_broken(&self) -> bool {
        matches!(self.href.as_deref(), None | Some("" | "#" | "null"))
    }

    /// No text, no `aria-label`, no `title` and no alt-bearing image
    pub fn lacks_accessible_text(&self) -> bool {
        self.text.trim().is_empty()
            && is_blank(self.aria_label.as_deref())
            && is_blank(self.title.as_deref())
            && !self.has_image_with_alt
    }

    /// Absolute `http(s)` link whose href does not mention the site's host
    ///
    /// With no known host every absolute link counts as external.
    pub fn is_external(&self, site_host: Option<&str>) -> bool {
        let Some(href) = self.href.as_deref() else {
            return false;
        };
        href.starts_with("http") && site_host.filter(|h| !h.is_empty()).is_none_or(|host| !href.contains(host))
    }

    /// Opens in a new browsing context
    ///
    /// `_blank` is matched ASCII case-insensitively, as browsers treat
    /// `target="_BLANK"` the same way.
    pub fn opens_new_context(&self) -> bool {
        self.target.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("_blank"))
    }

    /// External, opens `_blank`, and `rel` does not isolate the opener
    pub fn is_insecure_external(&self, site_host: Option<&str>) -> bool {
        self.is_external(site_host)
            && self.opens_new_context()
            && !self.rel.as_deref().is_some_and(|rel| rel.contains("noopener"))
    }
}

impl ImageRecord {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// `alt` is absent or blank; an explicit `alt=""` is not exempt
    pub fn lacks_alt(&self) -> bool {
        is_blank(self.alt.as_deref())
    }
}
