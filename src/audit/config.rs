use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Inclusive bounds on a text length, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Settings shared by every check in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// The site's own host name; links mentioning it are internal.
    /// When unset the host is read from the document.
    pub site_host: Option<String>,

    /// How long a single page-context evaluation may take (milliseconds)
    pub evaluation_timeout_ms: u64,

    /// Required meta description length, if any
    pub meta_description_length: Option<LengthBounds>,

    /// Names of checks to run; empty runs every registered check
    pub checks: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            site_host: None,
            evaluation_timeout_ms: 10_000,
            meta_description_length: None,
            checks: Vec::new(),
        }
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn site_host(mut self, host: impl Into<String>) -> Self {
        self.site_host = Some(host.into());
        self
    }

    pub fn evaluation_timeout(mut self, timeout_ms: u64) -> Self {
        self.evaluation_timeout_ms = timeout_ms;
        self
    }

    pub fn meta_description_length(mut self, min: usize, max: usize) -> Self {
        self.meta_description_length = Some(LengthBounds { min, max });
        self
    }

    /// Restrict the run to the named checks
    pub fn only<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks = checks.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.evaluation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AuditConfig::new()
            .site_host("xndev.com")
            .evaluation_timeout(2_500)
            .meta_description_length(120, 160)
            .only(["broken-links", "image-alt"]);

        assert_eq!(config.site_host.as_deref(), Some("xndev.com"));
        assert_eq!(config.timeout(), Duration::from_millis(2_500));
        assert_eq!(config.meta_description_length, Some(LengthBounds { min: 120, max: 160 }));
        assert_eq!(config.checks, vec!["broken-links", "image-alt"]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AuditConfig = serde_json::from_str(r#"{"site_host": "xndev.com"}"#).unwrap();

        assert_eq!(config.site_host.as_deref(), Some("xndev.com"));
        assert_eq!(config.evaluation_timeout_ms, 10_000);
        assert!(config.checks.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        std::fs::write(&path, r#"{"meta_description_length": {"min": 120, "max": 160}}"#).unwrap();

        let config = AuditConfig::load(&path).unwrap();
        assert_eq!(config.meta_description_length, Some(LengthBounds { min: 120, max: 160 }));
    }

    #[test]
    fn test_length_bounds() {
        let bounds = LengthBounds { min: 120, max: 160 };
        assert!(bounds.contains(120));
        assert!(bounds.contains(160));
        assert!(!bounds.contains(119));
        assert!(!bounds.contains(161));
    }
}
