use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            document::ChromeDocument,
            dom::DomTree,
            error::{AuditError, Result}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance
///
/// The session only loads pages. Audits read them through the
/// [`ChromeDocument`] handed out by [`BrowserSession::document`], so several
/// sessions (or tabs) can be audited independently.
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));

        // Audits on slow pages can sit idle for a while between reads
        launch_opts.idle_browser_timeout = Duration::from_secs(10 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| AuditError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| AuditError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!(
            "Launched {} browser",
            if options.headless { "headless" } else { "headed" }
        );
        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| AuditError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| AuditError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// The tab pages are loaded into: the visible one, else the first
    pub fn tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible'", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => log::debug!("Failed to check tab visibility: {}", e),
            }
        }

        tabs.into_iter()
            .next()
            .ok_or_else(|| AuditError::TabOperationFailed("Browser has no tabs".to_string()))
    }

    /// Load a URL in the active tab and wait for it to finish loading
    pub fn navigate(&self, url: &str) -> Result<()> {
        let url = normalize_url(url);
        let tab = self.tab()?;

        tab.navigate_to(&url)
            .map_err(|e| AuditError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        tab.wait_until_navigated()
            .map_err(|e| AuditError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        log::debug!("Loaded {}", url);
        Ok(())
    }

    /// Current URL of the active tab
    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// The active tab as an auditable document
    pub fn document(&self, timeout: Duration) -> Result<ChromeDocument> {
        Ok(ChromeDocument::new(self.tab()?, timeout))
    }

    /// Capture the active tab's DOM for offline auditing
    pub fn snapshot(&self) -> Result<DomTree> {
        DomTree::from_tab(&self.tab()?)
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }
}

/// Add a scheme to bare host names ("xndev.com/blog" becomes "https://xndev.com/blog")
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    // "localhost:3000" parses as scheme "localhost", hence the base check
    if url::Url::parse(trimmed).is_ok_and(|u| !u.cannot_be_a_base() || matches!(u.scheme(), "data" | "about")) {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}
