use crate::audit::LinkRecord;
use crate::document::{DocumentAccess, ExtractionRequest};
use crate::error::Result;

/// Every anchor on the page, in document order
pub fn collect_links<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<LinkRecord>> {
    let links = doc.extract(&ExtractionRequest::Links)?.into_links()?;
    log::debug!("Collected {} links", links.len());
    Ok(links)
}

/// Links whose `href` is missing, empty, `#` or `null`
pub fn audit_broken_links<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<LinkRecord>> {
    Ok(collect_links(doc)?.into_iter().filter(LinkRecord::is_broken).collect())
}

/// Links a screen reader has nothing to announce for
pub fn audit_links_without_accessible_text<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<LinkRecord>> {
    Ok(collect_links(doc)?
        .into_iter()
        .filter(LinkRecord::lacks_accessible_text)
        .collect())
}

/// External links that open `_blank` without `rel="noopener"`
///
/// `site_host` is the site's own host name; when `None` the document is
/// asked for the host it was loaded from.
pub fn audit_insecure_external_links<D: DocumentAccess + ?Sized>(
    doc: &D,
    site_host: Option<&str>,
) -> Result<Vec<LinkRecord>> {
    let host = match site_host {
        Some(host) => Some(host.to_string()),
        None => resolve_hostname(doc)?,
    };

    Ok(collect_links(doc)?
        .into_iter()
        .filter(|link| link.is_insecure_external(host.as_deref()))
        .collect())
}

/// Host name the document reports for itself
pub fn resolve_hostname<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Option<String>> {
    let host = doc.extract(&ExtractionRequest::Hostname)?.into_hostname()?;
    if host.is_none() {
        log::debug!("Document has no host name; treating every absolute link as external");
    }
    Ok(host)
}
