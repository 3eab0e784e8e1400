use crate::audit::ImageRecord;
use crate::document::{DocumentAccess, ExtractionRequest};
use crate::error::Result;

/// Images whose `alt` is absent or blank, in document order
///
/// An explicit `alt=""` is reported as well: decorative images get no
/// exemption here.
pub fn audit_images_without_alt<D: DocumentAccess + ?Sized>(doc: &D) -> Result<Vec<ImageRecord>> {
    let images = doc.extract(&ExtractionRequest::Images)?.into_images()?;
    log::debug!("Checking alt text on {} images", images.len());
    Ok(images.into_iter().filter(ImageRecord::lacks_alt).collect())
}
