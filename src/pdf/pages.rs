//! Page tree access: count and native page dimensions.

use lopdf::{Document, Object, ObjectId};

use super::PdfError;
use crate::geometry::PageSize;

/// Number of pages in the document.
pub fn page_count(pdf_bytes: &[u8]) -> Result<usize, PdfError> {
    let doc = load(pdf_bytes)?;
    Ok(doc.get_pages().len())
}

/// Native size of the page at the 0-based `page_index`, from its
/// MediaBox (walking up to an inherited one if the leaf omits it).
pub fn page_size(pdf_bytes: &[u8], page_index: usize) -> Result<PageSize, PdfError> {
    let doc = load(pdf_bytes)?;
    let page_id = page_object_id(&doc, page_index)?;
    media_box_size(&doc, page_id)
}

pub(crate) fn load(pdf_bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(pdf_bytes).map_err(|e| PdfError::MalformedDocument(e.to_string()))
}

/// Resolve a 0-based page index to the page object id.
pub(crate) fn page_object_id(doc: &Document, page_index: usize) -> Result<ObjectId, PdfError> {
    let pages = doc.get_pages();
    // lopdf numbers pages from 1.
    let page_no = u32::try_from(page_index)
        .ok()
        .and_then(|i| i.checked_add(1))
        .ok_or(PdfError::PageIndexOutOfRange {
            index: page_index,
            page_count: pages.len(),
        })?;
    pages
        .get(&page_no)
        .copied()
        .ok_or(PdfError::PageIndexOutOfRange {
            index: page_index,
            page_count: pages.len(),
        })
}

/// MediaBox width/height for a page, following Parent links for
/// inherited boxes.
pub(crate) fn media_box_size(doc: &Document, page_id: ObjectId) -> Result<PageSize, PdfError> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfError::MalformedDocument(format!("page node {id:?}: {e}")))?;
        if let Some(size) = media_box_from(doc, dict) {
            return Ok(size);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    Err(PdfError::MalformedDocument(
        "page has no MediaBox".to_string(),
    ))
}

fn media_box_from(doc: &Document, dict: &lopdf::Dictionary) -> Option<PageSize> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = number(&arr[0])?;
    let lly = number(&arr[1])?;
    let urx = number(&arr[2])?;
    let ury = number(&arr[3])?;
    Some(PageSize::new(urx - llx, ury - lly))
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{sample_pdf, sample_pdf_inherited_media_box};
    use super::*;

    #[test]
    fn test_page_count() {
        let bytes = sample_pdf(&[(612.0, 792.0), (595.0, 842.0)]);
        assert_eq!(page_count(&bytes).unwrap(), 2);
    }

    #[test]
    fn test_page_size_per_page() {
        let bytes = sample_pdf(&[(612.0, 792.0), (595.0, 842.0)]);

        let first = page_size(&bytes, 0).unwrap();
        assert!((first.width - 612.0).abs() < 0.01);
        assert!((first.height - 792.0).abs() < 0.01);

        let second = page_size(&bytes, 1).unwrap();
        assert!((second.width - 595.0).abs() < 0.01);
        assert!((second.height - 842.0).abs() < 0.01);
    }

    #[test]
    fn test_page_size_inherited_media_box() {
        let bytes = sample_pdf_inherited_media_box(612.0, 792.0);
        let size = page_size(&bytes, 0).unwrap();
        assert!((size.width - 612.0).abs() < 0.01);
        assert!((size.height - 792.0).abs() < 0.01);
    }

    #[test]
    fn test_page_index_out_of_range() {
        let bytes = sample_pdf(&[(612.0, 792.0)]);
        let err = page_size(&bytes, 1).unwrap_err();
        assert!(matches!(
            err,
            PdfError::PageIndexOutOfRange {
                index: 1,
                page_count: 1
            }
        ));
    }

    #[test]
    fn test_malformed_document() {
        let err = page_count(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::MalformedDocument(_)));
    }
}
