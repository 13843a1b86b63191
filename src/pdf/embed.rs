//! Raster embedding: stamp a PNG onto one page at a page-space rect.

use std::io::Cursor;

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};

use super::pages;
use super::PdfError;
use crate::geometry::PdfRect;

/// Embed `raster_png` as an image XObject on the page at the 0-based
/// `page_index`, drawn at `rect` (page space, lower-left origin).
///
/// Returns a fresh serialization of the modified document; `pdf_bytes`
/// is left untouched. All other pages and existing page content are
/// preserved in object terms.
///
/// The raster's alpha channel is honored: the image is split into a
/// DeviceRGB XObject with a DeviceGray SMask, so a transparent-background
/// signature stamps cleanly over existing page content.
pub fn embed(
    pdf_bytes: &[u8],
    page_index: usize,
    raster_png: &[u8],
    rect: PdfRect,
) -> Result<Vec<u8>, PdfError> {
    let mut doc = pages::load(pdf_bytes)?;
    let page_id = pages::page_object_id(&doc, page_index)?;

    let raster = image::load_from_memory(raster_png)
        .map_err(|e| PdfError::ImageDecodeError(e.to_string()))?
        .to_rgba8();
    let (raster_w, raster_h) = raster.dimensions();

    let pixels = pixel_count(raster_w, raster_h);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in raster.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        alpha.push(pixel[3]);
    }

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => raster_w as i64,
            "Height" => raster_h as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        alpha,
    ));
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => raster_w as i64,
            "Height" => raster_h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id,
        },
        rgb,
    ));

    // Object-id-derived name: repeated signs on the same document never
    // collide in the resource dictionary.
    let name = format!("Sig{}", image_id.0);
    register_xobject(&mut doc, page_id, &name, image_id)?;

    let content = format!(
        "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /{} Do Q",
        rect.width, rect.height, rect.x, rect.y, name
    );
    doc.add_page_contents(page_id, content.into_bytes())
        .map_err(|e| PdfError::MutationFailed(e.to_string()))?;

    let mut out = Vec::new();
    doc.save_to(&mut Cursor::new(&mut out))
        .map_err(|e| PdfError::Serialize(e.to_string()))?;

    tracing::debug!(
        page_index,
        raster_w,
        raster_h,
        x = rect.x,
        y = rect.y,
        "Embedded signature raster"
    );
    Ok(out)
}

/// Pixel count in `usize`, so channel-buffer capacities never overflow
/// the raster's `u32` dimensions.
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Put `image_id` under `name` in the page's XObject resources, creating
/// or inlining the resource dictionary as needed.
fn register_xobject(
    doc: &mut Document,
    page_id: lopdf::ObjectId,
    name: &str,
    image_id: lopdf::ObjectId,
) -> Result<(), PdfError> {
    let missing_dict =
        |what: &str| PdfError::MutationFailed(format!("page {what} is not a dictionary"));

    let mut resources = {
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|_| missing_dict("object"))?;
        page_dict
            .remove(b"Resources")
            .unwrap_or_else(|| Object::Dictionary(dictionary! {}))
    };

    // Indirect resource dictionaries are inlined onto the page so the
    // mutation stays local to it.
    if let Object::Reference(id) = resources {
        let referenced = doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|_| missing_dict("resources"))?
            .clone();
        resources = Object::Dictionary(referenced);
    }

    let Object::Dictionary(ref mut res_dict) = resources else {
        return Err(missing_dict("resources"));
    };

    let mut xobjects = match res_dict.remove(b"XObject") {
        Some(Object::Dictionary(dict)) => dict,
        Some(Object::Reference(id)) => doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|_| missing_dict("xobject table"))?
            .clone(),
        Some(_) => return Err(missing_dict("xobject table")),
        None => dictionary! {},
    };
    xobjects.set(name, image_id);
    res_dict.set("XObject", xobjects);

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|_| missing_dict("object"))?;
    page_dict.set("Resources", resources);
    Ok(())
}

/// Recover the placement rectangle of the signature most recently drawn
/// by [`embed`] on the given page, or `None` if the page carries no
/// embedded signature.
pub fn embedded_signature_rect(
    pdf_bytes: &[u8],
    page_index: usize,
) -> Result<Option<PdfRect>, PdfError> {
    let doc = pages::load(pdf_bytes)?;
    let page_id = pages::page_object_id(&doc, page_index)?;
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::MalformedDocument(e.to_string()))?;
    let content =
        Content::decode(&data).map_err(|e| PdfError::MalformedDocument(e.to_string()))?;

    let mut pending: Option<PdfRect> = None;
    let mut found = None;
    for op in &content.operations {
        match op.operator.as_str() {
            "cm" if op.operands.len() == 6 => {
                let nums: Vec<f64> = op.operands.iter().filter_map(pages::number).collect();
                if nums.len() == 6 {
                    pending = Some(PdfRect {
                        x: nums[4],
                        y: nums[5],
                        width: nums[0],
                        height: nums[3],
                    });
                }
            }
            "Do" => {
                let is_signature = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| n.starts_with(b"Sig"))
                    .unwrap_or(false);
                if is_signature {
                    found = pending.take();
                }
            }
            _ => {}
        }
    }
    Ok(found)
}
