//! Coordinate transforms between capture space and PDF page space
//!
//! Capture space is the on-screen drawing surface: origin top-left,
//! y grows downward, units are pixels. Page space is the PDF page's
//! native frame: origin bottom-left, y grows upward, units are points.
//! The transform here is pure math with no I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for the bounds check, absorbs float noise on exact-edge
/// placements without ever admitting a visibly out-of-bounds rectangle.
const BOUNDS_EPSILON: f64 = 1e-6;

/// Width and height of a reference frame (capture surface or PDF page).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position and size of a signature in capture space.
///
/// `x`/`y` locate the top-left corner of the signature box;
/// `width`/`height` are its extent, all in capture-space units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A rectangle in page space: `x`/`y` is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Transform error
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A reference frame has a non-positive width
    #[error("Invalid dimensions: capture width {capture_width}, page width {page_width}")]
    InvalidDimensions {
        capture_width: f64,
        page_width: f64,
    },

    /// The transformed rectangle falls outside the page bounding box
    #[error(
        "Placement out of bounds: rect ({x:.2}, {y:.2}) {width:.2}x{height:.2} \
         on page {page_width:.2}x{page_height:.2}"
    )]
    PlacementOutOfBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        page_width: f64,
        page_height: f64,
    },
}

/// Map a capture-space placement onto a page-space rectangle.
///
/// Scale is derived from the width ratio alone (`page.width /
/// capture.width`); the capture surface is sized against the rendered page
/// width, so width is the reference axis. If capture and page aspect
/// ratios diverge, vertical placement inherits that divergence: callers
/// that render the capture frame at a different aspect ratio than the page
/// should expect a systematic vertical offset rather than a correction
/// here.
///
/// The y coordinate is flipped from top-left/downward to
/// bottom-left/upward. Out-of-bounds results are rejected, not clamped.
pub fn to_page_space(
    placement: Placement,
    capture: PageSize,
    page: PageSize,
) -> Result<PdfRect, GeometryError> {
    if capture.width <= 0.0 || page.width <= 0.0 {
        return Err(GeometryError::InvalidDimensions {
            capture_width: capture.width,
            page_width: page.width,
        });
    }

    let scale = page.width / capture.width;
    let width = placement.width * scale;
    let height = placement.height * scale;
    let x = placement.x * scale;
    let y = page.height - placement.y * scale - height;

    let rect = PdfRect {
        x,
        y,
        width,
        height,
    };

    if x < -BOUNDS_EPSILON
        || y < -BOUNDS_EPSILON
        || x + width > page.width + BOUNDS_EPSILON
        || y + height > page.height + BOUNDS_EPSILON
    {
        return Err(GeometryError::PlacementOutOfBounds {
            x,
            y,
            width,
            height,
            page_width: page.width,
            page_height: page.height,
        });
    }

    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const US_LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    const CAPTURE: PageSize = PageSize {
        width: 600.0,
        height: 800.0,
    };

    #[test]
    fn test_accepted_placement() {
        // s = 612/600 = 1.02
        let rect = to_page_space(
            Placement::new(50.0, 50.0, 200.0, 100.0),
            CAPTURE,
            US_LETTER,
        )
        .unwrap();

        assert!((rect.x - 51.0).abs() < 1e-9);
        assert!((rect.width - 204.0).abs() < 1e-9);
        assert!((rect.height - 102.0).abs() < 1e-9);
        // 792 - 51 - 102 = 639
        assert!((rect.y - 639.0).abs() < 1e-9);
    }

    #[test]
    fn test_bottom_overflow_rejected() {
        // y = 792 - 714 - 102 = -24, below the page edge
        let err = to_page_space(
            Placement::new(100.0, 700.0, 200.0, 100.0),
            CAPTURE,
            US_LETTER,
        )
        .unwrap_err();

        assert!(matches!(err, GeometryError::PlacementOutOfBounds { .. }));
    }

    #[test]
    fn test_right_overflow_rejected() {
        let err = to_page_space(
            Placement::new(500.0, 50.0, 200.0, 100.0),
            CAPTURE,
            US_LETTER,
        )
        .unwrap_err();

        assert!(matches!(err, GeometryError::PlacementOutOfBounds { .. }));
    }

    #[test]
    fn test_exact_edge_placement_accepted() {
        // Flush with the bottom-left corner of the page
        let capture = PageSize::new(612.0, 792.0);
        let rect = to_page_space(
            Placement::new(0.0, 692.0, 200.0, 100.0),
            capture,
            US_LETTER,
        )
        .unwrap();

        assert!(rect.y.abs() < 1e-9);
        assert!(rect.x.abs() < 1e-9);
    }

    #[test]
    fn test_invalid_capture_width() {
        let err = to_page_space(
            Placement::new(0.0, 0.0, 10.0, 10.0),
            PageSize::new(0.0, 800.0),
            US_LETTER,
        )
        .unwrap_err();

        assert!(matches!(err, GeometryError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_invalid_page_width() {
        let err = to_page_space(
            Placement::new(0.0, 0.0, 10.0, 10.0),
            CAPTURE,
            PageSize::new(-1.0, 792.0),
        )
        .unwrap_err();

        assert!(matches!(err, GeometryError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_fitting_placements_stay_inside_page() {
        // Any placement fully inside the capture frame maps inside the
        // page when aspect ratios match.
        let capture = PageSize::new(300.0, 400.0);
        let page = PageSize::new(600.0, 800.0);

        for (x, y, w, h) in [
            (0.0, 0.0, 300.0, 400.0),
            (10.0, 10.0, 50.0, 25.0),
            (250.0, 350.0, 50.0, 50.0),
            (150.0, 200.0, 149.0, 199.0),
        ] {
            let rect = to_page_space(Placement::new(x, y, w, h), capture, page).unwrap();
            assert!(rect.x >= -1e-9);
            assert!(rect.y >= -1e-9);
            assert!(rect.x + rect.width <= page.width + 1e-9);
            assert!(rect.y + rect.height <= page.height + 1e-9);
        }
    }
}
