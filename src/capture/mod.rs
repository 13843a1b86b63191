//! Signature capture surface
//!
//! Accumulates freehand stroke points on a bounded canvas and rasterizes
//! them to a PNG on demand. The pad is a plain mutable accumulator: the
//! UI event source pushes points, `export()` consumes them synchronously,
//! `clear()` resets for a retake. No network I/O.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

/// Default stroke thickness in pixels.
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Capture error
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Pad created with a zero dimension
    #[error("Invalid pad dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Export requested with no strokes recorded
    #[error("Nothing captured: the pad has no strokes")]
    EmptyCapture,

    /// PNG encoding failed
    #[error("Failed to encode capture: {0}")]
    Encode(#[from] image::ImageError),
}

/// An exported capture: the PNG raster plus the reference-frame
/// dimensions the coordinate transform needs.
#[derive(Debug, Clone)]
pub struct CaptureExport {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Freehand signature pad over a fixed-size canvas.
///
/// Points pushed outside the canvas are clamped to its edge; a bounded
/// surface cannot record beyond itself.
#[derive(Debug)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    stroke_width: u32,
    strokes: Vec<Vec<(f32, f32)>>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            stroke_width: DEFAULT_STROKE_WIDTH,
            strokes: Vec::new(),
        })
    }

    /// Override the stroke thickness.
    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width.max(1);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Start a new stroke. Subsequent `add_point` calls extend it.
    pub fn begin_stroke(&mut self) {
        self.strokes.push(Vec::new());
    }

    /// Append a point to the current stroke, clamped to the canvas.
    ///
    /// Starts a stroke implicitly if none is open.
    pub fn add_point(&mut self, x: f32, y: f32) {
        if self.strokes.is_empty() {
            self.strokes.push(Vec::new());
        }
        let clamped = (
            x.clamp(0.0, (self.width - 1) as f32),
            y.clamp(0.0, (self.height - 1) as f32),
        );
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.push(clamped);
        }
    }

    /// Drop all recorded strokes so the pad can be reused for a retake.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|s| s.is_empty())
    }

    /// Rasterize the strokes onto a transparent canvas and PNG-encode.
    ///
    /// The pad keeps its strokes afterwards; export can be repeated until
    /// `clear()` is called.
    pub fn export(&self) -> Result<CaptureExport, CaptureError> {
        if self.is_empty() {
            return Err(CaptureError::EmptyCapture);
        }

        let mut canvas = RgbaImage::new(self.width, self.height);
        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [point] => self.stamp(&mut canvas, *point),
                points => {
                    for pair in points.windows(2) {
                        self.draw_segment(&mut canvas, pair[0], pair[1]);
                    }
                }
            }
        }

        let mut png = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(CaptureExport {
            png,
            width: self.width,
            height: self.height,
        })
    }

    fn draw_segment(&self, canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32)) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(canvas, (from.0 + dx * t, from.1 + dy * t));
        }
    }

    /// Stamp an opaque black square of the stroke width centered at `point`.
    fn stamp(&self, canvas: &mut RgbaImage, point: (f32, f32)) {
        let ink = Rgba([0u8, 0, 0, 255]);
        let half = (self.stroke_width / 2) as i64;
        let cx = point.0.round() as i64;
        let cy = point.1.round() as i64;
        for y in (cy - half)..=(cy + half) {
            for x in (cx - half)..=(cx + half) {
                if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
                    canvas.put_pixel(x as u32, y as u32, ink);
                }
            }
        }
    }
}
