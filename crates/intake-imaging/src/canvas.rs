//! Drawing surface abstraction.
//!
//! [`Canvas`] is the small set of drawing operations the signature
//! surface needs: fill, draw a decoded image into a rectangle, stroke a
//! line segment, read the pixels back. [`SkiaCanvas`] implements it
//! natively on a `tiny-skia` pixmap; the browser crate implements it on
//! a `CanvasRenderingContext2d`.

use tiny_skia::{
    Color, ColorU8, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

use crate::types::{BLACK, Dimensions, ImagingError, Point, RasterBuffer};

/// Destination rectangle for [`Canvas::draw_image`], in surface pixels.
///
/// Fractional positions and sizes are allowed; the source image is
/// scaled independently on each axis to fill it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl DestRect {
    /// A rectangle covering the whole of `dimensions`.
    #[must_use]
    pub fn covering(dimensions: Dimensions) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(dimensions.width),
            height: f64::from(dimensions.height),
        }
    }
}

/// Pen used for freehand strokes. Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Line width in surface pixels.
    pub width: f32,
    /// Straight RGBA colour.
    pub color: [u8; 4],
}

impl StrokeStyle {
    /// The signature pen: 2 px, opaque black.
    pub const SIGNATURE: Self = Self {
        width: 2.0,
        color: BLACK,
    };
}

/// A mutable raster drawing surface of fixed size.
pub trait Canvas {
    /// Surface size in pixels.
    fn dimensions(&self) -> Dimensions;

    /// Fill every pixel with `rgba`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::Canvas`] if the backend rejects the call.
    fn fill(&mut self, rgba: [u8; 4]) -> Result<(), ImagingError>;

    /// Composite `image` over the surface, scaled to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::CanvasAllocation`] or
    /// [`ImagingError::Canvas`] if the backend cannot stage the image.
    fn draw_image(&mut self, image: &RasterBuffer, dest: DestRect) -> Result<(), ImagingError>;

    /// Stroke a straight segment from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::Canvas`] if the backend rejects the call.
    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &StrokeStyle,
    ) -> Result<(), ImagingError>;

    /// Copy the current contents out as straight RGBA.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::Canvas`] if the pixels cannot be read.
    fn snapshot(&self) -> Result<RasterBuffer, ImagingError>;

    /// Overwrite the surface with a raster of identical size.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::Canvas`] on a size mismatch.
    fn replace(&mut self, raster: &RasterBuffer) -> Result<(), ImagingError>;
}

/// Native [`Canvas`] backed by a `tiny-skia` pixmap.
#[derive(Debug, Clone)]
pub struct SkiaCanvas {
    pixmap: Pixmap,
}

impl SkiaCanvas {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::CanvasAllocation`] for a zero-sized or
    /// oversized surface.
    pub fn new(dimensions: Dimensions) -> Result<Self, ImagingError> {
        let pixmap = Pixmap::new(dimensions.width, dimensions.height).ok_or(
            ImagingError::CanvasAllocation {
                width: dimensions.width,
                height: dimensions.height,
            },
        )?;
        Ok(Self { pixmap })
    }
}

/// Convert a straight-alpha raster into a premultiplied pixmap.
fn to_pixmap(raster: &RasterBuffer) -> Result<Pixmap, ImagingError> {
    let mut pixmap =
        Pixmap::new(raster.width(), raster.height()).ok_or(ImagingError::CanvasAllocation {
            width: raster.width(),
            height: raster.height(),
        })?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(raster.as_image().pixels())
    {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

impl Canvas for SkiaCanvas {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixmap.width(), self.pixmap.height())
    }

    fn fill(&mut self, rgba: [u8; 4]) -> Result<(), ImagingError> {
        let [r, g, b, a] = rgba;
        self.pixmap.fill(Color::from_rgba8(r, g, b, a));
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_image(&mut self, image: &RasterBuffer, dest: DestRect) -> Result<(), ImagingError> {
        let source = to_pixmap(image)?;
        let scale_x = dest.width / f64::from(image.width());
        let scale_y = dest.height / f64::from(image.height());

        // Unscaled, pixel-aligned draws copy exactly.
        let aligned = (scale_x - 1.0).abs() < f64::EPSILON
            && (scale_y - 1.0).abs() < f64::EPSILON
            && dest.x.fract().abs() < f64::EPSILON
            && dest.y.fract().abs() < f64::EPSILON;
        let paint = PixmapPaint {
            quality: if aligned {
                FilterQuality::Nearest
            } else {
                FilterQuality::Bilinear
            },
            ..PixmapPaint::default()
        };

        let transform = Transform::from_row(
            scale_x as f32,
            0.0,
            0.0,
            scale_y as f32,
            dest.x as f32,
            dest.y as f32,
        );
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &StrokeStyle,
    ) -> Result<(), ImagingError> {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            // Degenerate segment (e.g. zero length): nothing to paint.
            return Ok(());
        };

        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        let [r, g, b, a] = style.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }

    fn snapshot(&self) -> Result<RasterBuffer, ImagingError> {
        let mut pixels = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RasterBuffer::new(self.pixmap.width(), self.pixmap.height(), pixels)
    }

    fn replace(&mut self, raster: &RasterBuffer) -> Result<(), ImagingError> {
        if raster.dimensions() != self.dimensions() {
            return Err(ImagingError::Canvas(format!(
                "cannot replace a {}x{} surface with a {}x{} raster",
                self.pixmap.width(),
                self.pixmap.height(),
                raster.width(),
                raster.height(),
            )));
        }
        self.pixmap = to_pixmap(raster)?;
        Ok(())
    }
}
