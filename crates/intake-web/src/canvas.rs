//! [`Canvas`] on a browser `<canvas>` element.
//!
//! Drawing goes through the element's `CanvasRenderingContext2d`.
//! Decoded images are staged on a detached scratch canvas via
//! `putImageData` and then composited with `drawImage`, which scales
//! them into the destination rectangle.

use intake_imaging::{Canvas, DestRect, Dimensions, ImagingError, Point, RasterBuffer, StrokeStyle};
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::error::{WebError, window};

/// A `<canvas>` element sized to the signature surface.
#[derive(Debug, Clone)]
pub struct HtmlCanvas {
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl HtmlCanvas {
    /// Take over `element`, resizing its backing store to `dimensions`.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::JsError`] if the 2D context is unavailable.
    pub fn new(element: HtmlCanvasElement, dimensions: Dimensions) -> Result<Self, WebError> {
        element.set_width(dimensions.width);
        element.set_height(dimensions.height);
        let context = context_2d(&element)?;
        Ok(Self { element, context })
    }

    /// The underlying element.
    #[must_use]
    pub const fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }
}

fn context_2d(element: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, WebError> {
    element
        .get_context("2d")?
        .ok_or_else(|| WebError::JsError("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| WebError::JsError("context is not a CanvasRenderingContext2d".into()))
}

/// CSS colour string for straight RGBA.
fn css_rgba([r, g, b, a]: [u8; 4]) -> String {
    format!("rgba({r}, {g}, {b}, {})", f64::from(a) / 255.0)
}

fn image_data(raster: &RasterBuffer) -> Result<ImageData, WebError> {
    Ok(ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(raster.as_raw()),
        raster.width(),
        raster.height(),
    )?)
}

fn stage(raster: &RasterBuffer) -> Result<HtmlCanvasElement, WebError> {
    let document = window()?
        .document()
        .ok_or_else(|| WebError::JsError("no document".into()))?;
    let scratch = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| WebError::JsError("created element is not a canvas".into()))?;
    scratch.set_width(raster.width());
    scratch.set_height(raster.height());
    context_2d(&scratch)?.put_image_data(&image_data(raster)?, 0.0, 0.0)?;
    Ok(scratch)
}

impl Canvas for HtmlCanvas {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.element.width(), self.element.height())
    }

    fn fill(&mut self, rgba: [u8; 4]) -> Result<(), ImagingError> {
        let (w, h) = (f64::from(self.element.width()), f64::from(self.element.height()));
        self.context.clear_rect(0.0, 0.0, w, h);
        self.context.set_fill_style_str(&css_rgba(rgba));
        self.context.fill_rect(0.0, 0.0, w, h);
        Ok(())
    }

    fn draw_image(&mut self, image: &RasterBuffer, dest: DestRect) -> Result<(), ImagingError> {
        let scratch = stage(image)?;
        self.context.set_image_smoothing_enabled(true);
        self.context
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &scratch,
                dest.x,
                dest.y,
                dest.width,
                dest.height,
            )
            .map_err(WebError::from)?;
        Ok(())
    }

    fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &StrokeStyle,
    ) -> Result<(), ImagingError> {
        let ctx = &self.context;
        ctx.set_stroke_style_str(&css_rgba(style.color));
        ctx.set_line_width(f64::from(style.width));
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
        Ok(())
    }

    fn snapshot(&self) -> Result<RasterBuffer, ImagingError> {
        let (w, h) = (self.element.width(), self.element.height());
        let data = self
            .context
            .get_image_data(0.0, 0.0, f64::from(w), f64::from(h))
            .map_err(WebError::from)?;
        RasterBuffer::new(w, h, data.data().0)
    }

    fn replace(&mut self, raster: &RasterBuffer) -> Result<(), ImagingError> {
        if raster.dimensions() != self.dimensions() {
            return Err(ImagingError::Canvas(format!(
                "cannot replace a {}x{} canvas with a {}x{} raster",
                self.element.width(),
                self.element.height(),
                raster.width(),
                raster.height()
            )));
        }
        self.context
            .put_image_data(&image_data(raster)?, 0.0, 0.0)
            .map_err(WebError::from)?;
        Ok(())
    }
}
