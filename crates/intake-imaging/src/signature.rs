//! Freehand signature capture.
//!
//! [`SignatureSurface`] owns a fixed-size [`Canvas`], runs the
//! press/move/release state machine for freehand strokes, accepts
//! uploaded signature images, and reports every content change to a
//! caller-supplied callback as an encoded PNG.
//!
//! # Emission rules
//!
//! - Ending a stroke, or loading an existing signature, schedules a
//!   trailing-debounced emission after the configured settle delay.
//!   Starting a new stroke cancels a pending emission; ending it
//!   schedules a fresh one.
//! - `upload_image`, `save`, and `clear` emit synchronously and drop
//!   any pending debounced emission.
//! - `clear` emits [`SignatureChange::Cleared`] instead of an image.
//!
//! The surface has no timer of its own. A driver asks
//! [`pending_emission_in`](SignatureSurface::pending_emission_in) how
//! long to wait and then calls
//! [`poll_emission`](SignatureSurface::poll_emission).

use std::time::Duration;

use crate::canvas::{Canvas, DestRect, StrokeStyle};
use crate::clock::Clock;
use crate::codec::{self, EncodedImage, ImageSource};
use crate::debounce::Debouncer;
use crate::pointer::{EventDisposition, PointerInput, PointerKind, PointerPhase, SurfaceGeometry};
use crate::types::{
    Dimensions, ImagingError, Point, RasterBuffer, SignatureConfig, SignatureError, WHITE,
};
use crate::upload::{UploadedFile, fit_within};

/// What the change callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureChange {
    /// The surface now holds this signature.
    Image(EncodedImage),
    /// The signature was cleared.
    Cleared,
}

impl SignatureChange {
    /// The value the form stores for this change: a PNG data URL, or an
    /// empty string when cleared.
    #[must_use]
    pub fn to_form_value(&self) -> String {
        match self {
            Self::Image(image) => image.to_data_url(),
            Self::Cleared => String::new(),
        }
    }
}

/// An in-progress stroke.
#[derive(Debug, Clone, Copy)]
struct StrokeState {
    last_point: Point,
}

/// Change callback type.
type ChangeCallback = Box<dyn FnMut(SignatureChange)>;

/// Interactive signature capture surface.
pub struct SignatureSurface<C: Canvas, K: Clock> {
    config: SignatureConfig,
    canvas: C,
    stroke: Option<StrokeState>,
    has_signature: bool,
    debouncer: Debouncer<K>,
    on_change: ChangeCallback,
}

impl<C: Canvas, K: Clock> SignatureSurface<C, K> {
    /// Create a surface and paint it opaque white.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] wrapping
    /// [`ImagingError::InvalidConfig`] if the config is invalid or the
    /// canvas size does not match it, or any canvas error from the
    /// initial fill.
    pub fn new(
        mut canvas: C,
        clock: K,
        config: SignatureConfig,
        on_change: impl FnMut(SignatureChange) + 'static,
    ) -> Result<Self, SignatureError> {
        config.validate()?;
        let actual = canvas.dimensions();
        if actual != config.dimensions() {
            return Err(ImagingError::InvalidConfig(format!(
                "canvas is {}x{} but the surface is configured for {}x{}",
                actual.width, actual.height, config.width, config.height
            ))
            .into());
        }
        canvas.fill(WHITE)?;

        Ok(Self {
            config,
            canvas,
            stroke: None,
            has_signature: false,
            debouncer: Debouncer::new(clock, config.settle_delay()),
            on_change: Box::new(on_change),
        })
    }

    /// Surface configuration.
    #[must_use]
    pub const fn config(&self) -> &SignatureConfig {
        &self.config
    }

    /// Surface size in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.config.dimensions()
    }

    /// `true` once strokes have been drawn or an image loaded, until
    /// the next `clear`.
    #[must_use]
    pub const fn has_signature(&self) -> bool {
        self.has_signature
    }

    /// `true` between `begin_stroke` and `end_stroke`.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Borrow the backing canvas.
    #[must_use]
    pub const fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Current pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] if the canvas cannot be read.
    pub fn snapshot(&self) -> Result<RasterBuffer, SignatureError> {
        Ok(self.canvas.snapshot()?)
    }

    /// Encode the current pixels as PNG without emitting.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] if reading or encoding fails.
    pub fn encode(&self) -> Result<EncodedImage, SignatureError> {
        Ok(codec::encode_png(&self.canvas.snapshot()?)?)
    }

    // --- Gesture lifecycle ---

    /// Idle -> Drawing at `point` (surface pixels). Ignored while
    /// already drawing. Cancels any pending debounced emission.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.stroke.is_some() {
            return;
        }
        self.stroke = Some(StrokeState { last_point: point });
        self.debouncer.cancel();
    }

    /// Paint a segment from the last point to `point` and mark the
    /// surface as signed. Ignored while idle.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] if the canvas rejects the
    /// stroke; the gesture state is left unchanged.
    pub fn extend_stroke(&mut self, point: Point) -> Result<(), SignatureError> {
        let Some(stroke) = self.stroke.as_mut() else {
            return Ok(());
        };
        self.canvas
            .stroke_segment(stroke.last_point, point, &StrokeStyle::SIGNATURE)?;
        stroke.last_point = point;
        self.has_signature = true;
        Ok(())
    }

    /// Drawing -> Idle. Schedules a debounced emission if the surface
    /// holds a signature. Ignored while idle.
    pub fn end_stroke(&mut self) {
        if self.stroke.take().is_none() {
            return;
        }
        if self.has_signature {
            self.debouncer.schedule();
            tracing::debug!(
                delay_ms = self.debouncer.delay().as_millis(),
                "signature emission scheduled"
            );
        }
    }

    /// Feed one normalized pointer event.
    ///
    /// Returns whether the platform should suppress its default action:
    /// touch and pen presses and moves that the surface consumes own the
    /// gesture exclusively.
    ///
    /// # Errors
    ///
    /// Propagates canvas errors from [`extend_stroke`](Self::extend_stroke).
    pub fn handle_pointer(
        &mut self,
        input: &PointerInput,
        geometry: &SurfaceGeometry,
    ) -> Result<EventDisposition, SignatureError> {
        let direct_contact = matches!(input.kind, PointerKind::Touch | PointerKind::Pen);
        let consumed = match input.phase {
            PointerPhase::Down => {
                self.begin_stroke(geometry.to_surface(input.client));
                true
            }
            PointerPhase::Move if self.is_drawing() => {
                self.extend_stroke(geometry.to_surface(input.client))?;
                true
            }
            PointerPhase::Move => false,
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => {
                self.end_stroke();
                false
            }
        };

        Ok(if consumed && direct_contact {
            EventDisposition::PreventDefault
        } else {
            EventDisposition::Default
        })
    }

    // --- Image input ---

    /// Stretch an existing signature over the whole surface.
    ///
    /// Skipped (returns `Ok(false)`) while a stroke is in progress or
    /// once the surface already holds a signature, so a reload never
    /// clobbers fresh work. On success the surface is signed and a
    /// debounced emission is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Decode`] if the image cannot be
    /// decoded, or [`SignatureError::Imaging`] on a canvas failure. The
    /// canvas is left untouched in both cases.
    pub fn load_existing(&mut self, source: &ImageSource) -> Result<bool, SignatureError> {
        if self.is_drawing() || self.has_signature {
            tracing::debug!("existing signature ignored: surface already in use");
            return Ok(false);
        }
        let image = source.decode().map_err(SignatureError::Decode)?;
        self.paint(&image, DestRect::covering(self.dimensions()))?;
        self.has_signature = true;
        self.debouncer.schedule();
        Ok(true)
    }

    /// Validate, decode, and place an uploaded image, then emit it.
    ///
    /// The image is scaled down to fit (never up), centered, and
    /// flattened onto white. Emission is immediate.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidFileType`],
    /// [`SignatureError::FileTooLarge`], [`SignatureError::Decode`], or
    /// [`SignatureError::Imaging`]. The canvas is untouched on failure.
    pub fn upload_image(&mut self, file: &UploadedFile) -> Result<EncodedImage, SignatureError> {
        file.validate(self.config.max_upload_bytes)?;
        let image = codec::decode(&file.bytes).map_err(SignatureError::Decode)?;

        let dest = fit_within(image.dimensions(), self.dimensions());
        let previous = self.paint(&image, dest)?;
        let encoded = match self.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                self.restore(&previous);
                return Err(e);
            }
        };

        tracing::debug!(
            name = %file.name,
            source_width = image.width(),
            source_height = image.height(),
            "signature uploaded"
        );
        self.has_signature = true;
        self.debouncer.cancel();
        self.emit(SignatureChange::Image(encoded.clone()));
        Ok(encoded)
    }

    // --- Manual actions ---

    /// Blank the surface and emit [`SignatureChange::Cleared`].
    ///
    /// Also ends any stroke in progress and drops a pending emission.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] if the canvas cannot be
    /// filled; nothing is emitted in that case.
    pub fn clear(&mut self) -> Result<(), SignatureError> {
        self.canvas.fill(WHITE)?;
        self.stroke = None;
        self.has_signature = false;
        self.debouncer.cancel();
        self.emit(SignatureChange::Cleared);
        Ok(())
    }

    /// Encode and emit the current signature immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::NoSignaturePresent`] on a blank
    /// surface, or [`SignatureError::Imaging`] if encoding fails.
    pub fn save(&mut self) -> Result<EncodedImage, SignatureError> {
        if !self.has_signature {
            return Err(SignatureError::NoSignaturePresent);
        }
        let encoded = self.encode()?;
        self.debouncer.cancel();
        self.emit(SignatureChange::Image(encoded.clone()));
        Ok(encoded)
    }

    // --- Debounced emission ---

    /// Time until the pending debounced emission is due, if any.
    #[must_use]
    pub fn pending_emission_in(&self) -> Option<Duration> {
        self.debouncer.remaining()
    }

    /// Changes whenever the pending emission is scheduled, moved,
    /// cancelled, or consumed. A host timer only needs re-arming when
    /// this differs from the value it last saw.
    #[must_use]
    pub const fn emission_epoch(&self) -> u64 {
        self.debouncer.epoch()
    }

    /// Emit the pending change if its settle delay has elapsed.
    ///
    /// Returns `Ok(true)` if something was emitted.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Imaging`] if encoding fails; the
    /// pending emission is consumed either way.
    pub fn poll_emission(&mut self) -> Result<bool, SignatureError> {
        if !self.debouncer.poll() {
            return Ok(false);
        }
        if self.is_drawing() || !self.has_signature {
            return Ok(false);
        }
        let encoded = self.encode()?;
        self.emit(SignatureChange::Image(encoded));
        Ok(true)
    }

    /// Tear the surface down. A pending emission is discarded and the
    /// callback is never invoked again.
    pub fn dispose(self) {
        drop(self);
    }

    // --- Internals ---

    /// Flatten `image` onto white at `dest`, returning the previous
    /// pixels. Restores them if drawing fails part-way.
    fn paint(&mut self, image: &RasterBuffer, dest: DestRect) -> Result<RasterBuffer, SignatureError> {
        let previous = self.canvas.snapshot()?;
        let painted = self
            .canvas
            .fill(WHITE)
            .and_then(|()| self.canvas.draw_image(image, dest));
        if let Err(e) = painted {
            self.restore(&previous);
            return Err(e.into());
        }
        Ok(previous)
    }

    fn restore(&mut self, previous: &RasterBuffer) {
        if let Err(e) = self.canvas.replace(previous) {
            tracing::warn!("failed to restore signature surface: {e}");
        }
    }

    fn emit(&mut self, change: SignatureChange) {
        match &change {
            SignatureChange::Image(image) => {
                tracing::debug!(bytes = image.as_bytes().len(), "signature captured");
            }
            SignatureChange::Cleared => tracing::debug!("signature cleared"),
        }
        (self.on_change)(change);
    }
}

impl<C: Canvas, K: Clock> Drop for SignatureSurface<C, K> {
    fn drop(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::canvas::SkiaCanvas;
    use crate::clock::ManualClock;

    type Emissions = Rc<RefCell<Vec<(Duration, SignatureChange)>>>;

    struct Harness {
        surface: SignatureSurface<SkiaCanvas, ManualClock>,
        clock: ManualClock,
        emissions: Emissions,
    }

    fn harness() -> Harness {
        harness_with(SignatureConfig::default())
    }

    fn harness_with(config: SignatureConfig) -> Harness {
        let clock = ManualClock::new();
        let emissions: Emissions = Rc::default();
        let sink = Rc::clone(&emissions);
        let stamp = clock.clone();
        let canvas = SkiaCanvas::new(config.dimensions()).unwrap();
        let surface = SignatureSurface::new(canvas, clock.clone(), config, move |change| {
            sink.borrow_mut().push((stamp.current(), change));
        })
        .unwrap();
        Harness {
            surface,
            clock,
            emissions,
        }
    }

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn draw_line(surface: &mut SignatureSurface<SkiaCanvas, ManualClock>) {
        surface.begin_stroke(Point::new(20.0, 75.0));
        surface.extend_stroke(Point::new(200.0, 75.0)).unwrap();
        surface.extend_stroke(Point::new(380.0, 40.0)).unwrap();
        surface.end_stroke();
    }

    fn is_red(p: [u8; 4]) -> bool {
        p[0] > 200 && p[1] < 60 && p[2] < 60 && p[3] == 255
    }

    #[test]
    fn new_surface_is_opaque_white_and_unsigned() {
        let h = harness();
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.as_image().pixels().all(|p| p.0 == WHITE));
        assert!(!h.surface.has_signature());
        assert!(!h.surface.is_drawing());
    }

    #[test]
    fn canvas_size_must_match_config() {
        let canvas = SkiaCanvas::new(Dimensions::new(10, 10)).unwrap();
        let result = SignatureSurface::new(
            canvas,
            ManualClock::new(),
            SignatureConfig::default(),
            |_| {},
        );
        assert!(matches!(
            result,
            Err(SignatureError::Imaging(ImagingError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn press_and_release_without_move_is_not_a_signature() {
        let mut h = harness();
        h.surface.begin_stroke(Point::new(10.0, 10.0));
        assert!(h.surface.is_drawing());
        h.surface.end_stroke();
        assert!(!h.surface.has_signature());
        assert_eq!(h.surface.pending_emission_in(), None);
    }

    #[test]
    fn move_while_drawing_marks_signature() {
        let mut h = harness();
        draw_line(&mut h.surface);
        assert!(h.surface.has_signature());
        assert!(!h.surface.is_drawing());
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.pixel(100, 75)[0] < 128, "stroke should be dark");
    }

    #[test]
    fn extend_while_idle_is_ignored() {
        let mut h = harness();
        h.surface.extend_stroke(Point::new(50.0, 50.0)).unwrap();
        h.surface.end_stroke();
        assert!(!h.surface.has_signature());
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.as_image().pixels().all(|p| p.0 == WHITE));
    }

    #[test]
    fn second_press_keeps_original_anchor() {
        let mut h = harness();
        h.surface.begin_stroke(Point::new(10.0, 10.0));
        h.surface.begin_stroke(Point::new(300.0, 100.0));
        h.surface.extend_stroke(Point::new(30.0, 10.0)).unwrap();
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.pixel(20, 10)[0] < 128);
    }

    #[test]
    fn end_stroke_emits_once_after_settle_delay() {
        let mut h = harness();
        draw_line(&mut h.surface);
        assert_eq!(
            h.surface.pending_emission_in(),
            Some(Duration::from_millis(100))
        );

        h.clock.advance(Duration::from_millis(99));
        assert!(!h.surface.poll_emission().unwrap());
        h.clock.advance(Duration::from_millis(1));
        assert!(h.surface.poll_emission().unwrap());
        assert!(!h.surface.poll_emission().unwrap());

        let emissions = h.emissions.borrow();
        assert_eq!(emissions.len(), 1);
        assert!(matches!(emissions[0].1, SignatureChange::Image(_)));
    }

    #[test]
    fn two_changes_fifty_ms_apart_emit_once() {
        let mut h = harness();
        draw_line(&mut h.surface);
        h.clock.advance(Duration::from_millis(50));
        assert!(!h.surface.poll_emission().unwrap());
        draw_line(&mut h.surface);
        let second = h.clock.current();

        for _ in 0..30 {
            h.clock.advance(Duration::from_millis(10));
            h.surface.poll_emission().unwrap();
        }

        let emissions = h.emissions.borrow();
        assert_eq!(emissions.len(), 1);
        assert!(emissions[0].0 >= second + Duration::from_millis(100));
    }

    #[test]
    fn new_stroke_cancels_pending_emission() {
        let mut h = harness();
        draw_line(&mut h.surface);
        h.clock.advance(Duration::from_millis(60));
        h.surface.begin_stroke(Point::new(5.0, 5.0));
        assert_eq!(h.surface.pending_emission_in(), None);
        h.clock.advance(Duration::from_millis(200));
        assert!(!h.surface.poll_emission().unwrap());
        assert!(h.emissions.borrow().is_empty());
    }

    #[test]
    fn clear_resets_and_emits_sentinel_synchronously() {
        let mut h = harness();
        draw_line(&mut h.surface);
        h.surface.clear().unwrap();

        assert!(!h.surface.has_signature());
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.as_image().pixels().all(|p| p.0 == WHITE));
        {
            let emissions = h.emissions.borrow();
            assert_eq!(emissions.len(), 1);
            assert_eq!(emissions[0].1, SignatureChange::Cleared);
            assert_eq!(emissions[0].1.to_form_value(), "");
        }

        // The stroke's pending emission must not fire after the clear.
        h.clock.advance(Duration::from_secs(1));
        assert!(!h.surface.poll_emission().unwrap());
        assert_eq!(h.emissions.borrow().len(), 1);
    }

    #[test]
    fn clear_on_blank_surface_still_emits() {
        let mut h = harness();
        h.surface.clear().unwrap();
        assert_eq!(h.emissions.borrow().len(), 1);
        assert!(!h.surface.has_signature());
    }

    #[test]
    fn save_requires_signature() {
        let mut h = harness();
        assert!(matches!(
            h.surface.save(),
            Err(SignatureError::NoSignaturePresent)
        ));
        assert!(h.emissions.borrow().is_empty());
    }

    #[test]
    fn save_emits_synchronously_and_drops_pending() {
        let mut h = harness();
        draw_line(&mut h.surface);
        let saved = h.surface.save().unwrap();
        assert_eq!(h.emissions.borrow().len(), 1);
        assert_eq!(h.emissions.borrow()[0].1, SignatureChange::Image(saved.clone()));
        assert!(saved.to_data_url().starts_with("data:image/png;base64,"));

        h.clock.advance(Duration::from_secs(1));
        assert!(!h.surface.poll_emission().unwrap());
        assert_eq!(h.emissions.borrow().len(), 1);
    }

    #[test]
    fn upload_rejects_text_file_without_touching_canvas() {
        let mut h = harness();
        draw_line(&mut h.surface);
        let before = h.surface.snapshot().unwrap();
        let file = UploadedFile::new("a.txt", "text/plain", b"not an image".to_vec());
        assert!(matches!(
            h.surface.upload_image(&file),
            Err(SignatureError::InvalidFileType(_))
        ));
        assert_eq!(h.surface.snapshot().unwrap(), before);
    }

    #[test]
    fn upload_rejects_six_mib_file() {
        let mut h = harness();
        let file = UploadedFile::new("big.png", "image/png", vec![0; 6 * 1024 * 1024]);
        assert!(matches!(
            h.surface.upload_image(&file),
            Err(SignatureError::FileTooLarge { .. })
        ));
        assert!(!h.surface.has_signature());
    }

    #[test]
    fn upload_with_corrupt_bytes_is_decode_error() {
        let mut h = harness();
        let file = UploadedFile::new("bad.png", "image/png", vec![0xFF, 0x00, 0x12]);
        assert!(matches!(
            h.surface.upload_image(&file),
            Err(SignatureError::Decode(_))
        ));
        assert!(h.emissions.borrow().is_empty());
    }

    #[test]
    fn upload_scales_large_image_to_fill_exactly() {
        let mut h = harness();
        let file = UploadedFile::new("sig.png", "image/png", png(800, 300, [255, 0, 0, 255]));
        let encoded = h.surface.upload_image(&file).unwrap();

        let snap = h.surface.snapshot().unwrap();
        for (x, y) in [(2, 2), (397, 2), (2, 147), (397, 147), (200, 75)] {
            assert!(is_red(snap.pixel(x, y)), "pixel ({x}, {y}) = {:?}", snap.pixel(x, y));
        }
        assert!(h.surface.has_signature());

        // Emitted immediately, nothing left pending.
        let emissions = h.emissions.borrow();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].1, SignatureChange::Image(encoded));
        assert_eq!(h.surface.pending_emission_in(), None);
    }

    #[test]
    fn upload_centers_small_image_on_white() {
        let mut h = harness();
        let file = UploadedFile::new("sig.png", "image/png", png(100, 50, [255, 0, 0, 255]));
        h.surface.upload_image(&file).unwrap();

        let snap = h.surface.snapshot().unwrap();
        assert_eq!(snap.pixel(10, 10), WHITE);
        assert_eq!(snap.pixel(149, 75), WHITE);
        assert!(is_red(snap.pixel(150, 50)));
        assert!(is_red(snap.pixel(249, 99)));
        assert_eq!(snap.pixel(250, 75), WHITE);
    }

    #[test]
    fn upload_flattens_transparency_onto_white() {
        let mut h = harness();
        let file = UploadedFile::new("sig.png", "image/png", png(400, 150, [0, 0, 0, 0]));
        h.surface.upload_image(&file).unwrap();
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.as_image().pixels().all(|p| p.0 == WHITE));
    }

    #[test]
    fn load_existing_stretches_and_schedules() {
        let mut h = harness();
        let source = ImageSource::Bytes(png(40, 10, [255, 0, 0, 255]));
        assert!(h.surface.load_existing(&source).unwrap());
        assert!(h.surface.has_signature());
        let snap = h.surface.snapshot().unwrap();
        assert!(is_red(snap.pixel(5, 5)));
        assert!(is_red(snap.pixel(394, 144)));

        assert!(h.emissions.borrow().is_empty());
        h.clock.advance(Duration::from_millis(100));
        assert!(h.surface.poll_emission().unwrap());
    }

    #[test]
    fn load_existing_accepts_data_url() {
        let mut h = harness();
        let url = EncodedImage::from_png_bytes(png(4, 4, [255, 0, 0, 255])).to_data_url();
        assert!(h.surface.load_existing(&ImageSource::DataUrl(url)).unwrap());
        assert!(h.surface.has_signature());
    }

    #[test]
    fn load_existing_never_clobbers_active_stroke() {
        let mut h = harness();
        h.surface.begin_stroke(Point::new(10.0, 10.0));
        let source = ImageSource::Bytes(png(4, 4, [255, 0, 0, 255]));
        assert!(!h.surface.load_existing(&source).unwrap());
        assert!(!h.surface.has_signature());
        let snap = h.surface.snapshot().unwrap();
        assert_eq!(snap.pixel(200, 75), WHITE);
    }

    #[test]
    fn load_existing_skips_when_already_signed() {
        let mut h = harness();
        draw_line(&mut h.surface);
        let before = h.surface.snapshot().unwrap();
        let source = ImageSource::Bytes(png(4, 4, [255, 0, 0, 255]));
        assert!(!h.surface.load_existing(&source).unwrap());
        assert_eq!(h.surface.snapshot().unwrap(), before);
    }

    #[test]
    fn load_existing_decode_failure_leaves_surface_blank() {
        let mut h = harness();
        let source = ImageSource::Bytes(vec![1, 2, 3]);
        assert!(matches!(
            h.surface.load_existing(&source),
            Err(SignatureError::Decode(_))
        ));
        assert!(!h.surface.has_signature());
        assert_eq!(h.surface.pending_emission_in(), None);
    }

    #[test]
    fn touch_press_and_move_prevent_default() {
        let mut h = harness();
        let geometry = SurfaceGeometry::unscaled(h.surface.dimensions());
        let down = PointerInput::new(PointerKind::Touch, PointerPhase::Down, 10.0, 10.0);
        let moved = PointerInput::new(PointerKind::Touch, PointerPhase::Move, 50.0, 10.0);
        let up = PointerInput::new(PointerKind::Touch, PointerPhase::Up, 50.0, 10.0);

        assert!(h.surface.handle_pointer(&down, &geometry).unwrap().prevents_default());
        assert!(h.surface.handle_pointer(&moved, &geometry).unwrap().prevents_default());
        assert_eq!(
            h.surface.handle_pointer(&up, &geometry).unwrap(),
            EventDisposition::Default
        );
        assert!(h.surface.has_signature());
    }

    #[test]
    fn mouse_events_keep_default_and_idle_moves_are_ignored() {
        let mut h = harness();
        let geometry = SurfaceGeometry::unscaled(h.surface.dimensions());
        let hover = PointerInput::new(PointerKind::Mouse, PointerPhase::Move, 50.0, 10.0);
        assert_eq!(
            h.surface.handle_pointer(&hover, &geometry).unwrap(),
            EventDisposition::Default
        );
        assert!(!h.surface.has_signature());

        let down = PointerInput::new(PointerKind::Mouse, PointerPhase::Down, 10.0, 10.0);
        assert_eq!(
            h.surface.handle_pointer(&down, &geometry).unwrap(),
            EventDisposition::Default
        );
    }

    #[test]
    fn pointer_leave_ends_gesture() {
        let mut h = harness();
        let geometry = SurfaceGeometry::unscaled(h.surface.dimensions());
        for input in [
            PointerInput::new(PointerKind::Mouse, PointerPhase::Down, 10.0, 10.0),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Move, 60.0, 10.0),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Leave, 400.0, 10.0),
        ] {
            h.surface.handle_pointer(&input, &geometry).unwrap();
        }
        assert!(!h.surface.is_drawing());
        assert!(h.surface.pending_emission_in().is_some());
    }

    #[test]
    fn scaled_display_maps_pointer_to_surface_pixels() {
        let mut h = harness();
        // Displayed at half size.
        let geometry = SurfaceGeometry {
            left: 0.0,
            top: 0.0,
            display_width: 200.0,
            display_height: 75.0,
            surface: h.surface.dimensions(),
        };
        for input in [
            PointerInput::new(PointerKind::Mouse, PointerPhase::Down, 50.0, 37.5),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Move, 150.0, 37.5),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Up, 150.0, 37.5),
        ] {
            h.surface.handle_pointer(&input, &geometry).unwrap();
        }
        let snap = h.surface.snapshot().unwrap();
        assert!(snap.pixel(200, 75)[0] < 128, "stroke should land at surface x=200");
        assert_eq!(snap.pixel(40, 75), WHITE);
    }

    #[test]
    fn hover_moves_leave_emission_schedule_alone() {
        let mut h = harness();
        let geometry = SurfaceGeometry::unscaled(h.surface.dimensions());
        let epoch = h.surface.emission_epoch();
        for x in [20.0, 40.0, 60.0] {
            let hover = PointerInput::new(PointerKind::Mouse, PointerPhase::Move, x, 10.0);
            h.surface.handle_pointer(&hover, &geometry).unwrap();
        }
        assert_eq!(h.surface.emission_epoch(), epoch);

        for input in [
            PointerInput::new(PointerKind::Mouse, PointerPhase::Down, 10.0, 10.0),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Move, 60.0, 10.0),
            PointerInput::new(PointerKind::Mouse, PointerPhase::Up, 60.0, 10.0),
        ] {
            h.surface.handle_pointer(&input, &geometry).unwrap();
        }
        let scheduled = h.surface.emission_epoch();
        assert_ne!(scheduled, epoch, "finished stroke schedules an emission");

        let hover = PointerInput::new(PointerKind::Mouse, PointerPhase::Move, 80.0, 10.0);
        h.surface.handle_pointer(&hover, &geometry).unwrap();
        assert_eq!(h.surface.emission_epoch(), scheduled);
        assert!(h.surface.pending_emission_in().is_some());
    }

    #[test]
    fn dispose_discards_pending_emission() {
        let Harness {
            mut surface,
            clock,
            emissions,
        } = harness();
        draw_line(&mut surface);
        assert!(surface.pending_emission_in().is_some());
        assert_eq!(Rc::strong_count(&emissions), 2, "callback holds the sink");

        surface.dispose();
        // The callback went with the surface, so nothing can reach the sink.
        assert_eq!(Rc::strong_count(&emissions), 1);
        clock.advance(Duration::from_secs(1));
        assert!(emissions.borrow().is_empty());
    }
}
