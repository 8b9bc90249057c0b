//! Signature pad bound to a `<canvas>` element.
//!
//! [`SignaturePad`] owns a [`SignatureSurface`] drawing on the element,
//! registers mouse and touch listeners on it, and runs the debounced
//! emission on a browser timer. Dropping the pad (or calling
//! [`dispose`](SignaturePad::dispose)) removes the listeners and
//! invalidates any pending timer, so nothing is emitted afterwards.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::future::TimeoutFuture;
use intake_imaging::{
    ImageSource, PointerInput, PointerPhase, SignatureChange, SignatureConfig, SignatureSurface,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, HtmlCanvasElement, MouseEvent, TouchEvent};

use crate::canvas::HtmlCanvas;
use crate::clock::WebClock;
use crate::error::{WebError, console_warn};
use crate::pointer::{from_mouse, from_touch, geometry_for};
use crate::upload::read_file;

type Surface = SignatureSurface<HtmlCanvas, WebClock>;
type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Identifies the one live emission timer.
///
/// Bumped whenever the timer is re-armed or cancelled; a sleeping timer
/// only acts if its generation is still current.
#[derive(Default)]
struct TimerGeneration(Cell<u64>);

impl TimerGeneration {
    /// Invalidate every earlier timer and return the new generation.
    fn advance(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    /// Invalidate the live timer without arming another.
    fn cancel(&self) {
        self.advance();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.get() == generation
    }
}

/// State shared between the pad and its event/timer callbacks.
struct Shared {
    surface: RefCell<Surface>,
    timer: TimerGeneration,
}

/// Interactive signature pad on a canvas element.
pub struct SignaturePad {
    shared: Rc<Shared>,
    element: HtmlCanvasElement,
    listeners: Vec<(&'static str, Listener)>,
}

impl SignaturePad {
    /// Bind a pad to `element`.
    ///
    /// `on_change` receives the form value after every emitted change: a
    /// PNG data URL, or an empty string after a clear. It runs while the
    /// pad is busy and must not call back into it.
    ///
    /// # Errors
    ///
    /// Returns [`WebError`] if the canvas has no 2D context, the config
    /// is invalid, or a listener cannot be registered.
    pub fn attach(
        element: HtmlCanvasElement,
        config: SignatureConfig,
        mut on_change: impl FnMut(String) + 'static,
    ) -> Result<Self, WebError> {
        let canvas = HtmlCanvas::new(element.clone(), config.dimensions())?;
        let surface = SignatureSurface::new(canvas, WebClock, config, move |change: SignatureChange| {
            on_change(change.to_form_value());
        })?;

        let mut pad = Self {
            shared: Rc::new(Shared {
                surface: RefCell::new(surface),
                timer: TimerGeneration::default(),
            }),
            element,
            listeners: Vec::new(),
        };

        for (event_type, phase) in [
            ("mousedown", PointerPhase::Down),
            ("mousemove", PointerPhase::Move),
            ("mouseup", PointerPhase::Up),
            ("mouseleave", PointerPhase::Leave),
        ] {
            pad.listen(event_type, move |event| {
                event.dyn_ref::<MouseEvent>().map(|e| from_mouse(e, phase))
            })?;
        }
        for (event_type, phase) in [
            ("touchstart", PointerPhase::Down),
            ("touchmove", PointerPhase::Move),
            ("touchend", PointerPhase::Up),
            ("touchcancel", PointerPhase::Cancel),
        ] {
            pad.listen(event_type, move |event| {
                event.dyn_ref::<TouchEvent>().and_then(|e| from_touch(e, phase))
            })?;
        }

        tracing::debug!(
            width = config.width,
            height = config.height,
            "signature pad attached"
        );
        Ok(pad)
    }

    fn listen(
        &mut self,
        event_type: &'static str,
        translate: impl Fn(&web_sys::Event) -> Option<PointerInput> + 'static,
    ) -> Result<(), WebError> {
        let weak = Rc::downgrade(&self.shared);
        let element = self.element.clone();
        let listener = Listener::new(move |event: web_sys::Event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Some(input) = translate(&event) else {
                return;
            };
            let geometry = geometry_for(&element);
            let (handled, rescheduled) = {
                let mut surface = shared.surface.borrow_mut();
                let epoch = surface.emission_epoch();
                let handled = surface.handle_pointer(&input, &geometry);
                (handled, surface.emission_epoch() != epoch)
            };
            match handled {
                Ok(disposition) if disposition.prevents_default() => event.prevent_default(),
                Ok(_) => {}
                Err(e) => console_warn(&format!("signature stroke failed: {e}")),
            }
            // Hover moves leave the schedule alone; only re-arm on change.
            if rescheduled {
                arm_timer(&shared);
            }
        });

        // Touch listeners must be able to call preventDefault.
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        self.element
            .add_event_listener_with_callback_and_add_event_listener_options(
                event_type,
                listener.as_ref().unchecked_ref(),
                &options,
            )?;
        self.listeners.push((event_type, listener));
        Ok(())
    }

    /// `true` once the pad holds a signature.
    #[must_use]
    pub fn has_signature(&self) -> bool {
        self.shared.surface.borrow().has_signature()
    }

    /// Show a previously stored signature (a data URL).
    ///
    /// Returns `Ok(false)` if the pad is in use and the stored value was
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Signature`] if the value cannot be decoded.
    pub fn load_existing(&self, data_url: &str) -> Result<bool, WebError> {
        let loaded = self
            .shared
            .surface
            .borrow_mut()
            .load_existing(&ImageSource::DataUrl(data_url.to_owned()))?;
        arm_timer(&self.shared);
        Ok(loaded)
    }

    /// Read, validate, and place an uploaded file. Emits immediately.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::JsError`] if the file cannot be read, or
    /// [`WebError::Signature`] for type, size, and decode failures.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; File is !Send
    pub async fn upload(&self, file: &web_sys::File) -> Result<(), WebError> {
        let uploaded = read_file(file).await?;
        let result = self.shared.surface.borrow_mut().upload_image(&uploaded);
        arm_timer(&self.shared);
        result?;
        Ok(())
    }

    /// Blank the pad and emit an empty value.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Signature`] if the canvas cannot be filled.
    pub fn clear(&self) -> Result<(), WebError> {
        let result = self.shared.surface.borrow_mut().clear();
        arm_timer(&self.shared);
        Ok(result?)
    }

    /// Emit the current signature now and return it as a data URL.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Signature`] wrapping
    /// [`NoSignaturePresent`](intake_imaging::SignatureError::NoSignaturePresent)
    /// on a blank pad.
    pub fn save(&self) -> Result<String, WebError> {
        let result = self.shared.surface.borrow_mut().save();
        arm_timer(&self.shared);
        Ok(result?.to_data_url())
    }

    /// Detach from the element. No further changes are emitted.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for SignaturePad {
    fn drop(&mut self) {
        self.shared.timer.cancel();
        for (event_type, listener) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(event_type, listener.as_ref().unchecked_ref());
        }
    }
}

/// Re-arm the emission timer to match the surface's pending deadline.
///
/// Any earlier timer is invalidated, so at most one is ever live.
fn arm_timer(shared: &Rc<Shared>) {
    let generation = shared.timer.advance();
    let Some(delay) = shared.surface.borrow().pending_emission_in() else {
        return;
    };
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(millis).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if !shared.timer.is_current(generation) {
            return;
        }
        let polled = shared.surface.borrow_mut().poll_emission();
        if let Err(e) = polled {
            console_warn(&format!("signature emission failed: {e}"));
        }
        arm_timer(&shared);
    });
}
