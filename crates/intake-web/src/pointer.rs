//! DOM event translation into [`PointerInput`].

use intake_imaging::{Dimensions, PointerInput, PointerKind, PointerPhase, SurfaceGeometry};
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

/// Normalize a mouse event.
#[must_use]
pub fn from_mouse(event: &MouseEvent, phase: PointerPhase) -> PointerInput {
    PointerInput::new(
        PointerKind::Mouse,
        phase,
        f64::from(event.client_x()),
        f64::from(event.client_y()),
    )
}

/// Normalize a touch event using its first touch point.
///
/// `touchend`/`touchcancel` carry no active touches, so their position is
/// taken from `changedTouches`. Returns `None` if the event has no touch
/// points at all.
#[must_use]
pub fn from_touch(event: &TouchEvent, phase: PointerPhase) -> Option<PointerInput> {
    let touch = event
        .touches()
        .get(0)
        .or_else(|| event.changed_touches().get(0))?;
    Some(PointerInput::new(
        PointerKind::Touch,
        phase,
        f64::from(touch.client_x()),
        f64::from(touch.client_y()),
    ))
}

/// Current on-screen placement of `element`.
#[must_use]
pub fn geometry_for(element: &HtmlCanvasElement) -> SurfaceGeometry {
    let rect = element.get_bounding_client_rect();
    SurfaceGeometry {
        left: rect.left(),
        top: rect.top(),
        display_width: rect.width(),
        display_height: rect.height(),
        surface: Dimensions::new(element.width(), element.height()),
    }
}
