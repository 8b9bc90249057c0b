//! Normalized pointer input.
//!
//! Mouse, touch, and pen events are translated at the platform boundary
//! into one [`PointerInput`] shape. The signature surface only ever sees
//! these, in client (CSS pixel) coordinates, plus the
//! [`SurfaceGeometry`] needed to map them onto surface pixels.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, Point};

/// Which kind of device produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// Mouse or trackpad.
    Mouse,
    /// Finger on a touch screen.
    Touch,
    /// Stylus.
    Pen,
}

/// Where in a gesture an event falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    /// Button pressed or finger down.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or finger lifted.
    Up,
    /// Pointer left the surface.
    Leave,
    /// The platform aborted the gesture.
    Cancel,
}

/// One platform-neutral pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Device kind.
    pub kind: PointerKind,
    /// Gesture phase.
    pub phase: PointerPhase,
    /// Position in client (viewport CSS pixel) coordinates.
    pub client: Point,
}

impl PointerInput {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(kind: PointerKind, phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            kind,
            phase,
            client: Point::new(x, y),
        }
    }
}

/// How the displayed surface sits on screen.
///
/// The surface may be displayed at a different CSS size than its pixel
/// size; each axis is mapped independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Left edge of the displayed surface, client coordinates.
    pub left: f64,
    /// Top edge of the displayed surface, client coordinates.
    pub top: f64,
    /// Displayed width in CSS pixels.
    pub display_width: f64,
    /// Displayed height in CSS pixels.
    pub display_height: f64,
    /// Backing surface size in pixels.
    pub surface: Dimensions,
}

impl SurfaceGeometry {
    /// Geometry for a surface displayed 1:1 at the client origin.
    #[must_use]
    pub fn unscaled(surface: Dimensions) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            display_width: f64::from(surface.width),
            display_height: f64::from(surface.height),
            surface,
        }
    }

    /// Map a client-coordinate point onto surface pixels.
    ///
    /// A collapsed display axis (zero or negative size) maps 1:1.
    #[must_use]
    pub fn to_surface(&self, client: Point) -> Point {
        let scale = |pixels: u32, displayed: f64| {
            if displayed > 0.0 {
                f64::from(pixels) / displayed
            } else {
                1.0
            }
        };
        let scale_x = scale(self.surface.width, self.display_width);
        let scale_y = scale(self.surface.height, self.display_height);
        Point::new(
            (client.x - self.left) * scale_x,
            (client.y - self.top) * scale_y,
        )
    }
}

/// What the platform should do with the event after the surface saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Let the platform run its default action.
    Default,
    /// Suppress scrolling / gesture handling; the surface owns the gesture.
    PreventDefault,
}

impl EventDisposition {
    /// `true` for [`EventDisposition::PreventDefault`].
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::PreventDefault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscaled_geometry_is_identity() {
        let geometry = SurfaceGeometry::unscaled(Dimensions::new(400, 150));
        let p = geometry.to_surface(Point::new(12.5, 80.0));
        assert_eq!(p, Point::new(12.5, 80.0));
    }

    #[test]
    fn css_scaling_maps_each_axis_independently() {
        // 400x150 surface shown at 200x100 CSS px, offset (10, 20).
        let geometry = SurfaceGeometry {
            left: 10.0,
            top: 20.0,
            display_width: 200.0,
            display_height: 100.0,
            surface: Dimensions::new(400, 150),
        };
        let p = geometry.to_surface(Point::new(110.0, 70.0));
        assert!((p.x - 200.0).abs() < 1e-9, "x = {}", p.x);
        assert!((p.y - 75.0).abs() < 1e-9, "y = {}", p.y);
    }

    #[test]
    fn collapsed_display_falls_back_to_unit_scale() {
        let geometry = SurfaceGeometry {
            left: 5.0,
            top: 5.0,
            display_width: 0.0,
            display_height: 0.0,
            surface: Dimensions::new(400, 150),
        };
        assert_eq!(geometry.to_surface(Point::new(15.0, 25.0)), Point::new(10.0, 20.0));
    }
}
