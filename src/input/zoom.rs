//! Headless stand-in for the platform zoom gesture layer
//!
//! Turns drags, wheel steps and pinches into [`ViewTransform`]s with the
//! scale clamped to the extent, the way a browser zoom behavior reports
//! them. Zooming keeps the plane point under the focal point fixed.

use crate::{
    core::{
        geo::Point,
        transform::{ScaleExtent, ViewTransform},
    },
    input::events::GestureEvent,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoomBehavior {
    extent: ScaleExtent,
}

impl ZoomBehavior {
    pub fn new(extent: ScaleExtent) -> Self {
        Self { extent }
    }

    pub fn extent(&self) -> ScaleExtent {
        self.extent
    }

    /// Moves the view by a screen-pixel drag.
    pub fn pan_by(&self, current: &ViewTransform, dx: f64, dy: f64) -> ViewTransform {
        current.translated(dx, dy)
    }

    /// Multiplies the scale by `factor` around `focal`.
    pub fn scale_by(&self, current: &ViewTransform, factor: f64, focal: Point) -> ViewTransform {
        self.scale_to(current, current.k * factor, focal)
    }

    /// Sets the scale to `k` (clamped) around `focal`.
    pub fn scale_to(&self, current: &ViewTransform, k: f64, focal: Point) -> ViewTransform {
        let k = self.extent.clamp(k);
        if k == current.k {
            return *current;
        }
        current.scaled_to(k, focal)
    }

    /// Wraps a sequence of intermediate transforms as one gesture.
    pub fn gesture(&self, steps: &[ViewTransform]) -> Vec<GestureEvent> {
        let last = steps.len().saturating_sub(1);
        steps
            .iter()
            .enumerate()
            .map(|(i, t)| match i {
                0 => GestureEvent::ZoomStart(*t),
                i if i == last => GestureEvent::ZoomEnd(*t),
                _ => GestureEvent::Zoom(*t),
            })
            .collect()
    }
}
