use serde::{Deserialize, Serialize};

use crate::core::transform::ViewTransform;

/// Continuous zoom gesture events as reported by the platform gesture layer.
///
/// Every phase carries the full transform the gesture has reached; the
/// controller treats all three alike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    ZoomStart(ViewTransform),
    Zoom(ViewTransform),
    ZoomEnd(ViewTransform),
}

impl GestureEvent {
    pub fn transform(&self) -> ViewTransform {
        match self {
            Self::ZoomStart(t) | Self::Zoom(t) | Self::ZoomEnd(t) => *t,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::ZoomEnd(_))
    }
}
