pub mod controller;
pub mod events;
pub mod zoom;

pub use controller::{InteractionController, RepaintSummary};
pub use events::GestureEvent;
pub use zoom::ZoomBehavior;
