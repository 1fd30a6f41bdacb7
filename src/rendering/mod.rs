pub mod scene;
pub mod surface;

pub use scene::{ImageNode, SceneGraph, SceneStats};
pub use surface::RenderSurface;
