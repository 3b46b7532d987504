//! Rendering module
//!
//! Backends consume the composed draw list: instanced quads for a GPU, or
//! pooled DOM nodes on the web.

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod instance;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomLayout, DomRenderer};
pub use instance::{InstanceBatch, QuadInstance};

use crate::scene::DrawCommand;
use crate::sim::ItemId;

/// Element id of the boundary panel
pub const BOUNDARY_DOM_ID: &str = "hero-fall-boundary";

/// Element id of a falling item
pub fn item_dom_id(id: ItemId) -> String {
    format!("hero-fall-item-{}", id.0)
}

/// Alt text on every falling image
pub const IMAGE_ALT: &str = "Falling item";

/// Element tag (upper case, as `tagName` reports it) and image source for a
/// command: `<img>` for falling images, `<div>` for everything else
pub fn element_for(cmd: &DrawCommand) -> (&'static str, Option<&str>) {
    match cmd {
        DrawCommand::Image { src, .. } => ("IMG", Some(src.as_str())),
        _ => ("DIV", None),
    }
}
