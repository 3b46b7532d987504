//! DOM output and measurement (WASM only)
//!
//! Draw commands map onto a pool of absolutely positioned elements under the
//! scene root: `<img>` for falling images, `<div>` for everything else. Falling items and the boundary get stable element ids so the layout
//! probe can read their live rects back with `getBoundingClientRect`.

use wasm_bindgen::JsCast;
use web_sys::{Document, DomRect, Element, HtmlElement};

use super::{BOUNDARY_DOM_ID, IMAGE_ALT, element_for, item_dom_id};
use crate::scene::{ComposedScene, DrawCommand};
use crate::sim::{ItemId, LayoutProbe, Rect};
use crate::theme::Color;

fn css_color(c: Color, opacity: f32) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (c[0] * 255.0).round() as u8,
        (c[1] * 255.0).round() as u8,
        (c[2] * 255.0).round() as u8,
        (c[3] * opacity).clamp(0.0, 1.0)
    )
}

fn css_box(rect: &Rect) -> String {
    format!(
        "position:absolute;left:{:.2}px;top:{:.2}px;width:{:.2}px;height:{:.2}px;",
        rect.left, rect.top, rect.width, rect.height
    )
}

/// Element id and inline style for one command
fn style_for(cmd: &DrawCommand) -> (Option<String>, String) {
    match cmd {
        DrawCommand::Backdrop { rect, color, grid } => (
            None,
            format!(
                "{}background-color:{};background-image:linear-gradient({g} 1px, transparent 1px),linear-gradient(90deg, {g} 1px, transparent 1px);background-size:100px 100px;",
                css_box(rect),
                css_color(*color, 1.0),
                g = css_color(*grid, 1.0)
            ),
        ),
        DrawCommand::Building { rect, rotation_deg, opacity, from, to } => (
            None,
            format!(
                "{}background:linear-gradient(to bottom right, {}, {});opacity:{:.2};transform:rotate({}deg);",
                css_box(rect),
                css_color(*from, 1.0),
                css_color(*to, 1.0),
                opacity,
                rotation_deg
            ),
        ),
        DrawCommand::Spotlight { rect, color } => (
            None,
            format!(
                "{}background:radial-gradient(ellipse at center, {}, transparent 70%);filter:blur(40px);",
                css_box(rect),
                css_color(*color, 1.0)
            ),
        ),
        DrawCommand::Boundary { rect, color } => (
            Some(BOUNDARY_DOM_ID.to_string()),
            format!(
                "{}background-color:{};box-shadow:0 0 24px rgba(34, 42, 53, 0.06), 0 1px 1px rgba(0, 0, 0, 0.05), 0 0 0 1px rgba(34, 42, 53, 0.04);",
                css_box(rect),
                css_color(*color, 1.0)
            ),
        ),
        DrawCommand::Image { item, rect, .. } => (
            Some(item_dom_id(*item)),
            format!("{}object-fit:cover;z-index:50;", css_box(rect)),
        ),
        DrawCommand::Placeholder { item, rect, color } => (
            Some(item_dom_id(*item)),
            format!("{}background-color:{};z-index:50;", css_box(rect), css_color(*color, 1.0)),
        ),
        DrawCommand::Streak { rect, color, opacity } => (
            None,
            format!(
                "{}border-radius:9999px;background:linear-gradient(to right, transparent, {}, transparent);filter:blur(4px);opacity:{:.3};z-index:50;",
                css_box(rect),
                css_color(*color, 1.0),
                opacity
            ),
        ),
        DrawCommand::Particle { rect, color, opacity } => (
            None,
            format!(
                "{}border-radius:9999px;background-color:{};z-index:50;",
                css_box(rect),
                css_color(*color, *opacity)
            ),
        ),
    }
}

/// Pooled element renderer under a root element
pub struct DomRenderer {
    document: Document,
    root: HtmlElement,
    pool: Vec<HtmlElement>,
}

impl DomRenderer {
    pub fn new(root: HtmlElement) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self {
            document,
            root,
            pool: Vec::new(),
        })
    }

    fn create(&self, tag: &str) -> Option<HtmlElement> {
        let el = self
            .document
            .create_element(&tag.to_lowercase())
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        if tag == "IMG" {
            el.set_attribute("alt", IMAGE_ALT).ok()?;
        }
        Some(el)
    }

    /// Pooled element `index`, swapped in place when the tag changes
    fn node(&mut self, index: usize, tag: &str) -> Option<&HtmlElement> {
        while self.pool.len() <= index {
            let el = self.create(tag)?;
            self.root.append_child(&el).ok()?;
            self.pool.push(el);
        }
        if self.pool[index].tag_name() != tag {
            let el = self.create(tag)?;
            self.root.replace_child(&el, &self.pool[index]).ok()?;
            self.pool[index] = el;
        }
        self.pool.get(index)
    }

    /// Sync the pool with a composed frame
    pub fn render(&mut self, composed: &ComposedScene) {
        self.root.set_class_name(&composed.root_classes);

        for (i, cmd) in composed.commands.iter().enumerate() {
            let (id, style) = style_for(cmd);
            let (tag, src) = element_for(cmd);
            let Some(node) = self.node(i, tag) else {
                log::error!("Failed to create DOM node {}", i);
                return;
            };
            node.set_id(id.as_deref().unwrap_or(""));
            let _ = node.set_attribute("style", &style);
            if let Some(src) = src {
                // Only touch src on change so the image isn't re-requested
                if node.get_attribute("src").as_deref() != Some(src) {
                    let _ = node.set_attribute("src", src);
                }
            }
        }

        for node in self.pool.iter().skip(composed.commands.len()) {
            node.set_id("");
            let _ = node.set_attribute("style", "display:none;");
        }
    }
}

fn rect_of(r: &DomRect) -> Rect {
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

/// Layout probe reading live element rects
pub struct DomLayout {
    document: Document,
    root: Element,
}

impl DomLayout {
    pub fn new(document: Document, root: Element) -> Self {
        Self { document, root }
    }

    fn measure(&self, id: &str) -> Option<Rect> {
        self.document
            .get_element_by_id(id)
            .map(|el| rect_of(&el.get_bounding_client_rect()))
    }
}

impl LayoutProbe for DomLayout {
    fn item_rect(&self, id: ItemId) -> Option<Rect> {
        self.measure(&item_dom_id(id))
    }

    fn boundary_rect(&self) -> Option<Rect> {
        self.measure(BOUNDARY_DOM_ID)
    }

    fn scene_rect(&self) -> Option<Rect> {
        Some(rect_of(&self.root.get_bounding_client_rect()))
    }
}
