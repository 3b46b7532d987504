//! Hero Fall entry point
//!
//! Web: mounts the scene under `#hero-fall-root` and drives it from
//! `requestAnimationFrame`. Native: runs the scene headless and prints a
//! JSON snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlElement;

    use hero_fall::renderer::{DomLayout, DomRenderer};
    use hero_fall::sim::{Scene, SceneEvent, Viewport, tick_with_probe};
    use hero_fall::{SceneConfig, Theme, compose};

    /// Upper bound on a single frame step (tab was backgrounded)
    const MAX_FRAME_MS: f64 = 1000.0;

    /// App instance holding all state
    struct App {
        scene: Scene,
        config: SceneConfig,
        theme: Theme,
        renderer: DomRenderer,
        layout: DomLayout,
        last_time: f64,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;

            // Viewport is read on demand, never subscribed to
            if let Some(viewport) = current_viewport() {
                if viewport != self.scene.viewport {
                    self.scene.resize(viewport);
                }
            }

            tick_with_probe(&mut self.scene, dt.round() as u64, &self.layout);
            for event in self.scene.drain_events() {
                if let SceneEvent::CollisionDetected { item, at, .. } = event {
                    log::debug!("Burst for item {} at ({:.0}, {:.0})", item.0, at.x, at.y);
                }
            }

            let composed = compose(&self.scene, &self.config, self.theme);
            self.renderer.render(&composed);
        }

        fn toggle_theme(&mut self) {
            self.theme.toggle();
            self.theme.save();
            apply_theme_class(self.theme);
            apply_toggle_icon(self.theme);
            log::info!("Theme: {}", self.theme.as_str());
        }
    }

    fn current_viewport() -> Option<Viewport> {
        let window = web_sys::window()?;
        let w = window.inner_width().ok()?.as_f64()?;
        let h = window.inner_height().ok()?.as_f64()?;
        Some(Viewport::new(w as f32, h as f32))
    }

    fn apply_theme_class(theme: Theme) {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());
        if let Some(root) = root {
            let classes = root.class_list();
            let _ = match theme {
                Theme::Dark => classes.add_1("dark"),
                Theme::Light => classes.remove_1("dark"),
            };
        }
    }

    /// Show the icon for the theme a click switches to
    fn apply_toggle_icon(theme: Theme) {
        let button = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("theme-toggle"));
        if let Some(button) = button {
            let _ = button.set_attribute("data-icon", theme.toggle_icon());
            let label = format!("Switch to {} theme", theme.toggled().as_str());
            let _ = button.set_attribute("aria-label", &label);
        }
    }

    /// Config from an inline `<script type="application/json">`, else LocalStorage
    fn read_config(document: &web_sys::Document) -> SceneConfig {
        let inline = document
            .get_element_by_id("hero-fall-config")
            .and_then(|el| el.text_content());
        if let Some(json) = inline {
            match SceneConfig::from_json(&json) {
                Ok(config) => {
                    log::info!("Using inline scene config ({} images)", config.images.len());
                    config.save();
                    return config;
                }
                Err(e) => log::warn!("Inline scene config rejected: {}", e),
            }
        }
        SceneConfig::load()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Hero Fall starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let root: HtmlElement = document
            .get_element_by_id("hero-fall-root")
            .expect("no #hero-fall-root")
            .dyn_into()
            .expect("root is not an HTML element");

        let config = read_config(&document);
        let theme = Theme::load(config.theme);
        apply_theme_class(theme);
        apply_toggle_icon(theme);

        let viewport = current_viewport().unwrap_or_default();
        let scene = Scene::new(&config, viewport);
        log::info!("Scene seed: {:?}", scene.seed);

        let layout = DomLayout::new(document.clone(), root.clone().into());
        let renderer = DomRenderer::new(root).expect("no document for renderer");

        let app = Rc::new(RefCell::new(App {
            scene,
            config,
            theme,
            renderer,
            layout,
            last_time: 0.0,
        }));

        setup_theme_toggle(app.clone());
        request_animation_frame(app);

        log::info!("Hero Fall running!");
    }

    fn setup_theme_toggle(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id("theme-toggle") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().toggle_theme();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            if !a.scene.is_mounted() {
                return;
            }
            a.frame(time);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use hero_fall::renderer::InstanceBatch;
    use hero_fall::sim::{Scene, SceneEvent, Viewport, tick};
    use hero_fall::{SceneConfig, compose};

    /// Headless frame step (~60 fps)
    const FRAME_MS: u64 = 16;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage: hero-fall [config.json] [seconds]
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match SceneConfig::load_from(std::path::Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring {}: {}", path, e);
                SceneConfig::default()
            }
        },
        None => SceneConfig::load(),
    };
    let seconds: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 30,
    };

    let mut scene = Scene::new(&config, Viewport::default());
    log::info!("Hero Fall (native) seed {:?}, simulating {}s", scene.seed, seconds);

    let mut collisions = 0usize;
    let frames = seconds * 1000 / FRAME_MS;
    for _ in 0..frames {
        tick(&mut scene, FRAME_MS);
        for event in scene.drain_events() {
            match event {
                SceneEvent::CollisionDetected { item, at, time } => {
                    collisions += 1;
                    log::info!("[{:>6}ms] item {} hit at ({:.0}, {:.0})", time, item.0, at.x, at.y);
                }
                SceneEvent::CycleAdvanced { item, cycle_key, time } => {
                    log::info!("[{:>6}ms] item {} respawned (cycle {})", time, item.0, cycle_key);
                }
                SceneEvent::CollisionCleared { .. } => {}
            }
        }
    }

    let composed = compose(&scene, &config, config.theme);
    let batch = InstanceBatch::from_scene(&composed);
    log::info!(
        "{} collisions; final frame: {} quads ({} bytes), {} textures",
        collisions,
        batch.len(),
        batch.as_bytes().len(),
        batch.textures.len()
    );

    println!("{}", serde_json::to_string_pretty(&scene.snapshot())?);

    scene.unmount();
    Ok(())
}
