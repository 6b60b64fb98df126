//! Bubble Arcade entry point
//!
//! Browser build: wires the DOM to the engine and drives it from
//! requestAnimationFrame. Native build: a headless run over every mode.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use bubble_arcade::audio::WebAudio;
    use bubble_arcade::renderer::{CanvasTarget, RenderTarget};
    use bubble_arcade::sim::Bounds;
    use bubble_arcade::{Arcade, GameMode, InputEvent, InputTarget, Key, Lifecycle, Settings};

    /// Selector for page chrome that keeps pointer input away from the backdrop
    const INTERACTIVE: &str = "a, button, .nav-link, .btn, .panda-sprite, .game-card, .stack-card, \
                               canvas, input, textarea, select, .bubble-frame";

    struct App {
        arcade: Arcade,
        audio: Rc<WebAudio>,
        field_target: Option<CanvasTarget>,
        game_target: Option<CanvasTarget>,
        last_time: Option<f64>,
        audio_unlocked: bool,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let delta = self.last_time.map_or(0.0, |last| time - last);
            self.last_time = Some(time);

            self.arcade.advance(delta);
            if let Some(target) = self.field_target.as_mut() {
                self.arcade.render_field(target);
            }
            if let Some(target) = self.game_target.as_mut() {
                self.arcade.render_session(target);
            }
            self.update_hud();
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.arcade.hud();
            set_text(&document, "gameScore", &hud.score.to_string());
            set_text(&document, "gameTime", hud.clock_label.as_deref().unwrap_or(""));
            set_text(&document, "gameDesc", &hud.status);
        }

        /// Client coordinates into game-area coordinates
        fn area_pos(&self, client: Vec2) -> Vec2 {
            self.game_target.as_ref().map_or(client, |t| {
                let rect = t.canvas().get_bounding_client_rect();
                client - Vec2::new(rect.left() as f32, rect.top() as f32)
            })
        }

        fn unlock_audio(&mut self) {
            if !self.audio_unlocked {
                self.audio.unlock();
                self.audio_unlocked = true;
            }
        }

        fn resize(&mut self, viewport: Bounds) {
            self.arcade.resize(viewport);
            if let Some(target) = self.field_target.as_mut() {
                target.resize(viewport);
            }
            if let Some(target) = self.game_target.as_mut() {
                let canvas = target.canvas();
                let area = Bounds::new(canvas.client_width() as f32, canvas.client_height() as f32);
                target.resize(area);
                self.arcade.resize_area(area);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn canvas_by_id(document: &Document, id: &str) -> Option<HtmlCanvasElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn viewport() -> Bounds {
        let Some(window) = web_sys::window() else {
            return Bounds::new(0.0, 0.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Bounds::new(w as f32, h as f32)
    }

    fn classify(target: Option<EventTarget>) -> InputTarget {
        let Some(el) = target.and_then(|t| t.dyn_into::<Element>().ok()) else {
            return InputTarget::Background;
        };
        let within = |selector: &str| el.closest(selector).ok().flatten().is_some();
        if within("#gameCanvas") {
            InputTarget::GameArea
        } else if within(INTERACTIVE) {
            InputTarget::Chrome
        } else {
            InputTarget::Background
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Bubble Arcade starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let mut settings = Settings::default().with_browser_preferences();
        settings.seed.get_or_insert(js_sys::Date::now() as u64);

        let dpr = window.device_pixel_ratio();
        let field_target = canvas_by_id(&document, "bubbleCanvas").and_then(|c| CanvasTarget::new(c, dpr));
        if field_target.is_none() {
            log::warn!("bubbleCanvas unavailable - backdrop disabled");
        }
        let game_target = canvas_by_id(&document, "gameCanvas").and_then(|c| CanvasTarget::new(c, dpr));
        if game_target.is_none() {
            log::warn!("gameCanvas unavailable - mini-games draw nothing");
        }

        let audio = Rc::new(WebAudio::new(&settings));
        let mut arcade = Arcade::new(settings, viewport(), Box::new(audio.clone()));
        if let Some(target) = &game_target {
            arcade.resize_area(target.size());
        }

        let app = Rc::new(RefCell::new(App {
            arcade,
            audio,
            field_target,
            game_target,
            last_time: None,
            audio_unlocked: false,
        }));
        app.borrow_mut().resize(viewport());

        setup_pointer_handlers(&document, app.clone());
        setup_key_handlers(&document, app.clone());
        setup_controls(&document, app.clone());
        setup_resize(app.clone());
        app.borrow().update_hud();

        request_animation_frame(app);
    }

    fn setup_pointer_handlers(document: &Document, app: Rc<RefCell<App>>) {
        let listen = |name: &str, handler: Box<dyn FnMut(MouseEvent)>| {
            let closure = Closure::<dyn FnMut(MouseEvent)>::wrap(handler);
            let _ = document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        };

        {
            let app = app.clone();
            listen(
                "mousedown",
                Box::new(move |event: MouseEvent| {
                    let mut a = app.borrow_mut();
                    a.unlock_audio();
                    let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                    let target = classify(event.target());
                    let pos = if target == InputTarget::GameArea { a.area_pos(client) } else { client };
                    a.arcade.handle_input(InputEvent::PressStart { pos, target });
                }),
            );
        }
        {
            let app = app.clone();
            listen(
                "mousemove",
                Box::new(move |event: MouseEvent| {
                    let mut a = app.borrow_mut();
                    let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                    let target = classify(event.target());
                    let pos = if target == InputTarget::GameArea { a.area_pos(client) } else { client };
                    a.arcade.handle_input(InputEvent::Move { pos, target });
                }),
            );
        }
        listen(
            "mouseup",
            Box::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                let target = classify(event.target());
                let pos = a.area_pos(client);
                a.arcade.handle_input(InputEvent::PressEnd { pos, target });
            }),
        );
    }

    fn setup_key_handlers(document: &Document, app: Rc<RefCell<App>>) {
        let handler = |down: bool, app: Rc<RefCell<App>>| {
            Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_code(&event.key());
                let mut a = app.borrow_mut();
                if key != Key::Other && a.arcade.lifecycle() == Lifecycle::Running {
                    // keep arrows and space from scrolling the page mid-game
                    event.prevent_default();
                }
                let input = if down { InputEvent::KeyDown(key) } else { InputEvent::KeyUp(key) };
                a.arcade.handle_input(input);
            })
        };

        for (name, down) in [("keydown", true), ("keyup", false)] {
            let closure = handler(down, app.clone());
            let _ = document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(el: &Element, f: impl FnMut(MouseEvent) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(f);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_controls(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("gameStart") {
            let app = app.clone();
            on_click(&btn, move |_| {
                let mut a = app.borrow_mut();
                a.unlock_audio();
                a.arcade.start();
            });
        }

        if let Some(btn) = document.get_element_by_id("closeGame") {
            let app = app.clone();
            let document = document.clone();
            on_click(&btn, move |_| {
                app.borrow_mut().arcade.stop();
                if let Some(overlay) = document.get_element_by_id("gameOverlay") {
                    let _ = overlay.class_list().remove_1("active");
                }
            });
        }

        if let Some(dot) = document.query_selector(".bubble-dot").ok().flatten() {
            let app = app.clone();
            let el = dot.clone();
            on_click(&dot, move |_| {
                let rect = el.get_bounding_client_rect();
                let pos = Vec2::new(
                    (rect.left() + rect.width() / 2.0) as f32,
                    (rect.top() + rect.height() / 2.0) as f32,
                );
                app.borrow_mut().arcade.handle_input(InputEvent::Trigger { pos });
            });
        }

        let Ok(buttons) = document.query_selector_all(".mode-btn") else {
            return;
        };
        let all: Vec<Element> = (0..buttons.length())
            .filter_map(|i| buttons.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        for btn in &all {
            let Some(mode) = btn.get_attribute("data-mode").and_then(|id| GameMode::from_str(&id)) else {
                log::warn!("mode button without a known data-mode");
                continue;
            };
            let app = app.clone();
            let all = all.clone();
            let this = btn.clone();
            on_click(btn, move |_| {
                for other in &all {
                    let _ = other.class_list().remove_1("active");
                }
                let _ = this.class_list().add_1("active");
                let mut a = app.borrow_mut();
                a.arcade.select_mode(mode);
                a.update_hud();
            });
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().resize(viewport());
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use bubble_arcade::renderer::{DrawCommand, RecordingTarget};
    use bubble_arcade::sim::Bounds;
    use bubble_arcade::{Arcade, GameMode, InputEvent, InputTarget, Key, Lifecycle, NullSound, Settings};

    /// Simulated time per mode before the demo gives up on it
    const DEMO_LIMIT_MS: f64 = 60_000.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    env_logger::init();
    log::info!("Bubble Arcade (native) starting...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(path.as_deref());
    let mut arcade = Arcade::new(settings, Bounds::new(1280.0, 720.0), Box::new(NullSound));
    let mut target = RecordingTarget::new(arcade.area());

    for mode in GameMode::ALL {
        arcade.select_mode(mode);
        arcade.start();
        let center = arcade.area().center();

        let mut elapsed = 0.0;
        let mut frame = 0u32;
        while arcade.lifecycle() == Lifecycle::Running && elapsed < DEMO_LIMIT_MS {
            // a tap and a space press twice a second
            if frame % 30 == 0 {
                arcade.handle_input(InputEvent::PressStart {
                    pos: center,
                    target: InputTarget::GameArea,
                });
                arcade.handle_input(InputEvent::KeyDown(Key::Space));
            }
            if frame % 30 == 12 {
                arcade.handle_input(InputEvent::PressEnd {
                    pos: center,
                    target: InputTarget::GameArea,
                });
                arcade.handle_input(InputEvent::KeyUp(Key::Space));
            }
            arcade.advance(FRAME_MS);
            elapsed += FRAME_MS;
            frame += 1;
        }

        arcade.render_session(&mut target);
        let shapes = target.count(|c| *c != DrawCommand::Clear);
        arcade.stop();

        match serde_json::to_string(&arcade.hud()) {
            Ok(json) => println!("{json}"),
            Err(err) => log::warn!("HUD serialization failed: {err}"),
        }
        log::info!("{} drew {shapes} shapes in its last frame", mode.as_str());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
