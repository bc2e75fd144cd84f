//! Cosmic Tap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent, TouchEvent};

    use cosmic_tap::api::AuthMode;
    use cosmic_tap::auth::{AuthError, AuthForm};
    use cosmic_tap::platform::http::HttpClient;
    use cosmic_tap::platform::{FrameClock, TokenStore, now_ms};
    use cosmic_tap::sim::{BoostPhase, PopupStyle, PowerUpKind};
    use cosmic_tap::upgrades::{MAX_UPGRADE_LEVEL, UPGRADES, UpgradeId};
    use cosmic_tap::{SessionController, Settings};

    /// Background clock driver period. Hidden tabs pause animation frames but
    /// keep running (throttled) intervals.
    const CLOCK_INTERVAL_MS: i32 = 1000;

    /// Game instance holding all state
    struct Game {
        session: SessionController,
        client: HttpClient,
        clock: FrameClock,
    }

    impl Game {
        fn new(settings: &Settings, token: Option<String>) -> Self {
            let seed = now_ms() as u64;
            Self {
                session: SessionController::from_settings(settings, seed, token),
                client: HttpClient::new(settings.api_base_url.clone()),
                clock: FrameClock::new(),
            }
        }

        /// Advance the session clock to wall-clock now. Called by every frame,
        /// by the background interval and before each player action.
        fn catch_up(&mut self) {
            let elapsed = self.clock.elapsed(now_ms());
            if elapsed > 0 {
                self.session.advance(elapsed);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.session.state();

            set_text(document, "hud-score", &state.score.to_string());
            set_text(document, "hud-level", &state.level.to_string());
            set_text(document, "hud-combo", &format!("{}x", state.combo));
            set_text(document, "hud-max-combo", &state.max_combo.to_string());
            set_text(document, "hud-multiplier", &format!("x{}", state.multiplier));

            // Boost meter
            if let Some(el) = document.get_element_by_id("boost-fill") {
                let _ = el.set_attribute("style", &format!("width: {}%", state.boost_points));
            }
            let (label, ready) = match self.session.boost_phase() {
                BoostPhase::Active => ("BOOSTING!".to_string(), false),
                BoostPhase::Cooldown => (format!("Cooldown {}s", state.boost_cooldown_secs), false),
                BoostPhase::Ready => ("BOOST".to_string(), true),
                BoostPhase::Idle | BoostPhase::Charging => {
                    (format!("{}/100", state.boost_points), false)
                }
            };
            set_text(document, "boost-btn", &label);
            set_class(document, "boost-btn", if ready { "ready" } else { "" });

            // Upgrade shop prices
            for def in UPGRADES.iter() {
                let level = state.upgrades.level(def.id);
                let price = if level >= MAX_UPGRADE_LEVEL {
                    "MAX".to_string()
                } else {
                    def.cost(level).to_string()
                };
                set_text(
                    document,
                    &format!("upgrade-{}", def.id.as_str()),
                    &format!("{} (Lv {}) - {}", def.name, level, price),
                );
            }

            set_class(
                document,
                "start-overlay",
                if state.started { "hidden" } else { "" },
            );

            set_text(
                document,
                "achievement-count",
                &format!("{}/{}", state.achievements.len(), cosmic_tap::achievements::ACHIEVEMENTS.len()),
            );

            self.render_entities(document);
        }

        /// Power-ups, particles and popups as absolutely positioned divs
        fn render_entities(&self, document: &Document) {
            let Some(layer) = document.get_element_by_id("entities") else {
                return;
            };
            let state = self.session.state();
            let mut html = String::new();

            for p in &state.power_ups {
                let class = match p.kind {
                    PowerUpKind::Multiplier => "power-up multiplier",
                    PowerUpKind::Points => "power-up points",
                };
                let scale = 1.0 + p.pulse.sin() * 0.1;
                let _ = write!(
                    html,
                    r#"<div class="{}" style="left:{:.0}px;top:{:.0}px;transform:translate(-50%,-50%) scale({:.2})"></div>"#,
                    class, p.pos.x, p.pos.y, scale
                );
            }
            for p in &state.particles {
                let _ = write!(
                    html,
                    r#"<div class="particle" style="left:{:.0}px;top:{:.0}px;width:{:.0}px;height:{:.0}px;opacity:{:.2};background:#{:06x}"></div>"#,
                    p.pos.x, p.pos.y, p.size, p.size, p.life, p.color
                );
            }
            for popup in &state.popups {
                let class = match popup.style {
                    PopupStyle::Points => "popup",
                    PopupStyle::Boost => "popup boost",
                    PopupStyle::Achievement => "popup achievement",
                    PopupStyle::Upgrade => "popup upgrade",
                    PopupStyle::Error => "popup error",
                };
                let _ = write!(
                    html,
                    r#"<div class="{}" style="left:{:.0}px;top:{:.0}px">{}</div>"#,
                    class, popup.pos.x, popup.pos.y, popup.text
                );
            }
            if let Some(ripple) = &state.ripple {
                let _ = write!(
                    html,
                    r#"<div class="tap-ripple" style="left:{:.0}px;top:{:.0}px"></div>"#,
                    ripple.pos.x, ripple.pos.y
                );
            }

            layer.set_inner_html(&html);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_class(document: &Document, id: &str, class: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    /// Hand queued sync requests to the fetch client
    fn flush_sync(game: &Rc<RefCell<Game>>) {
        let (requests, client) = {
            let mut g = game.borrow_mut();
            (g.session.drain_sync_requests(), g.client.clone())
        };
        for request in requests {
            let game = game.clone();
            let client = client.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = client.execute(request).await;
                game.borrow_mut().session.complete_sync(result);
            });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cosmic Tap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let settings = Settings::load();

        // Login / register page
        if document.get_element_by_id("auth-form").is_some() {
            setup_auth_page(&document, &settings);
            return;
        }

        let Some(area) = document.get_element_by_id("game-area") else {
            log::error!("No #game-area element, nothing to run");
            return;
        };

        let token = TokenStore::load();
        if token.is_none() {
            log::info!("Playing as guest; progress will not be saved");
        }

        let game = Rc::new(RefCell::new(Game::new(&settings, token)));
        game.borrow_mut().catch_up();
        resize_area(&game, &area);
        game.borrow_mut().session.start();
        flush_sync(&game);

        setup_tap_handlers(&area, game.clone());
        setup_controls(&document, game.clone());
        setup_resize(&area, game.clone());
        setup_clock_interval(game.clone());

        request_animation_frame(game);

        log::info!("Cosmic Tap running!");
    }

    fn resize_area(game: &Rc<RefCell<Game>>, area: &Element) {
        let rect = area.get_bounding_client_rect();
        game.borrow_mut()
            .session
            .set_area(rect.width() as f32, rect.height() as f32);
    }

    fn local_point(area: &Element, client_x: f64, client_y: f64) -> Vec2 {
        let rect = area.get_bounding_client_rect();
        Vec2::new(
            (client_x - rect.left()) as f32,
            (client_y - rect.top()) as f32,
        )
    }

    fn setup_tap_handlers(area: &Element, game: Rc<RefCell<Game>>) {
        // Mouse
        {
            let game = game.clone();
            let target = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = local_point(&target, event.client_x() as f64, event.client_y() as f64);
                let mut g = game.borrow_mut();
                g.catch_up();
                g.session.tap(pos);
            });
            let _ = area.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (suppresses the emulated mouse event)
        {
            let target = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos =
                        local_point(&target, touch.client_x() as f64, touch.client_y() as f64);
                    let mut g = game.borrow_mut();
                    g.catch_up();
                    g.session.tap(pos);
                }
            });
            let _ = area.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                handler();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "boost-btn", move || {
                let mut g = game.borrow_mut();
                g.catch_up();
                if let Err(err) = g.session.activate_boost() {
                    log::debug!("Boost refused: {}", err);
                }
            });
        }

        for def in UPGRADES.iter() {
            let game = game.clone();
            let id: UpgradeId = def.id;
            on_click(document, &format!("upgrade-{}", id.as_str()), move || {
                let mut g = game.borrow_mut();
                g.catch_up();
                g.session.purchase_upgrade(id);
            });
        }

        {
            let game = game.clone();
            on_click(document, "reset-btn", move || {
                game.borrow_mut().session.reset();
                flush_sync(&game);
            });
        }

        on_click(document, "connect-btn", || {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href("/login");
            }
        });

        if let Some(panel) = document.get_element_by_id("upgrade-panel") {
            on_click(document, "upgrades-toggle", move || {
                let _ = panel.class_list().toggle("hidden");
            });
        }
    }

    fn setup_resize(area: &Element, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let area = area.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            resize_area(&game, &area);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Keeps timers (auto-save, auto-tap, boost) running while frames are paused
    fn setup_clock_interval(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().catch_up();
            flush_sync(&game);
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            CLOCK_INTERVAL_MS,
        );
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.catch_up();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }
        flush_sync(&game);

        request_animation_frame(game);
    }

    // === Auth page ===

    fn input_value(document: &Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn clear_inputs(document: &Document) {
        for id in ["username", "password", "confirm-password"] {
            if let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value("");
            }
        }
    }

    fn render_auth_form(document: &Document, form: &AuthForm, error: Option<&AuthError>) {
        set_text(document, "auth-greeting", form.greeting());
        let (submit, toggle) = match form.mode {
            AuthMode::Login => ("Login", "Need an account? Register"),
            AuthMode::Register => ("Register", "Have an account? Login"),
        };
        set_text(document, "auth-submit", submit);
        set_text(document, "auth-toggle", toggle);
        if let Some(el) = document
            .get_element_by_id("confirm-password")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            el.set_hidden(form.mode == AuthMode::Login);
        }
        set_text(
            document,
            "auth-error",
            &error.map(|e| e.to_string()).unwrap_or_default(),
        );
    }

    fn setup_auth_page(document: &Document, settings: &Settings) {
        let form = Rc::new(RefCell::new(AuthForm::default()));
        let client = HttpClient::new(settings.api_base_url.clone());
        render_auth_form(document, &form.borrow(), None);

        {
            let form = form.clone();
            let doc = document.clone();
            on_click(document, "auth-toggle", move || {
                form.borrow_mut().toggle_mode();
                clear_inputs(&doc);
                render_auth_form(&doc, &form.borrow(), None);
            });
        }

        let Some(form_el) = document.get_element_by_id("auth-form") else {
            return;
        };
        let document = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            event.prevent_default();

            let snapshot = {
                let mut f = form.borrow_mut();
                f.username = input_value(&document, "username");
                f.password = input_value(&document, "password");
                f.confirm_password = input_value(&document, "confirm-password");
                f.clone()
            };

            let payload = match snapshot.validate() {
                Ok(payload) => payload,
                Err(err) => {
                    render_auth_form(&document, &snapshot, Some(&err));
                    return;
                }
            };
            render_auth_form(&document, &snapshot, None);

            let client = client.clone();
            let document = document.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match client.authenticate(snapshot.mode, &payload).await {
                    Ok(token) => {
                        TokenStore::save(&token);
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().set_href("/");
                        }
                    }
                    Err(err) => {
                        log::warn!("Authentication failed: {}", err);
                        render_auth_form(&document, &snapshot, Some(&AuthError::from(err)));
                    }
                }
            });
        });
        let _ = form_el.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cosmic Tap (native) starting...");
    log::info!("Native mode plays a scripted headless session - run with `trunk serve` for the web version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Tap through a couple of minutes of play and print where the session ends up
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use cosmic_tap::platform::{FrameClock, TokenStore, now_ms};
    use cosmic_tap::sim::BoostPhase;
    use cosmic_tap::upgrades::{PurchaseOutcome, UpgradeId};
    use cosmic_tap::{SessionController, Settings};
    use glam::Vec2;

    let settings = Settings::load();
    let mut session = SessionController::from_settings(&settings, now_ms() as u64, TokenStore::load());
    session.start();

    let area = session.area();
    let shop = [UpgradeId::TapStrength, UpgradeId::AutoTap, UpgradeId::ComboMastery];
    let mut queued_sync = 0;

    for step in 0..1200u32 {
        // Sweep the finger across the area, four taps a second
        let t = step as f32 * 0.37;
        let pos = Vec2::new(
            area.width * (0.5 + 0.4 * t.sin()),
            area.height * (0.5 + 0.4 * (t * 1.3).cos()),
        );
        session.tap(pos);
        session.advance(250);

        if session.boost_phase() == BoostPhase::Ready {
            let _ = session.activate_boost();
        }
        for id in shop {
            if let PurchaseOutcome::Purchased { cost, new_level } = session.purchase_upgrade(id) {
                println!("  bought {} -> level {} ({} points)", id.as_str(), new_level, cost);
            }
        }
        // No HTTP client natively; count what would have been sent
        queued_sync += session.drain_sync_requests().len();
    }

    let state = session.state();
    println!("\nSession summary:");
    println!("  score      {}", state.score);
    println!("  level      {}", state.level);
    println!("  max combo  {}", state.max_combo);
    println!(
        "  upgrades   {}",
        state
            .upgrades
            .iter()
            .map(|(id, level)| format!("{}={}", id.as_str(), level))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  unlocked   {}",
        state
            .achievements
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  sync requests not sent (native): {}", queued_sync);
}
