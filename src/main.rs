//! Screw Jam entry point
//!
//! The web build drives the game from `requestAnimationFrame` and draws onto
//! a 2D canvas. The native build runs a headless autoplay session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use screw_jam::ads::{AdProvider, RewardResponse};
    use screw_jam::audio::AudioManager;
    use screw_jam::client_to_logical;
    use screw_jam::renderer::vertex::colors;
    use screw_jam::renderer::{Effects, Vertex, build_scene};
    use screw_jam::sim::{GameEvent, GamePhase, TickInput, Viewport};
    use screw_jam::{GameConfig, Session};

    // GameDistribution SDK hooks; every call is a no-op when the SDK is absent
    #[wasm_bindgen(inline_js = "
        export function gd_show_banner() {
            if (typeof gdsdk !== 'undefined' && gdsdk.showBanner) {
                gdsdk.showBanner();
            }
        }

        export function gd_show_interstitial() {
            if (typeof gdsdk !== 'undefined' && gdsdk.showAd) {
                gdsdk.showAd();
            }
        }

        export function gd_has_rewarded() {
            return typeof gdsdk !== 'undefined' && typeof gdsdk.showRewardedAd === 'function';
        }

        export function gd_show_rewarded() {
            return gdsdk.showRewardedAd();
        }
    ")]
    extern "C" {
        fn gd_show_banner();
        fn gd_show_interstitial();
        fn gd_has_rewarded() -> bool;
        fn gd_show_rewarded() -> js_sys::Promise;
    }

    /// Timer bar turns red below this fraction
    const TIMER_LOW_FRACTION: f32 = 0.3;
    /// Longest frame step fed to the simulation (seconds)
    const MAX_FRAME_DT: f32 = 0.1;

    /// Outcome of a rewarded ad, written by the ad future and read by the loop
    type RewardSlot = Rc<Cell<Option<bool>>>;

    struct GdSdkAds {
        reward: RewardSlot,
    }

    impl AdProvider for GdSdkAds {
        fn show_interstitial(&mut self) {
            gd_show_interstitial();
        }

        fn show_rewarded(&mut self) -> RewardResponse {
            if !gd_has_rewarded() {
                // No SDK: grant directly
                return RewardResponse::Granted;
            }
            let reward = self.reward.clone();
            let promise = gd_show_rewarded();
            wasm_bindgen_futures::spawn_local(async move {
                let earned = wasm_bindgen_futures::JsFuture::from(promise).await.is_ok();
                reward.set(Some(earned));
            });
            RewardResponse::Pending
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        effects: Effects,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        dpr: f64,
        last_time: f64,
        input: TickInput,
        reward: RewardSlot,
        /// Paused because the tab was hidden
        auto_paused: bool,
    }

    impl Game {
        fn apply_events(&mut self, events: &[GameEvent]) {
            self.effects.consume(events);
        }

        /// Run one simulation step
        fn update(&mut self, dt: f32) {
            if let Some(earned) = self.reward.take() {
                if earned {
                    let events = self.session.reward_granted();
                    self.apply_events(&events);
                } else {
                    log::info!("Rewarded ad closed without reward");
                    self.session.reward_declined();
                }
            }

            let input = std::mem::take(&mut self.input);
            let events = self.session.frame(&input, dt.min(MAX_FRAME_DT));
            self.apply_events(&events);
            self.effects.update(dt);
        }

        /// Match the backing store to the canvas' CSS size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            self.dpr = window.device_pixel_ratio();

            let css_w = self.canvas.client_width().max(1);
            let css_h = self.canvas.client_height().max(1);
            self.canvas.set_width((css_w as f64 * self.dpr).floor() as u32);
            self.canvas.set_height((css_h as f64 * self.dpr).floor() as u32);

            self.session
                .state
                .resize(Viewport::new(css_w as f32, css_h as f32));
            log::debug!("Resized to {}x{} @{}x", css_w, css_h, self.dpr);
        }

        /// Convert a client-space pointer position to logical coordinates
        fn to_logical(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            client_to_logical(
                Vec2::new((client_x - rect.left()) as f32, (client_y - rect.top()) as f32),
                Vec2::new(rect.width() as f32, rect.height() as f32),
                Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32),
                self.dpr as f32,
            )
        }

        fn render(&mut self) {
            let viewport = self.session.state.viewport;
            let _ = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
            self.ctx.set_fill_style_str(&css_color(colors::BACKGROUND));
            self.ctx
                .fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);

            let vertices = build_scene(&self.session.state, &mut self.effects);
            draw_triangles(&self.ctx, &vertices);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = &self.session.state;
            let phase = state.phase;

            set_hidden(&document, "start-screen", phase != GamePhase::NotStarted);
            if let Some(screen) = document
                .get_element_by_id("start-screen")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let opacity = 1.0 - state.start_transition_progress().unwrap_or(0.0);
                let _ = screen.style().set_property("opacity", &format!("{:.2}", opacity));
            }
            set_hidden(&document, "header-row", phase == GamePhase::NotStarted);

            set_text(&document, "level-number", &state.level.to_string());

            // Timer
            let fraction = (state.time_remaining / state.config.level_duration_secs).clamp(0.0, 1.0);
            if let Some(bar) = document
                .get_element_by_id("timer-bar")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = bar
                    .style()
                    .set_property("width", &format!("{:.1}%", fraction * 100.0));
            }
            set_class(&document, "timer-bar", "low", fraction <= TIMER_LOW_FRACTION);
            set_class(&document, "timer-display", "low", fraction <= TIMER_LOW_FRACTION);
            set_text(
                &document,
                "timer-display",
                &state.time_remaining.max(0.0).ceil().to_string(),
            );

            // Hearts
            for i in 0..state.config.max_health {
                set_class(&document, &format!("heart-{}", i + 1), "lost", i >= state.health);
            }

            match self.effects.combo_banner() {
                Some(count) => {
                    set_text(&document, "combo-text", &format!("COMBO x{}!", count));
                    set_hidden(&document, "combo-text", false);
                }
                None => set_hidden(&document, "combo-text", true),
            }

            set_hidden(&document, "game-over", phase != GamePhase::GameOver);
            if phase == GamePhase::GameOver {
                set_text(&document, "final-level", &state.level.to_string());
            }
            set_hidden(&document, "level-complete", phase != GamePhase::LevelComplete);
            set_class(
                &document,
                "extra-slots-btn",
                "disabled",
                self.session.relief_pending() || !state.extra_slots_available(),
            );
        }
    }

    fn css_color(color: [f32; 4]) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            channel(color[0]),
            channel(color[1]),
            channel(color[2]),
            color[3].clamp(0.0, 1.0)
        )
    }

    /// Fill a triangle list, batching runs of the same color into one path
    fn draw_triangles(ctx: &CanvasRenderingContext2d, vertices: &[Vertex]) {
        let mut current: Option<[f32; 4]> = None;

        for tri in vertices.chunks_exact(3) {
            let color = tri[0].color;
            if current != Some(color) {
                if current.is_some() {
                    ctx.fill();
                }
                ctx.set_fill_style_str(&css_color(color));
                ctx.begin_path();
                current = Some(color);
            }
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            ctx.move_to(a[0] as f64, a[1] as f64);
            ctx.line_to(b[0] as f64, b[1] as f64);
            ctx.line_to(c[0] as f64, c[1] as f64);
            ctx.close_path();
        }

        if current.is_some() {
            ctx.fill();
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id)
            && el.text_content().as_deref() != Some(text)
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(document: &Document, id: &str, class: &str, on: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        set_class(document, id, "hidden", hidden);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Screw Jam starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("gameCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #gameCanvas element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        gd_show_banner();

        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::new(canvas.client_width() as f32, canvas.client_height() as f32);
        let reward = RewardSlot::default();
        let session = Session::new(GameConfig::default(), viewport, seed)
            .with_audio(AudioManager::new())
            .with_ads(GdSdkAds {
                reward: reward.clone(),
            });

        let game = Rc::new(RefCell::new(Game {
            session,
            effects: Effects::new(seed),
            canvas: canvas.clone(),
            ctx,
            dpr: window.device_pixel_ratio(),
            last_time: 0.0,
            input: TickInput::default(),
            reward,
            auto_paused: false,
        }));
        game.borrow_mut().resize();

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&document, game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);

        log::info!("Screw Jam running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down: tap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let point = g.to_logical(event.client_x() as f64, event.client_y() as f64);
                g.input.tap = Some(point);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move: screwdriver cursor over a tappable screw
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let g = game.borrow();
                let point = g.to_logical(event.client_x() as f64, event.client_y() as f64);
                let hover = g.session.state.phase == GamePhase::Playing
                    && g.session.state.screw_at(point).is_some();
                let _ = canvas_clone
                    .class_list()
                    .toggle_with_force("screwdriver-hover", hover);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse out
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let _ = canvas_clone.class_list().remove_1("screwdriver-hover");
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseout", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: tap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let mut g = game.borrow_mut();
                    let point = g.to_logical(touch.client_x() as f64, touch.client_y() as f64);
                    g.input.tap = Some(point);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: pause toggle
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), "Escape" | "p" | "P") {
                    let mut g = game.borrow_mut();
                    g.input.pause = true;
                    g.auto_paused = false;
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let bind = |id: &str, action: Box<dyn FnMut(&mut Game)>| {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{} button", id);
                return;
            };
            let game = game.clone();
            let mut action = action;
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                action(&mut game.borrow_mut());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        };

        bind("play-btn", Box::new(|g: &mut Game| g.input.start = true));
        bind("restart-btn", Box::new(|g: &mut Game| g.input.restart = true));
        bind("next-level-btn", Box::new(|g: &mut Game| g.input.next_level = true));
        bind(
            "extra-slots-btn",
            Box::new(|g: &mut Game| {
                let events = g.session.request_extra_slots();
                g.apply_events(&events);
            }),
        );
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            // The frame loop is throttled while hidden, so act on the state directly
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                if g.session.state.phase == GamePhase::Playing {
                    g.session.state.pause();
                    g.auto_paused = true;
                    log::info!("Auto-paused (tab hidden)");
                }
            } else if g.auto_paused {
                g.auto_paused = false;
                g.last_time = 0.0;
                g.session.state.resume();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use serde::Serialize;

    use screw_jam::renderer::vertex::as_bytes;
    use screw_jam::renderer::{Effects, build_scene};
    use screw_jam::sim::{
        GameEvent, GameOverReason, GamePhase, GameState, ScrewColor, TickInput, Viewport,
    };
    use screw_jam::{GameConfig, Session};

    const DT: f32 = 1.0 / 60.0;
    /// Hard stop: ten minutes of simulated play
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// Frames between autoplay taps
    const TAP_INTERVAL: u32 = 12;
    const VIEWPORT: Viewport = Viewport {
        width: 400.0,
        height: 700.0,
    };

    /// What happened during an autoplay run
    #[derive(Debug, Default, Serialize)]
    pub struct Summary {
        pub seed: u64,
        pub frames: u32,
        pub levels_cleared: u32,
        pub final_level: u32,
        pub matches: u32,
        pub best_combo: u32,
        pub damage_taken: u32,
        pub game_over: Option<GameOverReason>,
        /// Size of the last frame's vertex buffer
        pub frame_bytes: usize,
    }

    impl Summary {
        fn record(&mut self, event: &GameEvent) {
            match event {
                GameEvent::Matched { .. } => self.matches += 1,
                GameEvent::Combo { count } => self.best_combo = self.best_combo.max(*count),
                GameEvent::DamageTaken { .. } => self.damage_taken += 1,
                GameEvent::LevelComplete { .. } => self.levels_cleared += 1,
                GameEvent::GameOver { reason, .. } => self.game_over = Some(*reason),
                _ => {}
            }
        }
    }

    /// Tap the screw whose color is most represented in the slot row
    fn pick_target(state: &GameState) -> Option<Vec2> {
        let slotted = |color: ScrewColor| {
            state
                .slots
                .occupants()
                .filter_map(|id| state.screws.get(id))
                .filter(|s| s.color == color)
                .count()
        };

        state
            .screws
            .iter()
            .filter(|s| !s.in_slot)
            .max_by_key(|s| (slotted(s.color), std::cmp::Reverse(s.id)))
            .map(|s| s.pos)
    }

    /// Play until `levels` are cleared, the run ends or time runs out
    pub fn run(config: GameConfig, seed: u64, levels: u32) -> Summary {
        let mut session = Session::new(config, VIEWPORT, seed);
        let mut effects = Effects::new(seed);
        let mut summary = Summary {
            seed,
            ..Default::default()
        };

        let mut input = TickInput {
            start: true,
            ..Default::default()
        };

        for frame in 0..MAX_FRAMES {
            let events = session.frame(&input, DT);
            input = TickInput::default();
            effects.consume(&events);
            effects.update(DT);
            summary.frames = frame + 1;

            for event in &events {
                log::debug!("{:?}", event);
                summary.record(event);
            }

            match session.state.phase {
                GamePhase::LevelComplete => {
                    if summary.levels_cleared >= levels {
                        break;
                    }
                    input.next_level = true;
                }
                GamePhase::GameOver => break,
                GamePhase::Playing if frame.is_multiple_of(TAP_INTERVAL) => {
                    input.tap = pick_target(&session.state);
                }
                _ => {}
            }
        }

        summary.final_level = session.state.level;
        summary.frame_bytes = as_bytes(&build_scene(&session.state, &mut effects)).len();
        log::info!(
            "Autoplay finished after {} frames: {} level(s) cleared",
            summary.frames,
            summary.levels_cleared
        );
        summary
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use screw_jam::GameConfig;

    const DEFAULT_SEED: u64 = 42;
    const AUTOPLAY_LEVELS: u32 = 3;

    env_logger::init();
    log::info!("Screw Jam (native) starting...");
    log::info!("Native mode runs a headless autoplay - use `trunk serve` for the web version");

    // Usage: screw-jam [config.json] [seed]
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let summary = headless::run(config, seed, AUTOPLAY_LEVELS);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
