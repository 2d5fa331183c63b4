//! Balloon Journey entry point
//!
//! The browser build wires the session controller to a canvas, the keyboard
//! and an animation-frame loop. The native build runs a seeded headless
//! session and reports the summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use balloon_journey::audio::WebAudio;
    use balloon_journey::persistence::{MemoryPersister, RestPersister, SessionPersister};
    use balloon_journey::renderer::{CanvasSurface, RenderSurface};
    use balloon_journey::sim::PlayField;
    use balloon_journey::{FrameOutcome, SessionController, SessionPhase, Settings, VolumeLevel};

    type Controller = SessionController<WebAudio, Box<dyn SessionPersister>>;

    /// Everything the browser callbacks share
    struct Game {
        controller: Controller,
        surface: Option<CanvasSurface>,
        /// Pending animation frame, cancelled on pause/stop
        raf_id: Option<i32>,
    }

    impl Game {
        fn frame(&mut self, time: f64) -> FrameOutcome {
            let surface = self.surface.as_mut().map(|s| s as &mut dyn RenderSurface);
            self.controller.frame(time, surface)
        }

        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(e) = self.controller.take_persist_error() {
                set_text(&document, "notice", &format!("Session not saved: {e}"));
            }
            let sim = self.controller.simulation();
            set_text(&document, "score", &sim.score.score().to_string());
            set_text(&document, "distance", &format!("{:.0}", sim.score.distance()));
            set_text(
                &document,
                "obstacles",
                &sim.score.obstacles_avoided().to_string(),
            );
            set_text(&document, "breath", sim.breathing.cycle_state().phase.label());
            set_text(
                &document,
                "status",
                match self.controller.phase() {
                    SessionPhase::Idle => "Press Space to start",
                    SessionPhase::Playing => "",
                    SessionPhase::Paused => "Paused - Space to resume",
                    SessionPhase::Ended => "Journey over - Space to fly again",
                },
            );
        }

        fn show_summary(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(summary) = self.controller.last_summary() {
                set_text(
                    &document,
                    "summary",
                    &format!(
                        "Score {} | Distance {:.0} | Obstacles {} | {}s",
                        summary.score,
                        summary.distance_traveled,
                        summary.obstacles_avoided,
                        summary.time_elapsed_seconds
                    ),
                );
            }
            if let Some(e) = self.controller.take_persist_error() {
                set_text(&document, "notice", &format!("Session not saved: {e}"));
            }
        }

        fn cancel_frame(&mut self) {
            if let Some(id) = self.raf_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    /// Persister from `data-session-endpoint` / `data-user-id` on the canvas
    fn build_persister(canvas: &HtmlCanvasElement) -> Box<dyn SessionPersister> {
        let user_id = canvas.get_attribute("data-user-id");
        match canvas.get_attribute("data-session-endpoint") {
            Some(endpoint) => {
                log::info!("Sessions will be sent to {}", endpoint);
                let persister = RestPersister::new(endpoint, user_id);
                // Uploads can fail after the loop has stopped
                persister
                    .failures()
                    .set_listener(|e| set_notice(&format!("Session not saved: {e}")));
                Box::new(persister)
            }
            None => {
                log::info!("No session endpoint configured, keeping sessions in memory");
                Box::new(MemoryPersister::new(user_id))
            }
        }
    }

    /// Match the canvas backing store to its laid-out size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> PlayField {
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        PlayField::new(width as f32, height as f32)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Balloon Journey starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let field = fit_canvas(&canvas);
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let persister = build_persister(&canvas);

        let controller = SessionController::new(settings, field, WebAudio::new(), persister, seed);
        let surface = match CanvasSurface::new(canvas.clone()) {
            Ok(surface) => Some(surface),
            Err(e) => {
                log::warn!("Canvas unavailable, frames will be skipped: {:?}", e);
                None
            }
        };

        let game = Rc::new(RefCell::new(Game {
            controller,
            surface,
            raf_id: None,
        }));
        game.borrow_mut().update_hud();

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_resize(canvas, game.clone());
        setup_auto_pause(game);

        log::info!("Balloon Journey ready");
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let game_for_frame = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game_for_frame, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().raf_id = Some(id),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = {
            let mut g = game.borrow_mut();
            g.raf_id = None;
            if let FrameOutcome::Ended(_) = g.frame(time) {
                g.show_summary();
            }
            g.update_hud();
            g.controller.wants_frames()
        };

        if keep_going {
            request_animation_frame(game);
        }
    }

    fn toggle(game: &Rc<RefCell<Game>>) {
        let schedule = {
            let mut g = game.borrow_mut();
            let result = match g.controller.phase() {
                SessionPhase::Idle | SessionPhase::Ended => {
                    set_notice("");
                    g.controller.start()
                }
                SessionPhase::Playing => {
                    g.cancel_frame();
                    g.controller.pause()
                }
                SessionPhase::Paused => g.controller.resume(now()),
            };
            if let Err(e) = result {
                log::warn!("{e}");
            }
            g.update_hud();
            g.controller.wants_frames() && g.raf_id.is_none()
        };
        if schedule {
            request_animation_frame(game.clone());
        }
    }

    fn set_notice(text: &str) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            set_text(&document, "notice", text);
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            match event.key().as_str() {
                " " => {
                    event.prevent_default();
                    toggle(&game);
                }
                "Escape" => {
                    let mut g = game.borrow_mut();
                    g.cancel_frame();
                    if g.controller.stop().is_ok() {
                        g.show_summary();
                    }
                    g.update_hud();
                }
                "ArrowUp" | "ArrowDown" => {
                    let mut g = game.borrow_mut();
                    let rate = g.controller.settings().breathing_rate_per_minute;
                    let rate = if event.key() == "ArrowUp" {
                        rate + 1
                    } else {
                        rate.saturating_sub(1)
                    };
                    g.controller.set_breathing_rate(rate);
                    g.controller.settings().save();
                    log::info!(
                        "Breathing rate: {} /min",
                        g.controller.settings().breathing_rate_per_minute
                    );
                }
                "m" | "M" => {
                    let mut g = game.borrow_mut();
                    let next = match g.controller.settings().volume {
                        VolumeLevel::Off => VolumeLevel::Low,
                        VolumeLevel::Low => VolumeLevel::Medium,
                        VolumeLevel::Medium => VolumeLevel::Off,
                    };
                    g.controller.set_volume(next);
                    g.controller.settings().save();
                    log::info!("Volume: {}", next.as_str());
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let field = fit_canvas(&canvas);
            game.borrow_mut()
                .controller
                .resize(field.width, field.height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn auto_pause(game: &Rc<RefCell<Game>>, reason: &str) {
        let mut g = game.borrow_mut();
        if g.controller.phase() == SessionPhase::Playing {
            g.cancel_frame();
            if g.controller.pause().is_ok() {
                log::info!("Auto-paused ({})", reason);
            }
            g.update_hud();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use balloon_journey::consts::FRAME_MS;
    use balloon_journey::audio::NullAudio;
    use balloon_journey::persistence::{
        JsonLinesPersister, MemoryPersister, SessionPersister, SessionRecord,
    };
    use balloon_journey::renderer::HeadlessSurface;
    use balloon_journey::sim::{BreathingPattern, Pacer, PlayField, SessionSummary};
    use balloon_journey::{FrameOutcome, SessionController, Settings};

    /// Command line: `[breaths-per-minute] [seconds] [sessions.jsonl]`
    pub struct Args {
        pub rate: Option<u32>,
        pub seconds: f64,
        pub log_path: Option<String>,
        pub seed: u64,
    }

    impl Args {
        pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let rate = match args.next() {
                Some(s) => Some(s.parse().map_err(|_| format!("invalid breathing rate: {s}"))?),
                None => None,
            };
            let seconds = match args.next() {
                Some(s) => s.parse().map_err(|_| format!("invalid duration: {s}"))?,
                None => 60.0,
            };
            let log_path = args.next();
            let seed = std::env::var("BALLOON_JOURNEY_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0x5EED);
            Ok(Self {
                rate,
                seconds,
                log_path,
                seed,
            })
        }
    }

    pub fn run(args: Args) -> Result<SessionSummary, Box<dyn std::error::Error>> {
        let mut settings = Settings::load();
        if let Some(rate) = args.rate {
            settings.set_breathing_rate(rate);
        }

        let persister: Box<dyn SessionPersister> = match &args.log_path {
            Some(path) => Box::new(JsonLinesPersister::new(path, None)),
            None => Box::new(MemoryPersister::new(None)),
        };

        let mut controller =
            SessionController::new(settings, PlayField::default(), NullAudio, persister, args.seed);
        let mut surface = HeadlessSurface::new();

        controller.start()?;
        let frames = (args.seconds.max(0.0) * 1000.0 / FRAME_MS).ceil() as u64;
        for i in 0..=frames {
            if let FrameOutcome::Ended(summary) =
                controller.frame(i as f64 * FRAME_MS, Some(&mut surface))
            {
                log::info!("Crashed after {} frames", i);
                return Ok(summary);
            }
        }
        log::info!("Survived {:.0}s, stopping", args.seconds);
        Ok(controller.stop()?)
    }

    pub fn report(summary: &SessionSummary) -> Result<String, Box<dyn std::error::Error>> {
        Ok(SessionRecord::new(None, summary).to_json()?)
    }

    /// Command line: `pace <box|relax|breaths-per-minute> [seconds]`
    pub fn parse_pace(
        mut args: impl Iterator<Item = String>,
    ) -> Result<(BreathingPattern, f64), String> {
        let name = args.next().unwrap_or_else(|| "box".into());
        let pattern = BreathingPattern::from_name(&name)
            .ok_or_else(|| format!("unknown breathing pattern: {name}"))?;
        let seconds = match args.next() {
            Some(s) => s.parse().map_err(|_| format!("invalid duration: {s}"))?,
            None => 60.0,
        };
        Ok((pattern, seconds))
    }

    /// Run the guided countdown at frame rate, one line per phase entered
    pub fn pace(pattern: BreathingPattern, seconds: f64) -> Vec<String> {
        let mut pacer = Pacer::new(pattern);
        let mut lines = vec![format!(
            "0.0s {} ({}s)",
            pacer.phase().label(),
            pacer.seconds_remaining()
        )];
        let frames = (seconds.max(0.0) * 1000.0 / FRAME_MS).ceil() as u64;
        for i in 1..=frames {
            if let Some(phase) = pacer.advance(FRAME_MS) {
                lines.push(format!(
                    "{:.1}s {} ({}s)",
                    i as f64 * FRAME_MS / 1000.0,
                    phase.label(),
                    pacer.seconds_remaining()
                ));
            }
        }
        log::info!("{} breathing cycles completed", pacer.cycles_completed());
        lines
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Journey (native, headless) starting...");

    let mut argv = std::env::args().skip(1).peekable();
    if argv.peek().map(String::as_str) == Some("pace") {
        argv.next();
        match headless::parse_pace(argv) {
            Ok((pattern, seconds)) => {
                for line in headless::pace(pattern, seconds) {
                    println!("{line}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("usage: balloon-journey pace <box|relax|breaths-per-minute> [seconds]");
                std::process::exit(2);
            }
        }
        return;
    }

    let args = match headless::Args::parse(argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: balloon-journey [breaths-per-minute] [seconds] [sessions.jsonl]");
            std::process::exit(2);
        }
    };

    match headless::run(args).and_then(|summary| headless::report(&summary)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Headless run failed: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
