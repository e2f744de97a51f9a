//! Responsibility Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use responsibility_rush::leaderboard::{Backend, LeaderboardClient};
    use responsibility_rush::render::Surface;
    use responsibility_rush::render::canvas::{CanvasSurface, HtmlImageLoader};
    use responsibility_rush::{Catalogue, EntityFactory, Phase, Session, Settings, StoreConfig};

    /// Nominal frame length (ms); entity speeds are per 60 Hz frame
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Longest frame step after a stall (tab switch etc.)
    const MAX_FRAME_STEP: f32 = 3.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        surface: CanvasSurface,
        images: Rc<HtmlImageLoader>,
        leaderboard: Rc<LeaderboardClient<Backend>>,
        last_time: f64,
        steer_left: bool,
        steer_right: bool,
        score_submitted: bool,
    }

    impl Game {
        fn new_session(settings: &Settings, images: &Rc<HtmlImageLoader>) -> Session {
            let seed = js_sys::Date::now() as u64;
            let factory = EntityFactory::seeded(Catalogue::builtin(), seed)
                .with_image_loader(images.clone());
            log::info!("New run with seed: {}", seed);
            Session::with_factory(settings.clone(), factory)
        }

        fn restart(&mut self) {
            let settings = self.session.settings().clone();
            self.session = Self::new_session(&settings, &self.images);
            self.score_submitted = false;
        }

        /// Advance simulation by the elapsed wall time
        fn update(&mut self, time: f64) {
            let frames = if self.last_time > 0.0 {
                (((time - self.last_time) / FRAME_MS) as f32).min(MAX_FRAME_STEP)
            } else {
                1.0
            };
            self.last_time = time;

            if self.steer_left != self.steer_right {
                let dir = if self.steer_left { -1.0 } else { 1.0 };
                self.session.steer(dir, frames);
            }

            self.session.step(frames);

            if self.session.phase == Phase::GameOver && !self.score_submitted {
                self.score_submitted = true;
                submit_final_score(
                    self.leaderboard.clone(),
                    self.session.settings().clone(),
                    self.session.score,
                );
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let settings = self.session.settings();
            let (w, h) = (settings.canvas_width, settings.canvas_height);
            self.surface.clear(w as f64, h as f64);
            self.session.draw(&mut self.surface);

            let hud = format!("Score {}   Lives {}", self.session.score, self.session.lives);
            self.surface.fill_text(&hud, w / 2.0, 20.0, 18.0, "#222222");

            if self.session.phase == Phase::GameOver {
                self.surface.fill_text("GAME OVER", w / 2.0, h / 2.0, 36.0, "#ff0000");
                self.surface
                    .fill_text("Click or press Space to play again", w / 2.0, h / 2.0 + 36.0, 16.0, "#222222");
            }
        }
    }

    /// Check qualification, ask for a name, submit. Runs off the frame loop.
    fn submit_final_score(client: Rc<LeaderboardClient<Backend>>, mut settings: Settings, score: u64) {
        wasm_bindgen_futures::spawn_local(async move {
            if !client.is_qualified(score, settings.top_n).await {
                log::info!("Score {} does not reach the top {}", score, settings.top_n);
                return;
            }

            let name = web_sys::window()
                .and_then(|w| {
                    w.prompt_with_message_and_default("New high score! Your name:", &settings.player_name)
                        .ok()
                        .flatten()
                })
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());

            let Some(name) = name else {
                log::info!("Score submission skipped");
                return;
            };

            settings.player_name = name.clone();
            settings.save();

            // Errors are already logged by the client; nothing to retry
            let _ = client.submit_score(&name, score).await;
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Responsibility Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let mut settings = Settings::load();
        settings.canvas_width = canvas.client_width().max(1) as f32;
        settings.canvas_height = canvas.client_height().max(1) as f32;
        canvas.set_width(settings.canvas_width as u32);
        canvas.set_height(settings.canvas_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .expect("get_context failed")
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let images = Rc::new(HtmlImageLoader::new());
        let leaderboard = Rc::new(LeaderboardClient::new(Backend::from_config(StoreConfig::from_env())));

        let game = Rc::new(RefCell::new(Game {
            session: Game::new_session(&settings, &images),
            surface: CanvasSurface::new(ctx, images.clone()),
            images,
            leaderboard,
            last_time: 0.0,
            steer_left: false,
            steer_right: false,
            score_submitted: false,
        }));

        setup_input_handlers(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Responsibility Rush running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Mouse move - catcher follows the pointer
        {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let x = event.client_x() as f32 - canvas_left(&target);
                game.borrow_mut().session.pointer_at(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let x = touch.client_x() as f32 - canvas_left(&target);
                    game.borrow_mut().session.pointer_at(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click - restart after game over
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.phase == Phase::GameOver {
                    g.restart();
                }
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard steering
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.steer_left = true,
                    "ArrowRight" | "d" | "D" => g.steer_right = true,
                    " " if g.session.phase == Phase::GameOver => g.restart(),
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.steer_left = false,
                    "ArrowRight" | "d" | "D" => g.steer_right = false,
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Canvas left edge in client coordinates; re-read so scroll and resize stay in sync
    fn canvas_left(canvas: &HtmlCanvasElement) -> f32 {
        canvas.get_bounding_client_rect().left() as f32
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
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
fn main() {
    use responsibility_rush::leaderboard::{Backend, LeaderboardClient, now_unix_ms};
    use responsibility_rush::objects::FieldEvent;
    use responsibility_rush::render::CommandRecorder;
    use responsibility_rush::{Catalogue, Phase, Session, Settings};

    env_logger::init();
    log::info!("Responsibility Rush (native) starting...");
    log::info!("Native mode runs a headless autopilot - use `trunk serve` for the web version");

    let settings = Settings::load();
    let seed = now_unix_ms();
    let mut session = Session::new(settings.clone(), Catalogue::builtin(), seed);
    let mut surface = CommandRecorder::default();

    // Autopilot: chase the lowest collectible, ignore the rest
    const MAX_FRAMES: u32 = 60 * 120;
    let mut collected = 0;
    let mut hits = 0;
    for _ in 0..MAX_FRAMES {
        let target = session
            .field
            .entities()
            .iter()
            .filter(|e| e.is_collectible())
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x);
        if let Some(x) = target {
            session.pointer_at(x);
        }

        for event in session.step(1.0) {
            match event {
                FieldEvent::Collected { .. } => collected += 1,
                FieldEvent::Hit { .. } => hits += 1,
                _ => {}
            }
        }

        surface.clear();
        session.draw(&mut surface);

        if session.phase == Phase::GameOver {
            break;
        }
    }

    println!(
        "Run finished after {:.0} frames: score {}, {} caught, {} hits, {} draw calls last frame",
        session.frames,
        session.score,
        collected,
        hits,
        surface.commands.len()
    );

    // Native builds have no HTTP transport, so scores stay in memory
    let leaderboard = LeaderboardClient::new(Backend::from_config(None));
    pollster::block_on(async {
        if leaderboard.is_qualified(session.score, settings.top_n).await {
            let _ = leaderboard.submit_score("autopilot", session.score).await;
        }
        if let Ok(top) = leaderboard.fetch_top_scores(settings.top_n).await {
            for (rank, entry) in top.iter().enumerate() {
                println!("{:>3}. {:<12} {:>6}  {}", rank + 1, entry.name, entry.score, entry.timestamp);
            }
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
