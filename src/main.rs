//! Jingle Defense entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use jingle_defense::platform::{InputState, Key, WebStorage, map_key};
    use jingle_defense::sim::{
        AmmoKind, Character, GameEvent, GamePhase, PickupKind, RenderSink, RenderSnapshot,
        SpriteKind, Viewport,
    };
    use jingle_defense::{Session, Tuning};

    /// Draws placeholder shapes; sprite art is optional
    struct CanvasSink {
        ctx: CanvasRenderingContext2d,
    }

    fn sprite_color(kind: SpriteKind) -> &'static str {
        match kind {
            SpriteKind::Player(Character::Santa) => "#d62828",
            SpriteKind::Player(Character::MsClaus) => "#e76f51",
            SpriteKind::Player(Character::Frosty) => "#caf0f8",
            SpriteKind::Player(Character::Kasie) => "#9b5de5",
            SpriteKind::Tree => "#2d6a4f",
            SpriteKind::Pickup(PickupKind::Stocking) => "#ef233c",
            SpriteKind::Pickup(PickupKind::Snowflake) => "#90e0ef",
            SpriteKind::Pickup(PickupKind::Cocoa) => "#7f5539",
            SpriteKind::Pickup(PickupKind::Present(AmmoKind::Explosive)) => "#ff595e",
            SpriteKind::Pickup(PickupKind::Present(_)) => "#1982c4",
            SpriteKind::Ornament { explosive: true, .. } => "#ff595e",
            SpriteKind::Ornament { homing: true, .. } => "#1982c4",
            SpriteKind::Ornament { .. } => "#ffca3a",
            SpriteKind::Coal | SpriteKind::BossCoal => "#222222",
            SpriteKind::Boss { engaging: false } => "#40916c",
            SpriteKind::Boss { engaging: true } => "#1b4332",
            SpriteKind::Reindeer => "#a47148",
            SpriteKind::Companion => "#ffd166",
            SpriteKind::Star => "#fff3b0",
        }
    }

    impl CanvasSink {
        fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
            self.ctx.set_fill_style_str(color);
            self.ctx.begin_path();
            let _ = self.ctx.arc(x, y, r.max(1.0), 0.0, TAU);
            self.ctx.fill();
        }

        fn text(&self, text: &str, x: f64, y: f64) {
            let _ = self.ctx.fill_text(text, x, y);
        }

        fn draw_hud(&self, snapshot: &RenderSnapshot) {
            let hud = &snapshot.hud;
            self.ctx.set_fill_style_str("#ffffff");
            self.ctx.set_font("18px sans-serif");
            self.text(&format!("Score {}", hud.score), 12.0, 26.0);
            self.text(&format!("Level {}", hud.level), 12.0, 50.0);
            self.text(&format!("Points {}", hud.currency), 12.0, 74.0);
            if hud.combo > 1 {
                self.text(&format!("Combo {} (x{})", hud.combo, hud.multiplier), 12.0, 98.0);
            }
            if let Some(label) = &hud.combo_label {
                self.text(label, snapshot.width as f64 * 0.5 - 60.0, 120.0);
            }
            let ammo = format!(
                "Ammo {:?}  blue {}  red {}",
                hud.selected_ammo, hud.homing_ammo, hud.explosive_ammo
            );
            self.text(&ammo, 12.0, snapshot.height as f64 - 16.0);
            if hud.slow_secs > 0 {
                self.text(
                    &format!("Slow {}s x{}", hud.slow_secs, hud.slow_stacks),
                    snapshot.width as f64 - 130.0,
                    26.0,
                );
            }
            if let Some(boss) = &hud.boss {
                let w = snapshot.width as f64 * 0.6;
                let x = snapshot.width as f64 * 0.2;
                let frac = (boss.health.max(0) as f64) / (boss.max_health.max(1) as f64);
                self.ctx.set_fill_style_str("#444444");
                self.ctx.fill_rect(x, 8.0, w, 10.0);
                self.ctx.set_fill_style_str("#e63946");
                self.ctx.fill_rect(x, 8.0, w * frac, 10.0);
            }
            self.ctx.set_fill_style_str("#ffffff");
            self.ctx.set_font("32px sans-serif");
            let (cx, cy) = (snapshot.width as f64 * 0.5 - 120.0, snapshot.height as f64 * 0.45);
            match hud.phase {
                "ready" => self.text("Press Space to start", cx, cy),
                "paused" => self.text("Paused", cx + 60.0, cy),
                "gameOver" => self.text("Game over! Space to retry", cx - 40.0, cy),
                _ if hud.level_banner => self.text(&format!("Level {}!", hud.level), cx + 50.0, cy),
                _ => {}
            }
        }
    }

    impl RenderSink for CanvasSink {
        fn draw(&mut self, snapshot: &RenderSnapshot) {
            let (w, h) = (snapshot.width as f64, snapshot.height as f64);
            self.ctx.set_fill_style_str("#0b1d3a");
            self.ctx.fill_rect(0.0, 0.0, w, h);

            for sprite in &snapshot.sprites {
                let r = sprite.size as f64 * 0.5;
                self.circle(sprite.pos.x as f64, sprite.pos.y as f64, r, sprite_color(sprite.kind));
            }

            self.ctx.set_stroke_style_str("#ffb703");
            for chain in &snapshot.chains {
                self.ctx.set_global_alpha(chain.alpha as f64);
                self.ctx.begin_path();
                self.ctx.move_to(chain.from.x as f64, chain.from.y as f64);
                self.ctx.line_to(chain.to.x as f64, chain.to.y as f64);
                self.ctx.stroke();
            }
            self.ctx.set_global_alpha(1.0);

            self.draw_hud(snapshot);
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<WebStorage>,
        input: InputState,
        sink: CanvasSink,
        canvas: HtmlCanvasElement,
        pending_purchase: Option<Character>,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let input = self.input.take_tick_input();
            for event in self.session.frame(time, &input) {
                match event {
                    GameEvent::GameOver { new_best: true, score, .. } => {
                        log::info!("New high score: {}", score);
                    }
                    other => log::debug!("{:?}", other),
                }
            }
            self.session.render(&mut self.sink);
            self.draw_menu();
        }

        fn fit_canvas(&mut self) {
            let Some((w, h)) = window_size() else {
                return;
            };
            self.canvas.set_width(w as u32);
            self.canvas.set_height(h as u32);
            self.session.resize(Viewport::new(w, h));
        }

        /// Owned characters are selected at once. A locked one is bought
        /// on the second press, if affordable.
        fn pick_character(&mut self, character: Character) {
            if self.session.profile().is_unlocked(character) {
                self.pending_purchase = None;
                match self.session.select_character(character) {
                    Ok(()) => log::info!("Selected {}", character.name()),
                    Err(e) => log::warn!("Cannot select {}: {}", character.name(), e),
                }
                return;
            }
            if self.pending_purchase != Some(character) {
                self.pending_purchase = Some(character);
                log::info!(
                    "{} ({}) costs {} points, press again to buy",
                    character.name(),
                    character.blurb(),
                    character.cost()
                );
                return;
            }
            self.pending_purchase = None;
            match self.session.choose_character(character) {
                Ok(_) => log::info!("Bought {}", character.name()),
                Err(e) => log::warn!("Cannot buy {}: {}", character.name(), e),
            }
        }

        fn draw_menu(&self) {
            if !matches!(self.session.phase(), GamePhase::Ready | GamePhase::GameOver) {
                return;
            }
            let ctx = &self.sink.ctx;
            let profile = self.session.profile();
            ctx.set_font("16px sans-serif");
            for (i, character) in Character::ALL.iter().enumerate() {
                let status = if profile.selected == *character {
                    "selected".to_string()
                } else if profile.is_unlocked(*character) {
                    "owned".to_string()
                } else if self.pending_purchase == Some(*character) {
                    "press again to buy".to_string()
                } else {
                    format!("{} pts", character.cost())
                };
                let color = if profile.can_choose(*character) { "#ffffff" } else { "#888888" };
                ctx.set_fill_style_str(color);
                let line = format!(
                    "{}. {} - {} ({})",
                    i + 1,
                    character.name(),
                    character.blurb(),
                    status
                );
                let y = self.canvas.height() as f64 * 0.55 + i as f64 * 24.0;
                let _ = ctx.fill_text(&line, 24.0, y);
            }
        }

        /// Space on the title or game-over screen starts a run
        fn wants_start(&self, key: Key) -> bool {
            key == Key::Fire
                && matches!(self.session.phase(), GamePhase::Ready | GamePhase::GameOver)
        }
    }

    fn window_size() -> Option<(f32, f32)> {
        let window = web_sys::window()?;
        let w = window.inner_width().ok()?.as_f64()?;
        let h = window.inner_height().ok()?.as_f64()?;
        Some((w as f32, h as f32))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Jingle Defense starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("missing #canvas element")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into()?;

        let (w, h) = window_size().unwrap_or((800.0, 600.0));
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(WebStorage::new(), seed, Viewport::new(w, h), Tuning::default());
        log::info!(
            "Best {}, {} points, playing as {}",
            session.profile().high_score,
            session.profile().total_points,
            session.profile().selected.name()
        );

        let game = Rc::new(RefCell::new(Game {
            session,
            input: InputState::new(),
            sink: CanvasSink { ctx },
            canvas,
            pending_purchase: None,
        }));

        setup_input_handlers(&window, game.clone());
        setup_auto_pause(&window, game.clone());
        request_animation_frame(game);
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();

                // Character select from the menu: 1-4
                if !matches!(g.session.phase(), GamePhase::Playing | GamePhase::Paused) {
                    if let Some(character) = key
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| Character::ALL.get(i).copied())
                    {
                        g.pick_character(character);
                        return;
                    }
                }

                let Some(key) = map_key(&key) else {
                    return;
                };
                event.prevent_default();
                if g.wants_start(key) {
                    g.session.start_run();
                    return;
                }
                g.input.key_down(key, event.repeat());
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = map_key(&event.key()) {
                    game.borrow_mut().input.key_up(key);
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().fit_canvas();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.input.release_all();
            if g.session.phase() == GamePhase::Playing {
                g.input.request_pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Headless autopilot run: plays one game with the demo AI and prints a summary.
///
/// Usage: `jingle-defense [tuning.json] [seed]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use jingle_defense::persistence::MemoryStore;
    use jingle_defense::sim::{GameEvent, GamePhase, TickInput, Viewport};
    use jingle_defense::{Session, Tuning};

    env_logger::init();
    log::info!("Jingle Defense (native) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Cannot read {}: {}, using default tuning", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2024);

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut session = Session::new(MemoryStore::new(), seed, Viewport::new(720.0, 1280.0), tuning);
    session.start_run();
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut bosses = 0;
    let mut frames = 0;
    while frames < MAX_FRAMES && session.phase() != GamePhase::GameOver {
        let events = session.frame(frames as f64 * FRAME_MS, &input);
        bosses += events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossDefeated))
            .count();
        frames += 1;
    }

    let state = session.state();
    println!("Seed {} ran {:.1}s of play", seed, state.elapsed);
    println!(
        "Score {}  level {}  kills {}  bosses {}",
        state.progression.score, state.progression.level, state.progression.kills, bosses
    );
    println!(
        "Best {}  points {}",
        session.profile().high_score,
        session.profile().total_points
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
