//! The arcade: ambient field plus at most one running mini-game
//!
//! One [`Scheduler`] multiplexes the field's frame loop, the ambient ring
//! interval and every timer the active session owns. Session timers carry the
//! generation of the session that started them and are dropped unheard if it
//! no longer matches.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::ParticleField;
use super::geom::Bounds;
use super::input::{InputEvent, InputTarget};
use super::modes::{GameMode, GameModeAdapter, SessionCtx, SessionTimer, TimerRequest, TimerRequests, memory};
use super::scheduler::{FiredKind, Scheduler, TimerHandle};
use super::session::{Clock, GameSession, Lifecycle};
use crate::audio::{SoundEffect, SoundSink};
use crate::consts::AMBIENT_POP_INTERVAL_MS;
use crate::frame_scale;
use crate::renderer::{RenderTarget, draw_field, draw_session};
use crate::settings::Settings;

/// Keeps the field's RNG stream apart from the session's
const FIELD_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Scheduler dispatch tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcadeTimer {
    FieldFrame,
    AmbientPop,
    Session { generation: u32, timer: SessionTimer },
}

/// What the host shows next to the game area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub mode: GameMode,
    pub lifecycle: Lifecycle,
    pub score: u32,
    /// "Time: 12s", "Rounds: 4" or "Lives: 3"; None when the mode has none
    pub clock_label: Option<String>,
    /// Description while idle, mode status while running, result once ended
    pub status: String,
}

pub struct Arcade {
    settings: Settings,
    scheduler: Scheduler<ArcadeTimer>,
    field: ParticleField,
    session: GameSession,
    adapter: Option<GameModeAdapter>,
    session_timers: Vec<(SessionTimer, TimerHandle)>,
    area: Bounds,
    rng: Pcg32,
    sound: Box<dyn SoundSink>,
    generation: u32,
}

impl Arcade {
    pub fn new(settings: Settings, viewport: Bounds, sound: Box<dyn SoundSink>) -> Self {
        let seed = settings.seed_or_default();
        let field = ParticleField::new(viewport, settings.ambient_cap(), seed ^ FIELD_STREAM, settings.field_enabled());
        let mut scheduler = Scheduler::new();
        scheduler.start_frame_loop(ArcadeTimer::FieldFrame);
        scheduler.start_interval(AMBIENT_POP_INTERVAL_MS, ArcadeTimer::AmbientPop);
        let area = Bounds::new(settings.game_area.width, settings.game_area.height);

        log::info!("arcade ready: seed={seed:#x} viewport={}x{}", viewport.width, viewport.height);
        Self {
            settings,
            scheduler,
            field,
            session: GameSession::idle(GameMode::default()),
            adapter: None,
            session_timers: Vec::new(),
            area,
            rng: Pcg32::seed_from_u64(seed),
            sound,
            generation: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lifecycle
    }

    pub fn selected_mode(&self) -> GameMode {
        self.session.mode
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn adapter(&self) -> Option<&GameModeAdapter> {
        self.adapter.as_ref()
    }

    pub fn adapter_mut(&mut self) -> Option<&mut GameModeAdapter> {
        self.adapter.as_mut()
    }

    pub fn area(&self) -> Bounds {
        self.area
    }

    /// Live timers owned by the current session
    pub fn session_timer_count(&self) -> usize {
        self.session_timers.len()
    }

    pub fn live_entities(&self) -> usize {
        self.adapter.as_ref().map_or(0, GameModeAdapter::live_entities)
    }

    /// Switch modes; whatever was active is torn down and the new mode waits Idle
    pub fn select_mode(&mut self, mode: GameMode) {
        self.teardown();
        self.adapter = None;
        self.session = GameSession::idle(mode);
        log::info!("selected {}", mode.as_str());
    }

    /// Start the selected mode; from Running this is a restart
    pub fn start(&mut self) {
        self.teardown();
        self.generation = self.generation.wrapping_add(1);
        let mode = self.session.mode;
        self.session.start(mode, self.generation);

        let mut ctx = SessionCtx::new(&mut self.session, &mut self.rng, self.sound.as_ref(), self.area);
        let adapter = GameModeAdapter::start(mode, &mut ctx);
        let requests = ctx.into_requests();
        self.adapter = Some(adapter);
        log::info!("session {} started: {}", self.generation, mode.as_str());
        self.apply_requests(requests);
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// End the running session; a no-op from Idle or Ended
    pub fn stop(&mut self) {
        if self.session.is_running() {
            self.end_session();
        } else {
            log::debug!("stop ignored while {:?}", self.session.lifecycle);
        }
    }

    fn end_session(&mut self) {
        if !self.session.end() {
            return;
        }
        self.teardown();
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.clear();
        }
        log::info!(
            "session {} ended: {} scored {}",
            self.generation,
            self.session.mode.as_str(),
            self.session.score
        );
    }

    /// Cancel every session-owned timer
    fn teardown(&mut self) {
        for (_, handle) in self.session_timers.drain(..) {
            self.scheduler.stop(handle);
        }
    }

    fn apply_requests(&mut self, requests: TimerRequests) {
        let TimerRequests { starts, stops, ended } = requests;
        for timer in stops {
            self.stop_session_timer(timer);
        }
        for (timer, request) in starts {
            // one handle per timer kind
            self.stop_session_timer(timer);
            let tag = ArcadeTimer::Session {
                generation: self.generation,
                timer,
            };
            let handle = match request {
                TimerRequest::Frame => self.scheduler.start_frame_loop(tag),
                TimerRequest::Interval { period_ms } => self.scheduler.start_interval(period_ms, tag),
                TimerRequest::Timeout { delay_ms } => self.scheduler.start_timeout(delay_ms, tag),
            };
            self.session_timers.push((timer, handle));
        }
        if ended {
            self.end_session();
        }
    }

    fn stop_session_timer(&mut self, timer: SessionTimer) {
        let scheduler = &mut self.scheduler;
        self.session_timers.retain(|&(t, handle)| {
            if t == timer {
                scheduler.stop(handle);
                false
            } else {
                true
            }
        });
    }

    /// Run `f` against the running session, then apply what it asked for
    fn dispatch(&mut self, f: impl FnOnce(&mut GameModeAdapter, &mut SessionCtx<'_>)) {
        if !self.session.is_running() {
            return;
        }
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        let mut ctx = SessionCtx::new(&mut self.session, &mut self.rng, self.sound.as_ref(), self.area);
        f(adapter, &mut ctx);
        let requests = ctx.into_requests();
        self.apply_requests(requests);
    }

    /// Advance wall-clock time and run everything that came due
    pub fn advance(&mut self, delta_ms: f64) {
        self.scheduler.advance(delta_ms);
        while let Some(fired) = self.scheduler.poll() {
            match fired.tag {
                ArcadeTimer::FieldFrame => self.field.tick(frame_scale(fired.delta_ms)),
                ArcadeTimer::AmbientPop => self.field.ambient_pop(),
                ArcadeTimer::Session { generation, timer } => {
                    if fired.kind == FiredKind::Timeout {
                        self.session_timers.retain(|&(_, h)| h != fired.handle);
                    }
                    if generation != self.generation || !self.session.is_running() {
                        log::debug!("dropping stale {timer:?} from session {generation}");
                        self.scheduler.stop(fired.handle);
                        continue;
                    }
                    let delta_ms = fired.delta_ms;
                    match timer {
                        SessionTimer::Frame => self.dispatch(|a, ctx| a.on_frame(delta_ms, ctx)),
                        SessionTimer::Countdown => self.dispatch(|_, ctx| {
                            let flow = ctx.session.tick_seconds();
                            ctx.follow(flow);
                        }),
                        other => self.dispatch(|a, ctx| a.on_timer(other, ctx)),
                    }
                }
            }
        }
    }

    /// Route one host event: background to the field, game area to the session
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PressStart {
                pos,
                target: InputTarget::Background,
            } => self.field.press_start(pos),
            InputEvent::Move {
                pos,
                target: InputTarget::Background,
            } => self.field.press_move(pos),
            // only ends a press that began on the background
            InputEvent::PressEnd { .. } => self.field.press_end(self.sound.as_ref()),
            InputEvent::Trigger { pos } => {
                self.field.burst(pos);
                self.sound.play(SoundEffect::ButtonPop);
            }
            _ => {}
        }

        if let Some(input) = event.to_game() {
            self.dispatch(|a, ctx| a.on_input(input, ctx));
        }
    }

    /// Viewport changed; the field keeps its bubbles
    pub fn resize(&mut self, viewport: Bounds) {
        self.field.resize(viewport);
    }

    /// Game area changed; takes effect for spawns and bounds from now on
    pub fn resize_area(&mut self, area: Bounds) {
        self.area = area;
    }

    pub fn render_field(&self, target: &mut dyn RenderTarget) {
        draw_field(target, &self.field);
    }

    pub fn render_session(&self, target: &mut dyn RenderTarget) {
        draw_session(target, self.adapter.as_ref());
    }

    pub fn hud(&self) -> HudSnapshot {
        let s = &self.session;
        let clock_label = match (s.clock, s.lives) {
            (Some(Clock::Seconds(n)), _) => Some(format!("Time: {n}s")),
            (Some(Clock::Rounds(n)), _) => Some(format!("Rounds: {n}")),
            (None, Some(lives)) => Some(format!("Lives: {lives}")),
            (None, None) => None,
        };
        let status = match s.lifecycle {
            Lifecycle::Idle => s.mode.description().to_string(),
            Lifecycle::Running => self
                .adapter
                .as_ref()
                .and_then(GameModeAdapter::status)
                .unwrap_or_else(|| "Playing".to_string()),
            Lifecycle::Ended if s.mode == GameMode::MemoryMatch && s.score == u32::from(memory::PAIRS) => {
                "All matched!".to_string()
            }
            Lifecycle::Ended => "Game over".to_string(),
        };
        HudSnapshot {
            mode: s.mode,
            lifecycle: s.lifecycle,
            score: s.score,
            clock_label,
            status,
        }
    }
}
