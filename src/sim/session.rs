//! Score and lifecycle state machine
//!
//! `Idle → Running → Ended`, with `start` legal from every state: starting
//! while Running is an implicit restart. Nothing here returns an error;
//! wrong-state calls are ignored and report `false`.

use serde::{Deserialize, Serialize};

use super::collision::{CollisionOutcome, Consequence};
use super::modes::GameMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Idle,
    Running,
    Ended,
}

/// Countdown a mode runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clock {
    Seconds(u32),
    Rounds(u32),
}

impl Clock {
    pub fn remaining(&self) -> u32 {
        match *self {
            Clock::Seconds(n) | Clock::Rounds(n) => n,
        }
    }

    fn decremented(self) -> Self {
        match self {
            Clock::Seconds(n) => Clock::Seconds(n.saturating_sub(1)),
            Clock::Rounds(n) => Clock::Rounds(n.saturating_sub(1)),
        }
    }
}

/// What the caller should do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    End,
}

/// One run of one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub mode: GameMode,
    pub score: u32,
    /// Remaining seconds or rounds
    pub clock: Option<Clock>,
    /// Remaining lives; the session ends at zero
    pub lives: Option<u32>,
    pub lifecycle: Lifecycle,
    /// Token checked by every timer callback before it may act
    pub generation: u32,
}

impl GameSession {
    pub fn idle(mode: GameMode) -> Self {
        let config = mode.config();
        Self {
            mode,
            score: 0,
            clock: config.clock,
            lives: config.lives,
            lifecycle: Lifecycle::Idle,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Enter Running from any state, resetting score, clock and lives
    pub fn start(&mut self, mode: GameMode, generation: u32) {
        let config = mode.config();
        self.mode = mode;
        self.score = 0;
        self.clock = config.clock;
        self.lives = config.lives;
        self.generation = generation;
        self.lifecycle = Lifecycle::Running;
    }

    /// Enter Ended; false (and no change at all) unless Running
    pub fn end(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.lifecycle = Lifecycle::Ended;
        true
    }

    pub fn add_score(&mut self, points: u32) {
        if self.is_running() {
            self.score = self.score.saturating_add(points);
        }
    }

    /// One-second countdown tick (seconds clocks only)
    pub fn tick_seconds(&mut self) -> Flow {
        match self.clock {
            Some(clock @ Clock::Seconds(_)) if self.is_running() => self.decrement(clock),
            _ => Flow::Continue,
        }
    }

    /// One completed round (rounds clocks only)
    pub fn complete_round(&mut self) -> Flow {
        match self.clock {
            Some(clock @ Clock::Rounds(_)) if self.is_running() => self.decrement(clock),
            _ => Flow::Continue,
        }
    }

    fn decrement(&mut self, clock: Clock) -> Flow {
        let next = clock.decremented();
        self.clock = Some(next);
        if next.remaining() == 0 {
            Flow::End
        } else {
            Flow::Continue
        }
    }

    /// Remove one life; `End` once none remain
    pub fn lose_life(&mut self) -> Flow {
        if !self.is_running() {
            return Flow::Continue;
        }
        match self.lives {
            Some(lives) => {
                let left = lives.saturating_sub(1);
                self.lives = Some(left);
                if left == 0 { Flow::End } else { Flow::Continue }
            }
            None => Flow::Continue,
        }
    }

    /// Apply a collision outcome to score/lives
    pub fn apply(&mut self, outcome: &CollisionOutcome) -> Flow {
        if !self.is_running() {
            return Flow::Continue;
        }
        match outcome.consequence {
            Consequence::Scored(points) => {
                self.add_score(points);
                Flow::Continue
            }
            Consequence::LifeLost => self.lose_life(),
            Consequence::SessionEnded => Flow::End,
        }
    }
}
