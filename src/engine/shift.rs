//! Timed dungeon shift: heartbeat cue, fade to black, new level, fade back in.

use crate::config::ShiftConfig;
use crate::constants::SHIFT_TEXT;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftPhase {
    /// Counting down to the next shift
    Waiting,
    FadingOut,
    /// Black screen with the shift message
    ShowingText,
    FadingIn,
}

/// What the engine has to act on after a shift update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSignal {
    /// The shift is close; switch the player's light to the heartbeat
    Heartbeat,
    FadeOutStarted,
    /// Screen is black: swap in a new level now
    Regenerate,
    Finished,
}

pub struct DungeonShift {
    config: ShiftConfig,
    phase: ShiftPhase,
    /// Seconds left in the current countdown (Waiting, ShowingText)
    timer: f32,
    /// 0 = fully visible, 1 = black
    fade: f32,
    heartbeat_sent: bool,
    /// Set by `trigger`; runs the shift even when the timer is disabled
    triggered: bool,
}

impl DungeonShift {
    pub fn new(config: ShiftConfig, rng: &mut impl Rng) -> Self {
        let timer = roll_delay(&config, rng);
        Self {
            config,
            phase: ShiftPhase::Waiting,
            timer,
            fade: 0.0,
            heartbeat_sent: false,
            triggered: false,
        }
    }

    pub fn phase(&self) -> ShiftPhase {
        self.phase
    }

    /// Opacity of the black overlay
    pub fn fade_alpha(&self) -> f32 {
        self.fade
    }

    /// Seconds until the fade starts, while waiting
    pub fn time_until_shift(&self) -> Option<f32> {
        (self.phase == ShiftPhase::Waiting).then_some(self.timer.max(0.0))
    }

    /// Message to draw over the black screen
    pub fn text(&self) -> Option<&'static str> {
        (self.phase == ShiftPhase::ShowingText).then_some(SHIFT_TEXT)
    }

    /// Start the shift right away, after the heartbeat cue if it has not played yet.
    pub fn trigger(&mut self) {
        if self.phase == ShiftPhase::Waiting {
            self.timer = 0.0;
            self.triggered = true;
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> Option<ShiftSignal> {
        match self.phase {
            ShiftPhase::Waiting => {
                if !self.config.enabled && !self.triggered {
                    return None;
                }
                if !self.triggered {
                    self.timer -= dt;
                }
                if !self.heartbeat_sent && self.timer <= self.config.heartbeat_lead {
                    self.heartbeat_sent = true;
                    return Some(ShiftSignal::Heartbeat);
                }
                if self.timer <= 0.0 {
                    self.triggered = false;
                    self.phase = ShiftPhase::FadingOut;
                    return Some(ShiftSignal::FadeOutStarted);
                }
                None
            }
            ShiftPhase::FadingOut => {
                self.fade += self.config.fade_speed * dt;
                if self.fade >= 1.0 {
                    self.fade = 1.0;
                    self.phase = ShiftPhase::ShowingText;
                    self.timer = self.config.text_duration;
                }
                None
            }
            ShiftPhase::ShowingText => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.phase = ShiftPhase::FadingIn;
                    return Some(ShiftSignal::Regenerate);
                }
                None
            }
            ShiftPhase::FadingIn => {
                self.fade -= self.config.fade_speed * dt;
                if self.fade <= 0.0 {
                    self.fade = 0.0;
                    self.phase = ShiftPhase::Waiting;
                    self.timer = roll_delay(&self.config, rng);
                    self.heartbeat_sent = false;
                    return Some(ShiftSignal::Finished);
                }
                None
            }
        }
    }
}

fn roll_delay(config: &ShiftConfig, rng: &mut impl Rng) -> f32 {
    rng.gen_range(config.delay_min..=config.delay_max)
}
