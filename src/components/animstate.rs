//! Playback state of one named animation instance.
//!
//! An [`AnimState`] owns a shared handle to its segment's physical frames and
//! advances a logical frame by elapsed time:
//!
//! ```text
//! Idle ──play──▶ Delayed ──delay elapsed──▶ Playing ──wrap──▶ Looping
//!                   │                          │
//!                   └─────────(delay = 0)──────┘──end, no loop──▶ Finished
//! ```
//!
//! Advancing is a pure function of elapsed time and the state's own fields,
//! so an entity can run several states side by side (a "combo").

use std::sync::Arc;

use smallvec::SmallVec;

/// Layer used by plain `PlayAnimation` requests.
pub const BASE_LAYER: &str = "base";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimStatus {
    Idle,
    /// Waiting for its start delay; holds the start frame.
    Delayed,
    Playing,
    /// Playing and has wrapped at least once.
    Looping,
    Finished,
}

/// Parameters of a play request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayParams {
    pub looped: bool,
    pub speed_scale: f32,
    pub start_frame: usize,
    /// Seconds to hold the start frame before advancing.
    pub delay: f32,
    /// Keep the last frame visible once finished.
    pub hold_last_frame: bool,
    /// Frame rate override; the definition's fps when `None`.
    pub fps: Option<f32>,
}

impl Default for PlayParams {
    fn default() -> Self {
        Self {
            looped: true,
            speed_scale: 1.0,
            start_frame: 0,
            delay: 0.0,
            hold_last_frame: true,
            fps: None,
        }
    }
}

impl PlayParams {
    pub fn once() -> Self {
        Self {
            looped: false,
            ..Self::default()
        }
    }
}

/// Which visual tracks a state drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackScope {
    All,
    Only(SmallVec<[usize; 8]>),
}

impl TrackScope {
    pub fn covers(&self, track: usize) -> bool {
        match self {
            TrackScope::All => true,
            TrackScope::Only(tracks) => tracks.contains(&track),
        }
    }
}

/// One logical frame advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStep {
    pub from: usize,
    pub to: usize,
    /// The step wrapped from the last frame back to the first.
    pub wrapped: bool,
}

/// What happened during a single [`AnimState::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub steps: SmallVec<[FrameStep; 4]>,
    /// Whole loops completed this tick that are not listed in `steps`.
    pub cycles: usize,
    /// The state reached `Finished` during this tick.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimState {
    pub layer: String,
    pub name: String,
    pub status: AnimStatus,
    pub paused: bool,
    pub looped: bool,
    /// Logical frame, relative to the segment start.
    pub frame: usize,
    pub accumulator: f32,
    pub fps: f32,
    pub speed_scale: f32,
    pub start_frame: usize,
    pub delay_remaining: f32,
    pub hold_last_frame: bool,
    pub scope: TrackScope,
    frames: Arc<[usize]>,
}

impl AnimState {
    /// Start `name` on `layer` over the given segment frames.
    pub fn play(
        layer: impl Into<String>,
        name: impl Into<String>,
        frames: Arc<[usize]>,
        default_fps: f32,
        params: &PlayParams,
        scope: TrackScope,
    ) -> Self {
        let len = frames.len();
        let start_frame = params.start_frame.min(len.saturating_sub(1));
        let status = if len == 0 {
            AnimStatus::Finished
        } else if params.delay > 0.0 {
            AnimStatus::Delayed
        } else {
            AnimStatus::Playing
        };
        Self {
            layer: layer.into(),
            name: name.into(),
            status,
            paused: false,
            looped: params.looped,
            frame: start_frame,
            accumulator: 0.0,
            fps: params.fps.unwrap_or(default_fps),
            speed_scale: params.speed_scale,
            start_frame,
            delay_remaining: params.delay.max(0.0),
            hold_last_frame: params.hold_last_frame,
            scope,
            frames,
        }
    }

    /// Number of logical frames in the segment.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Physical frames of the segment.
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    /// Physical frame currently shown.
    pub fn physical(&self) -> Option<usize> {
        self.frames.get(self.frame).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.status == AnimStatus::Finished
    }

    /// Playing or looping, i.e. advancing when not paused.
    pub fn is_active(&self) -> bool {
        matches!(self.status, AnimStatus::Playing | AnimStatus::Looping)
    }

    /// Whether the tracks this state drives are drawn.
    pub fn is_visible(&self) -> bool {
        if self.frames.is_empty() {
            return false;
        }
        match self.status {
            AnimStatus::Delayed | AnimStatus::Playing | AnimStatus::Looping => true,
            AnimStatus::Finished => self.hold_last_frame,
            AnimStatus::Idle => false,
        }
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.paused {
            return outcome;
        }

        let mut dt = dt;
        match self.status {
            AnimStatus::Idle | AnimStatus::Finished => return outcome,
            AnimStatus::Delayed => {
                self.delay_remaining -= dt;
                if self.delay_remaining > 0.0 {
                    return outcome;
                }
                dt = -self.delay_remaining;
                self.delay_remaining = 0.0;
                self.status = AnimStatus::Playing;
            }
            AnimStatus::Playing | AnimStatus::Looping => {}
        }

        let len = self.frames.len();
        if len == 0 {
            self.status = AnimStatus::Finished;
            outcome.finished = true;
            return outcome;
        }

        let rate = dt * self.speed_scale * self.fps;
        if !rate.is_finite() || rate <= 0.0 {
            return outcome;
        }
        self.accumulator += rate;
        if self.accumulator < 1.0 {
            return outcome;
        }
        let whole = self.accumulator.floor();
        self.accumulator -= whole;

        // At most one pass over the segment is stepped; extra full loops
        // are only counted.
        let mut pending = whole as usize;
        let mut finishes = false;
        if self.looped {
            outcome.cycles = pending / len;
            pending %= len;
            if outcome.cycles > 0 {
                self.status = AnimStatus::Looping;
            }
        } else {
            let remaining = len - 1 - self.frame;
            finishes = pending > remaining;
            pending = pending.min(remaining);
        }

        for _ in 0..pending {
            let from = self.frame;
            let wrapped = from + 1 == len;
            self.frame = if wrapped { 0 } else { from + 1 };
            if wrapped {
                self.status = AnimStatus::Looping;
            }
            outcome.steps.push(FrameStep {
                from,
                to: self.frame,
                wrapped,
            });
        }

        if finishes {
            self.frame = len - 1;
            self.accumulator = 0.0;
            self.status = AnimStatus::Finished;
            outcome.finished = true;
        }
        outcome
    }
}
