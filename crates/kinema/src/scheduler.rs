//! Playback scheduling.
//!
//! The [`Scheduler`] turns elapsed wall-clock time into a cursor over a
//! [`MotionTrack`]. It is an explicit state machine:
//!
//! ```text
//!            play()                    tick(): elapsed < duration
//!   Idle ───────────────▶ Running ◀──────────────────────────────┐
//!    ▲                      │  │                                 │
//!    │  stop() / reset()    │  └─────────────────────────────────┘
//!    ├──────────────────────┘
//!    │  tick(): elapsed >= duration  (cursor = last, Completed)
//!    └──────────────────────────────
//! ```
//!
//! Every call to [`play`](Scheduler::play) opens a new session and hands out
//! a [`Tick`] token tagged with it. The host schedules the token (a frame
//! callback, a timer, a command) and passes it back to
//! [`tick`](Scheduler::tick). Tokens from an older session, or from another
//! scheduler, are rejected as [`TickOutcome::Stale`], so a callback that was
//! already in flight when playback stopped can never move the cursor again.
//!
//! ```rust
//! use kinema::{ManualClock, MotionSample, MotionTrack, Scheduler, TickOutcome};
//!
//! let track = MotionTrack::new(vec![
//!     MotionSample::new(0.0, 0.0, 50.0),
//!     MotionSample::new(1.0, 0.0, 45.0),
//!     MotionSample::new(2.0, 0.0, 30.0),
//!     MotionSample::new(3.2, 0.0, 0.0),
//! ])
//! .unwrap();
//!
//! let clock = ManualClock::new();
//! let mut scheduler = Scheduler::with_clock(&track, clock.clone());
//! let first = scheduler.play();
//!
//! scheduler.stop();
//! assert_eq!(scheduler.tick(first), TickOutcome::Stale);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::model::MotionTrack;

/// Global ID counter for scheduler instances.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Default frames per second for tick scheduling.
pub const DEFAULT_FPS: u32 = 60;

/// Returns the interval between frames at `n` frames per second.
///
/// Zero is treated as one frame per second.
///
/// ```rust
/// use kinema::fps;
/// use std::time::Duration;
///
/// assert_eq!(fps(4), Duration::from_millis(250));
/// ```
pub fn fps(n: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(n.max(1)))
}

/// A scheduled tick, tagged with the session that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tick {
    id: u64,
    session: u64,
}

impl Tick {
    /// The scheduler this tick belongs to.
    pub const fn scheduler_id(&self) -> u64 {
        self.id
    }

    /// The playback session this tick belongs to.
    pub const fn session(&self) -> u64 {
        self.session
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a cancelled or finished session; nothing changed.
    Stale,
    /// The cursor moved (or stayed); schedule `next`.
    Advanced {
        /// Cursor after this tick.
        cursor: usize,
        /// Token for the following tick.
        next: Tick,
    },
    /// The track finished. Playback is now idle.
    Completed {
        /// The final index.
        cursor: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { started: Instant },
}

/// Playback state machine over one motion track.
///
/// Cloning gives an independent scheduler with its own id: tokens from the
/// clone are stale for the original and the other way round.
#[derive(Debug)]
pub struct Scheduler<C: Clock = SystemClock> {
    id: u64,
    clock: C,
    track: MotionTrack,
    cursor: usize,
    session: u64,
    phase: Phase,
    frame_interval: Duration,
}

impl<C: Clock + Clone> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            clock: self.clock.clone(),
            track: self.track.clone(),
            cursor: self.cursor,
            session: self.session,
            phase: self.phase,
            frame_interval: self.frame_interval,
        }
    }
}

impl Scheduler<SystemClock> {
    /// Creates a scheduler driven by the system clock.
    pub fn new(track: &MotionTrack) -> Self {
        Self::with_clock(track, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Creates a scheduler driven by the given clock.
    pub fn with_clock(track: &MotionTrack, clock: C) -> Self {
        Self {
            id: next_id(),
            clock,
            track: track.clone(),
            cursor: 0,
            session: 0,
            phase: Phase::Idle,
            frame_interval: fps(DEFAULT_FPS),
        }
    }

    /// Sets the tick rate.
    #[must_use]
    pub fn with_fps(mut self, frames: u32) -> Self {
        self.frame_interval = fps(frames);
        self
    }

    /// Returns the scheduler's unique ID.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Current sample index.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a session is running.
    pub const fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// The current session tag.
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Delay the host should wait between ticks.
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Track duration in seconds.
    pub fn duration(&self) -> f64 {
        self.track.duration()
    }

    /// The track being played.
    pub const fn track(&self) -> &MotionTrack {
        &self.track
    }

    /// Seconds since the running session started, if any.
    pub fn elapsed(&self) -> Option<f64> {
        match self.phase {
            Phase::Idle => None,
            Phase::Running { started } => Some(
                self.clock
                    .now()
                    .saturating_duration_since(started)
                    .as_secs_f64(),
            ),
        }
    }

    /// Whether `tick` would be accepted right now.
    pub fn is_current(&self, tick: &Tick) -> bool {
        self.is_playing() && tick.id == self.id && tick.session == self.session
    }

    /// Starts playback from the beginning.
    ///
    /// Any running session is cancelled first. Returns the token for the
    /// first tick.
    pub fn play(&mut self) -> Tick {
        self.session = self.session.wrapping_add(1);
        self.cursor = 0;
        self.phase = Phase::Running {
            started: self.clock.now(),
        };
        debug!(
            scheduler = self.id,
            session = self.session,
            duration = self.duration(),
            "playback started"
        );
        self.token()
    }

    /// Stops playback, holding the cursor where it is.
    ///
    /// Every token handed out so far becomes stale.
    pub fn stop(&mut self) {
        if self.is_playing() {
            debug!(
                scheduler = self.id,
                session = self.session,
                cursor = self.cursor,
                "playback stopped"
            );
        }
        self.session = self.session.wrapping_add(1);
        self.phase = Phase::Idle;
    }

    /// Drives playback from a boolean "playing" flag.
    ///
    /// `true` always restarts from the beginning; `false` stops. Returns the
    /// first tick when playback starts.
    pub fn set_playing(&mut self, playing: bool) -> Option<Tick> {
        if playing {
            Some(self.play())
        } else {
            self.stop();
            None
        }
    }

    /// Stops if playing, otherwise starts from the beginning.
    pub fn toggle(&mut self) -> Option<Tick> {
        self.set_playing(!self.is_playing())
    }

    /// Stops playback and rewinds the cursor to the first sample.
    pub fn reset(&mut self) {
        self.stop();
        self.cursor = 0;
    }

    /// Advances the cursor for a scheduled tick.
    pub fn tick(&mut self, tick: Tick) -> TickOutcome {
        if !self.is_current(&tick) {
            trace!(
                scheduler = self.id,
                tick_scheduler = tick.id,
                tick_session = tick.session,
                session = self.session,
                "stale tick ignored"
            );
            return TickOutcome::Stale;
        }

        let elapsed = self.elapsed().unwrap_or_default();
        if elapsed >= self.duration() {
            self.cursor = self.track.last_index();
            self.phase = Phase::Idle;
            debug!(
                scheduler = self.id,
                session = self.session,
                "playback completed"
            );
            return TickOutcome::Completed {
                cursor: self.cursor,
            };
        }

        self.cursor = self.track.index_at(elapsed);
        TickOutcome::Advanced {
            cursor: self.cursor,
            next: self.token(),
        }
    }

    fn token(&self) -> Tick {
        Tick {
            id: self.id,
            session: self.session,
        }
    }
}
