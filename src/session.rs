//! Session state machine.
//!
//! One `SessionMachine` owns everything a booth session needs between frames:
//! the current phase (with its countdown, if any), the raise cooldown clocks,
//! the swipe tracker and the selected emoji. It is advanced by calling
//! [`SessionMachine::tick`] once per rendered frame with the latest detection
//! snapshot, and reports what to display in the returned
//! [`RenderInstructions`].
//!
//! Countdown timers are stored inside the phase that uses them, so leaving a
//! phase drops its timer. The exit action of a countdown is emitted by the
//! same match arm that moves the machine out of that phase; later ticks can
//! no longer reach it.

use crate::config::{GestureConfig, SessionConfig};
use crate::constants::{INSTRUCTION_OVERLAY, INSTRUCTION_RAISE_TO_START};
use crate::countdown::{Countdown, CountdownStatus};
use crate::detection::DetectionSnapshot;
use crate::gesture::{is_raised, SwipeDetector, SwipeTracker};
use crate::{Error, Result};
use log::{debug, info};
use std::fmt;

/// User-facing session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Inert; entered after reset or after a capture
    Idle,
    /// Waiting for a raised hand to begin
    WaitingStartHand,
    /// Counting down to the live overlay
    StartCountdown,
    /// Emoji overlay is live; swipes change the emoji
    Overlay,
    /// Counting down to the photo
    CaptureCountdown,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WaitingStartHand => "waiting-start-hand",
            Self::StartCountdown => "start-countdown",
            Self::Overlay => "overlay",
            Self::CaptureCountdown => "capture-countdown",
        }
    }

    /// Whether the emoji and hand overlays and the emoji picker are shown
    #[must_use]
    pub fn shows_overlay(&self) -> bool {
        matches!(self, Self::Overlay | Self::CaptureCountdown)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase with the timers that belong to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    WaitingStartHand,
    StartCountdown(Countdown),
    Overlay,
    CaptureCountdown(Countdown),
}

impl Phase {
    fn state(&self) -> SessionState {
        match self {
            Self::Idle => SessionState::Idle,
            Self::WaitingStartHand => SessionState::WaitingStartHand,
            Self::StartCountdown(_) => SessionState::StartCountdown,
            Self::Overlay => SessionState::Overlay,
            Self::CaptureCountdown(_) => SessionState::CaptureCountdown,
        }
    }
}

/// Timestamps of the last frame where the hand was not raised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownClock {
    pub last_lowered_for_start: u64,
    pub last_lowered_for_capture: u64,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A raise started the countdown to the overlay
    StartCountdownBegan,
    /// The start countdown finished and the overlay is live
    OverlayActivated,
    /// A swipe advanced the selection to this index
    EmojiChanged(usize),
    /// A raise started the capture countdown
    CaptureCountdownBegan,
    /// The capture countdown finished; take the photo now
    CaptureRequested,
}

/// What to display after a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInstructions {
    /// State after the tick
    pub state: SessionState,
    /// Countdown digit, or empty
    pub countdown: String,
    /// Instruction line, or empty
    pub instructions: &'static str,
    /// Emoji and hand overlays plus the emoji picker are visible
    pub show_overlay: bool,
    /// Index of the selected emoji
    pub selected_emoji: usize,
    /// Events raised during the tick, in order
    pub events: Vec<SessionEvent>,
}

impl RenderInstructions {
    #[must_use]
    pub fn capture_requested(&self) -> bool {
        self.events.contains(&SessionEvent::CaptureRequested)
    }
}

/// The booth session state machine
#[derive(Debug, Clone)]
pub struct SessionMachine {
    phase: Phase,
    cooldowns: CooldownClock,
    swipe: SwipeDetector,
    selected: usize,
    emoji_count: usize,
    raise_threshold: f64,
    countdown_ms: u64,
    raise_cooldown_ms: u64,
}

impl SessionMachine {
    /// Create a machine for a set of `emoji_count` emojis
    pub fn new(session: &SessionConfig, gesture: &GestureConfig, emoji_count: usize) -> Result<Self> {
        if emoji_count == 0 {
            return Err(Error::InvalidInput("Emoji set must not be empty".to_string()));
        }

        Ok(Self {
            phase: Phase::Idle,
            cooldowns: CooldownClock::default(),
            swipe: SwipeDetector::from_config(gesture),
            selected: 0,
            emoji_count,
            raise_threshold: gesture.raise_threshold,
            countdown_ms: session.countdown_ms,
            raise_cooldown_ms: session.raise_cooldown_ms,
        })
    }

    /// Begin a session. Only valid from Idle.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(Error::InvalidCommand(format!("start is only valid from idle, not {}", self.state())));
        }
        self.clear_session();
        self.phase = Phase::WaitingStartHand;
        info!("Session started; waiting for a raised hand");
        Ok(())
    }

    /// Return to Idle from any state and clear all session fields
    pub fn reset(&mut self) {
        if self.phase != Phase::Idle {
            info!("Session reset from {}", self.state());
        }
        self.phase = Phase::Idle;
        self.clear_session();
    }

    /// Pick an emoji directly. Only valid while the emoji picker is shown.
    pub fn select_emoji(&mut self, index: usize) -> Result<()> {
        if !self.state().shows_overlay() {
            return Err(Error::InvalidCommand(format!(
                "emoji selection is not available in {}",
                self.state()
            )));
        }
        if index >= self.emoji_count {
            return Err(Error::InvalidCommand(format!(
                "emoji index {index} out of range (0..{})",
                self.emoji_count
            )));
        }
        self.selected = index;
        Ok(())
    }

    /// Advance the machine by one frame
    pub fn tick(&mut self, snapshot: &DetectionSnapshot, now: u64) -> RenderInstructions {
        let mut events = Vec::new();
        let hand = snapshot.hand.as_ref();
        let raised = is_raised(hand, snapshot.face.as_ref(), self.raise_threshold);

        match self.phase {
            Phase::Idle => {}
            Phase::WaitingStartHand => {
                if raised && self.cooled_down(self.cooldowns.last_lowered_for_start, now) {
                    self.phase = Phase::StartCountdown(Countdown::start(now, self.countdown_ms));
                    events.push(SessionEvent::StartCountdownBegan);
                    info!("Hand raised; start countdown began");
                } else if !raised {
                    self.cooldowns.last_lowered_for_start = now;
                }
            }
            Phase::StartCountdown(countdown) => {
                if countdown.poll(now) == CountdownStatus::Elapsed {
                    self.swipe.clear_tracker();
                    self.phase = Phase::Overlay;
                    events.push(SessionEvent::OverlayActivated);
                    info!("Overlay active with emoji {}", self.selected);
                }
            }
            Phase::Overlay => {
                if self.swipe.update(hand, now) {
                    self.selected = (self.selected + 1) % self.emoji_count;
                    events.push(SessionEvent::EmojiChanged(self.selected));
                    debug!("Emoji changed to {}", self.selected);
                }

                if raised && self.cooled_down(self.cooldowns.last_lowered_for_capture, now) {
                    self.phase = Phase::CaptureCountdown(Countdown::start(now, self.countdown_ms));
                    events.push(SessionEvent::CaptureCountdownBegan);
                    info!("Hand raised; capture countdown began");
                } else if !raised {
                    self.cooldowns.last_lowered_for_capture = now;
                }
            }
            Phase::CaptureCountdown(countdown) => {
                if countdown.poll(now) == CountdownStatus::Elapsed {
                    self.cooldowns.last_lowered_for_capture = now;
                    self.phase = Phase::Idle;
                    events.push(SessionEvent::CaptureRequested);
                    info!("Capture countdown finished; capturing emoji {}", self.selected);
                }
            }
        }

        self.render(now, events)
    }

    fn cooled_down(&self, last_lowered: u64, now: u64) -> bool {
        now.saturating_sub(last_lowered) >= self.raise_cooldown_ms
    }

    fn render(&self, now: u64, events: Vec<SessionEvent>) -> RenderInstructions {
        let countdown = match self.phase {
            Phase::StartCountdown(c) | Phase::CaptureCountdown(c) => match c.poll(now) {
                CountdownStatus::Running(seconds) => seconds.to_string(),
                CountdownStatus::Elapsed => String::new(),
            },
            _ => String::new(),
        };
        let instructions = match self.phase {
            Phase::WaitingStartHand => INSTRUCTION_RAISE_TO_START,
            Phase::Overlay => INSTRUCTION_OVERLAY,
            _ => "",
        };
        let state = self.state();

        RenderInstructions {
            state,
            countdown,
            instructions,
            show_overlay: state.shows_overlay(),
            selected_emoji: self.selected,
            events,
        }
    }

    fn clear_session(&mut self) {
        self.cooldowns = CooldownClock::default();
        self.swipe.reset();
        self.selected = 0;
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.phase.state()
    }

    #[must_use]
    pub fn selected_emoji(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn emoji_count(&self) -> usize {
        self.emoji_count
    }

    #[must_use]
    pub fn cooldowns(&self) -> CooldownClock {
        self.cooldowns
    }

    #[must_use]
    pub fn swipe_tracker(&self) -> Option<SwipeTracker> {
        self.swipe.tracker()
    }

    /// Start time of the running countdown, if the current phase has one
    #[must_use]
    pub fn countdown_started_at(&self) -> Option<u64> {
        match self.phase {
            Phase::StartCountdown(c) | Phase::CaptureCountdown(c) => Some(c.started_at()),
            _ => None,
        }
    }
}
