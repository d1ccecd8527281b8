//! Session state machine behavior across whole sessions


use emoji_booth::constants::{INSTRUCTION_OVERLAY, INSTRUCTION_RAISE_TO_START};
use emoji_booth::detection::DetectionSnapshot;
use emoji_booth::session::{CooldownClock, SessionEvent, SessionMachine, SessionState};
use emoji_booth::Error;
use test_helpers::{lowered, lowered_at, machine, raised};

/// Drive a fresh machine into `target`; returns the machine and current time
fn machine_in(target: SessionState) -> (SessionMachine, u64) {
    let mut m = machine(20);
    if target == SessionState::Idle {
        return (m, 0);
    }

    m.start().unwrap();
    m.tick(&lowered(), 0);
    if target == SessionState::WaitingStartHand {
        return (m, 0);
    }

    m.tick(&raised(), 2000);
    if target == SessionState::StartCountdown {
        return (m, 2000);
    }

    m.tick(&lowered(), 5000);
    m.tick(&lowered_at(0.2), 5100);
    if target == SessionState::Overlay {
        return (m, 5100);
    }

    m.tick(&raised(), 7200);
    assert_eq!(m.state(), SessionState::CaptureCountdown);
    (m, 7200)
}

#[test]
fn test_start_countdown_display_and_single_exit() {
    let mut m = machine(20);
    m.start().unwrap();
    m.tick(&lowered(), 0);

    let render = m.tick(&raised(), 2000);
    assert_eq!(render.events, vec![SessionEvent::StartCountdownBegan]);

    for (offset, expected) in [(0, "3"), (999, "3"), (1000, "2"), (1999, "2"), (2000, "1"), (2999, "1")] {
        let render = m.tick(&raised(), 2000 + offset);
        assert_eq!(render.state, SessionState::StartCountdown);
        assert_eq!(render.countdown, expected, "offset {offset}");
        assert!(render.events.is_empty());
    }

    let render = m.tick(&raised(), 5000);
    assert_eq!(render.state, SessionState::Overlay);
    assert_eq!(render.events, vec![SessionEvent::OverlayActivated]);
    assert!(render.countdown.is_empty());

    // Further ticks past the deadline never repeat the exit action
    for t in [5000, 5001, 5002, 6000] {
        let render = m.tick(&lowered(), t);
        assert!(!render.events.contains(&SessionEvent::OverlayActivated));
    }
}

#[test]
fn test_capture_requested_exactly_once() {
    let (mut m, _) = machine_in(SessionState::CaptureCountdown);
    let started = m.countdown_started_at().unwrap();

    assert_eq!(m.tick(&raised(), started + 2999).countdown, "1");

    let mut captures = 0;
    for t in started + 3000..started + 3010 {
        let render = m.tick(&raised(), t);
        captures += render.events.iter().filter(|e| **e == SessionEvent::CaptureRequested).count();
    }
    assert_eq!(captures, 1);
    assert_eq!(m.state(), SessionState::Idle);
    assert_eq!(m.cooldowns().last_lowered_for_capture, started + 3000);
}

#[test]
fn test_late_tick_still_fires_once() {
    let (mut m, _) = machine_in(SessionState::CaptureCountdown);
    let started = m.countdown_started_at().unwrap();

    // A frame stall skips past the deadline entirely
    let render = m.tick(&lowered(), started + 10_000);
    assert!(render.capture_requested());
    assert!(!m.tick(&lowered(), started + 10_001).capture_requested());
}

#[test]
fn test_raise_cooldown_boundary() {
    let mut m = machine(20);
    m.start().unwrap();
    m.tick(&lowered(), 0);

    let render = m.tick(&raised(), 1999);
    assert_eq!(render.state, SessionState::WaitingStartHand);

    let render = m.tick(&raised(), 2001);
    assert_eq!(render.state, SessionState::StartCountdown);
}

#[test]
fn test_continuous_raise_does_not_retrigger_capture() {
    let (mut m, now) = machine_in(SessionState::Overlay);
    // Raise too soon after lowering
    let render = m.tick(&raised(), now + 500);
    assert_eq!(render.state, SessionState::Overlay);
    // Held raise does not refresh the lowered clock, so it eventually counts
    let render = m.tick(&raised(), now + 2000);
    assert_eq!(render.state, SessionState::CaptureCountdown);
}

#[test]
fn test_hand_held_through_start_countdown_starts_capture_at_once() {
    let mut m = machine(20);
    m.start().unwrap();
    m.tick(&lowered(), 0);
    m.tick(&raised(), 2000);

    let render = m.tick(&raised(), 5000);
    assert_eq!(render.state, SessionState::Overlay);
    assert_eq!(m.cooldowns().last_lowered_for_capture, 0);

    // The capture clock was never refreshed, so the held raise counts immediately
    let render = m.tick(&raised(), 5033);
    assert_eq!(render.state, SessionState::CaptureCountdown);
    assert_eq!(render.events, vec![SessionEvent::CaptureCountdownBegan]);
    assert_eq!(render.countdown, "3");
}

#[test]
fn test_start_and_capture_cooldowns_are_independent() {
    let (m, _) = machine_in(SessionState::Overlay);
    let clocks = m.cooldowns();
    assert_eq!(clocks.last_lowered_for_start, 0);
    assert_eq!(clocks.last_lowered_for_capture, 5100);
}

#[test]
fn test_reset_from_every_state() {
    for state in [
        SessionState::Idle,
        SessionState::WaitingStartHand,
        SessionState::StartCountdown,
        SessionState::Overlay,
        SessionState::CaptureCountdown,
    ] {
        let (mut m, now) = machine_in(state);
        assert_eq!(m.state(), state);

        m.reset();
        assert_eq!(m.state(), SessionState::Idle, "reset from {state}");
        assert_eq!(m.cooldowns(), CooldownClock::default());
        assert!(m.swipe_tracker().is_none());
        assert!(m.countdown_started_at().is_none());
        assert_eq!(m.selected_emoji(), 0);

        // Idle stays inert afterwards
        let render = m.tick(&raised(), now + 10_000);
        assert_eq!(render.state, SessionState::Idle);
        assert!(render.events.is_empty());
    }
}

#[test]
fn test_swipe_advances_selection() {
    let (mut m, _) = machine_in(SessionState::Overlay);
    // Tracker anchored at x=0.2, t=5100
    let render = m.tick(&lowered_at(0.32), 5600);
    assert_eq!(render.events, vec![SessionEvent::EmojiChanged(1)]);
    assert_eq!(render.selected_emoji, 1);
    assert!(m.swipe_tracker().is_none());
}

#[test]
fn test_swipe_wraps_around() {
    let (mut m, _) = machine_in(SessionState::Overlay);
    m.select_emoji(19).unwrap();
    let render = m.tick(&lowered_at(0.32), 5600);
    assert_eq!(render.selected_emoji, 0);
    assert_eq!(render.events, vec![SessionEvent::EmojiChanged(0)]);
}

#[test]
fn test_no_swipes_outside_overlay() {
    let mut m = machine(20);
    m.start().unwrap();
    m.tick(&lowered_at(0.2), 0);
    m.tick(&lowered_at(0.5), 500);
    assert_eq!(m.selected_emoji(), 0);
    assert!(m.swipe_tracker().is_none());
}

#[test]
fn test_instructions_and_overlay_visibility() {
    let expectations = [
        (SessionState::Idle, "", false),
        (SessionState::WaitingStartHand, INSTRUCTION_RAISE_TO_START, false),
        (SessionState::StartCountdown, "", false),
        (SessionState::Overlay, INSTRUCTION_OVERLAY, true),
        (SessionState::CaptureCountdown, "", true),
    ];

    for (state, instructions, overlay) in expectations {
        let (mut m, now) = machine_in(state);
        let render = m.tick(&DetectionSnapshot::default(), now);
        assert_eq!(render.state, state);
        assert_eq!(render.instructions, instructions, "{state}");
        assert_eq!(render.show_overlay, overlay, "{state}");
    }
}

#[test]
fn test_select_emoji_rules() {
    let (mut m, _) = machine_in(SessionState::WaitingStartHand);
    assert!(matches!(m.select_emoji(3), Err(Error::InvalidCommand(_))));

    let (mut m, _) = machine_in(SessionState::CaptureCountdown);
    m.select_emoji(3).unwrap();
    assert_eq!(m.selected_emoji(), 3);
    assert!(matches!(m.select_emoji(20), Err(Error::InvalidCommand(_))));
    assert_eq!(m.selected_emoji(), 3);
}

#[test]
fn test_start_clears_previous_session() {
    let (mut m, _) = machine_in(SessionState::CaptureCountdown);
    m.select_emoji(7).unwrap();
    let started = m.countdown_started_at().unwrap();
    m.tick(&lowered(), started + 3000);
    assert_eq!(m.state(), SessionState::Idle);
    assert_eq!(m.selected_emoji(), 7);

    m.start().unwrap();
    assert_eq!(m.state(), SessionState::WaitingStartHand);
    assert_eq!(m.selected_emoji(), 0);
    assert_eq!(m.cooldowns(), CooldownClock::default());
}
