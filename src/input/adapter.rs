//! Turns raw controller reads into debounced intent snapshots

use super::types::*;
use crate::settings::InputConfig;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const RESCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Anything that can report the current controller state
pub trait PadSource {
    /// Drain pending device events and return the current state,
    /// or `None` while no controller is connected.
    fn read(&mut self) -> Option<RawPadState>;

    /// Re-enumerate devices after a disconnect
    fn rescan(&mut self) {}
}

/// A backend that failed to initialise reads as permanently disconnected
impl<S: PadSource> PadSource for Option<S> {
    fn read(&mut self) -> Option<RawPadState> {
        self.as_mut()?.read()
    }

    fn rescan(&mut self) {
        if let Some(source) = self {
            source.rescan();
        }
    }
}

pub struct InputAdapter<S: PadSource> {
    source: S,
    config: InputConfig,
    connected: bool,
    held: IntentSet,
    last_press: [Option<Instant>; Intent::COUNT],
    last_rescan: Option<Instant>,
}

impl<S: PadSource> InputAdapter<S> {
    pub fn new(source: S, config: InputConfig) -> Self {
        Self {
            source,
            config,
            connected: false,
            held: IntentSet::EMPTY,
            last_press: [None; Intent::COUNT],
            last_rescan: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Read the controller once and build this frame's snapshot
    pub fn poll(&mut self, now: Instant) -> IntentSnapshot {
        let Some(raw) = self.source.read() else {
            return self.poll_disconnected(now);
        };

        let pressed = self.intents_from(&raw);
        let left_stick = raw.left_stick.with_deadzone(self.config.deadzone);
        let right_stick = raw.right_stick.with_deadzone(self.config.deadzone);

        if !self.connected {
            // Buttons already down at (re)connect are not fresh presses
            info!("Controller connected");
            self.connected = true;
            self.held = pressed;
            return IntentSnapshot {
                pressed,
                left_stick,
                right_stick,
                connected: true,
                connection: Some(ConnectionEvent::Connected),
                ..IntentSnapshot::default()
            };
        }

        let mut just_pressed = IntentSet::EMPTY;
        let mut just_released = IntentSet::EMPTY;
        for intent in Intent::ALL {
            let now_down = pressed.contains(intent);
            let was_down = self.held.contains(intent);
            if now_down && !was_down && self.accept_press(intent, now) {
                just_pressed.insert(intent);
            } else if !now_down && was_down {
                just_released.insert(intent);
            }
        }
        self.held = pressed;

        IntentSnapshot {
            pressed,
            just_pressed,
            just_released,
            left_stick,
            right_stick,
            connected: true,
            connection: None,
        }
    }

    fn poll_disconnected(&mut self, now: Instant) -> IntentSnapshot {
        let connection = if self.connected {
            info!("Controller disconnected");
            self.connected = false;
            self.held = IntentSet::EMPTY;
            self.last_press = [None; Intent::COUNT];
            Some(ConnectionEvent::Disconnected)
        } else {
            None
        };

        let due = self
            .last_rescan
            .map_or(true, |last| now.duration_since(last) >= RESCAN_INTERVAL);
        if due {
            debug!("Rescanning for controllers");
            self.last_rescan = Some(now);
            self.source.rescan();
        }

        IntentSnapshot {
            connection,
            ..IntentSnapshot::neutral(false)
        }
    }

    /// A fresh press counts only once the previous one is older than the debounce window
    fn accept_press(&mut self, intent: Intent, now: Instant) -> bool {
        let window = self.config.button_debounce();
        let slot = &mut self.last_press[intent.index()];
        let ready = slot.map_or(true, |last| now.duration_since(last) >= window);
        if ready {
            *slot = Some(now);
        }
        ready
    }

    /// D-pad and face buttons, or the left stick past the threshold
    fn intents_from(&self, raw: &RawPadState) -> IntentSet {
        let mut set: IntentSet = raw.buttons.iter().map(|b| b.intent()).collect();

        let stick = raw.left_stick.with_deadzone(self.config.deadzone);
        let threshold = self.config.stick_threshold;
        if stick.y >= threshold {
            set.insert(Intent::Up);
        }
        if stick.y <= -threshold {
            set.insert(Intent::Down);
        }
        if stick.x <= -threshold {
            set.insert(Intent::Left);
        }
        if stick.x >= threshold {
            set.insert(Intent::Right);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of reads; `None` entries are disconnects
    #[derive(Default)]
    struct ScriptedPad {
        pub frames: VecDeque<Option<RawPadState>>,
        pub rescans: usize,
    }

    impl ScriptedPad {
        pub fn new(frames: Vec<Option<RawPadState>>) -> Self {
            Self {
                frames: frames.into(),
                rescans: 0,
            }
        }
    }

    impl PadSource for ScriptedPad {
        fn read(&mut self) -> Option<RawPadState> {
            self.frames.pop_front().flatten()
        }

        fn rescan(&mut self) {
            self.rescans += 1;
        }
    }

    fn frame_ms(start: Instant, n: u64) -> Instant {
        start + Duration::from_millis(n * 16)
    }

    fn adapter(frames: Vec<Option<RawPadState>>) -> InputAdapter<ScriptedPad> {
        InputAdapter::new(ScriptedPad::new(frames), InputConfig::default())
    }

    #[test]
    fn test_first_read_connects_without_fresh_presses() {
        let mut input = adapter(vec![Some(RawPadState::pressed(&[PadButton::South]))]);
        let snap = input.poll(Instant::now());
        assert_eq!(snap.connection, Some(ConnectionEvent::Connected));
        assert!(snap.confirm());
        assert!(snap.just_pressed.is_empty());
    }

    #[test]
    fn test_just_pressed_fires_once_while_held() {
        let idle = RawPadState::default();
        let held = RawPadState::pressed(&[PadButton::South]);
        let mut input = adapter(vec![Some(idle.clone()), Some(held.clone()), Some(held.clone()), Some(held), Some(idle)]);
        let start = Instant::now();

        input.poll(frame_ms(start, 0));
        let pressed = input.poll(frame_ms(start, 1));
        assert!(pressed.just_pressed.contains(Intent::Confirm));

        let still = input.poll(frame_ms(start, 2));
        assert!(still.confirm());
        assert!(still.just_pressed.is_empty());
        input.poll(frame_ms(start, 3));

        let released = input.poll(frame_ms(start, 4));
        assert!(!released.confirm());
        assert!(released.just_released.contains(Intent::Confirm));
    }

    #[test]
    fn test_button_chatter_is_debounced() {
        let idle = RawPadState::default();
        let a = RawPadState::pressed(&[PadButton::South]);
        let mut input = adapter(vec![Some(idle.clone()), Some(a.clone()), Some(idle.clone()), Some(a.clone()), Some(idle), Some(a)]);
        let start = Instant::now();

        input.poll(start);
        assert!(input.poll(start + Duration::from_millis(16)).just_pressed.contains(Intent::Confirm));
        input.poll(start + Duration::from_millis(32));
        // Re-press 32ms after the first: inside the 120ms window
        assert!(input.poll(start + Duration::from_millis(48)).just_pressed.is_empty());
        input.poll(start + Duration::from_millis(150));
        assert!(input.poll(start + Duration::from_millis(200)).just_pressed.contains(Intent::Confirm));
    }

    #[test]
    fn test_stick_past_threshold_reads_as_direction() {
        let mut input = adapter(vec![
            Some(RawPadState::default()),
            Some(RawPadState::default().with_left_stick(0.3, 0.9)),
            Some(RawPadState::default().with_left_stick(-0.8, 0.1)),
            Some(RawPadState::default().with_left_stick(0.1, -0.1)),
        ]);
        let start = Instant::now();
        input.poll(start);

        let up = input.poll(frame_ms(start, 1));
        assert!(up.up());
        assert!(!up.right());
        assert_eq!(up.left_stick, StickPos::new(0.3, 0.9));

        let left = input.poll(frame_ms(start, 2));
        assert!(left.left());
        assert!(!left.up());
        assert_eq!(left.left_stick.y, 0.0);

        let centered = input.poll(frame_ms(start, 3));
        assert!(centered.pressed.is_empty());
        assert_eq!(centered.left_stick, StickPos::default());
    }

    #[test]
    fn test_dpad_or_stick_satisfy_direction() {
        let mut input = adapter(vec![
            Some(RawPadState::default()),
            Some(RawPadState::pressed(&[PadButton::DPadDown])),
        ]);
        let start = Instant::now();
        input.poll(start);
        assert!(input.poll(frame_ms(start, 1)).down());
    }

    #[test]
    fn test_disconnect_reads_neutral_and_rescans() {
        let held = RawPadState::pressed(&[PadButton::DPadUp, PadButton::South]);
        let mut input = adapter(vec![Some(held.clone()), Some(held), None, None, Some(RawPadState::default())]);
        let start = Instant::now();

        input.poll(start);
        assert!(input.poll(frame_ms(start, 1)).up());

        let gone = input.poll(frame_ms(start, 2));
        assert_eq!(gone.connection, Some(ConnectionEvent::Disconnected));
        assert!(!gone.connected);
        assert!(gone.pressed.is_empty());
        assert_eq!(gone.left_stick, StickPos::default());
        assert!(!input.is_connected());

        // Second disconnected frame inside the rescan interval
        let still_gone = input.poll(frame_ms(start, 3));
        assert_eq!(still_gone.connection, None);
        assert_eq!(input.source_mut().rescans, 1);

        let back = input.poll(frame_ms(start, 4));
        assert_eq!(back.connection, Some(ConnectionEvent::Connected));
        assert!(input.is_connected());
    }

    #[test]
    fn test_missing_backend_stays_disconnected() {
        let mut input = InputAdapter::new(None::<ScriptedPad>, InputConfig::default());
        let snapshot = input.poll(Instant::now());
        assert!(!snapshot.connected);
        assert_eq!(snapshot.connection, None);
    }
}
