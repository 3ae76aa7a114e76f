//! Raw controller state and the normalized intent snapshot built from it

/// Physical buttons the adapter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    South, // A / Cross
    East,  // B / Circle
    Start,
    Select,
    LeftBumper,
    RightBumper,
}

impl PadButton {
    pub const ALL: [PadButton; 10] = [
        PadButton::DPadUp,
        PadButton::DPadDown,
        PadButton::DPadLeft,
        PadButton::DPadRight,
        PadButton::South,
        PadButton::East,
        PadButton::Start,
        PadButton::Select,
        PadButton::LeftBumper,
        PadButton::RightBumper,
    ];

    pub fn intent(self) -> Intent {
        match self {
            PadButton::DPadUp => Intent::Up,
            PadButton::DPadDown => Intent::Down,
            PadButton::DPadLeft => Intent::Left,
            PadButton::DPadRight => Intent::Right,
            PadButton::South => Intent::Confirm,
            PadButton::East => Intent::Cancel,
            PadButton::Start => Intent::Menu,
            PadButton::Select => Intent::Back,
            PadButton::LeftBumper => Intent::LeftBumper,
            PadButton::RightBumper => Intent::RightBumper,
        }
    }
}

/// Analog stick position, each axis in [-1, 1], +y is up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickPos {
    pub x: f32,
    pub y: f32,
}

impl StickPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero each axis whose magnitude is under `deadzone`
    pub fn with_deadzone(self, deadzone: f32) -> Self {
        let cut = |v: f32| if v.is_finite() && v.abs() >= deadzone { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            x: cut(self.x),
            y: cut(self.y),
        }
    }
}

/// One read of the controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPadState {
    pub buttons: Vec<PadButton>,
    pub left_stick: StickPos,
    pub right_stick: StickPos,
}

impl RawPadState {
    pub fn pressed(buttons: &[PadButton]) -> Self {
        Self {
            buttons: buttons.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_left_stick(mut self, x: f32, y: f32) -> Self {
        self.left_stick = StickPos::new(x, y);
        self
    }

    pub fn is_pressed(&self, button: PadButton) -> bool {
        self.buttons.contains(&button)
    }
}

/// Normalized navigation intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Menu,
    Back,
    LeftBumper,
    RightBumper,
}

impl Intent {
    pub const COUNT: usize = 10;
    pub const ALL: [Intent; Self::COUNT] = [
        Intent::Up,
        Intent::Down,
        Intent::Left,
        Intent::Right,
        Intent::Confirm,
        Intent::Cancel,
        Intent::Menu,
        Intent::Back,
        Intent::LeftBumper,
        Intent::RightBumper,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Small set of intents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentSet(u16);

impl IntentSet {
    pub const EMPTY: IntentSet = IntentSet(0);

    pub fn insert(&mut self, intent: Intent) {
        self.0 |= intent.bit();
    }

    pub fn remove(&mut self, intent: Intent) {
        self.0 &= !intent.bit();
    }

    pub fn contains(self, intent: Intent) -> bool {
        self.0 & intent.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Intent> {
        Intent::ALL.into_iter().filter(move |i| self.contains(*i))
    }
}

impl FromIterator<Intent> for IntentSet {
    fn from_iter<T: IntoIterator<Item = Intent>>(iter: T) -> Self {
        let mut set = IntentSet::EMPTY;
        for intent in iter {
            set.insert(intent);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
}

/// Per-frame summary of the controller consumed by navigation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntentSnapshot {
    /// Intents active this frame (held buttons or deflected stick)
    pub pressed: IntentSet,
    /// Pressed this frame but not the previous one, after button debounce
    pub just_pressed: IntentSet,
    pub just_released: IntentSet,
    pub left_stick: StickPos,
    pub right_stick: StickPos,
    pub connected: bool,
    /// Connection change observed on this frame
    pub connection: Option<ConnectionEvent>,
}

impl IntentSnapshot {
    /// All intents false, sticks centered
    pub fn neutral(connected: bool) -> Self {
        Self {
            connected,
            ..Self::default()
        }
    }

    pub fn up(&self) -> bool {
        self.pressed.contains(Intent::Up)
    }
    pub fn down(&self) -> bool {
        self.pressed.contains(Intent::Down)
    }
    pub fn left(&self) -> bool {
        self.pressed.contains(Intent::Left)
    }
    pub fn right(&self) -> bool {
        self.pressed.contains(Intent::Right)
    }
    pub fn confirm(&self) -> bool {
        self.pressed.contains(Intent::Confirm)
    }
    pub fn cancel(&self) -> bool {
        self.pressed.contains(Intent::Cancel)
    }
    pub fn menu(&self) -> bool {
        self.pressed.contains(Intent::Menu)
    }
    pub fn back(&self) -> bool {
        self.pressed.contains(Intent::Back)
    }
    pub fn left_bumper(&self) -> bool {
        self.pressed.contains(Intent::LeftBumper)
    }
    pub fn right_bumper(&self) -> bool {
        self.pressed.contains(Intent::RightBumper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_set_membership() {
        let mut set: IntentSet = [Intent::Up, Intent::Confirm].into_iter().collect();
        assert!(set.contains(Intent::Up));
        assert!(!set.contains(Intent::Down));

        set.remove(Intent::Up);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Intent::Confirm]);
    }

    #[test]
    fn test_deadzone_zeroes_small_axes() {
        let stick = StickPos::new(0.1, -0.7).with_deadzone(0.18);
        assert_eq!(stick, StickPos::new(0.0, -0.7));
        assert_eq!(StickPos::new(f32::NAN, 2.0).with_deadzone(0.2), StickPos::new(0.0, 1.0));
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(PadButton::South.intent(), Intent::Confirm);
        assert_eq!(PadButton::East.intent(), Intent::Cancel);
        assert_eq!(PadButton::Start.intent(), Intent::Menu);
        assert_eq!(PadButton::RightBumper.intent(), Intent::RightBumper);
    }
}
