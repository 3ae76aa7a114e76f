//! Physical controller source backed by gilrs

use super::adapter::PadSource;
use super::types::{PadButton, RawPadState, StickPos};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use tracing::{debug, info};

pub struct GilrsSource {
    gilrs: Gilrs,
    active: Option<GamepadId>,
}

impl GilrsSource {
    pub fn new() -> Result<Self, gilrs::Error> {
        let gilrs = Gilrs::new()?;
        for (id, pad) in gilrs.gamepads() {
            info!(id = %id, name = pad.name(), "Gamepad found");
        }
        Ok(Self { gilrs, active: None })
    }

    fn button(button: PadButton) -> Button {
        match button {
            PadButton::DPadUp => Button::DPadUp,
            PadButton::DPadDown => Button::DPadDown,
            PadButton::DPadLeft => Button::DPadLeft,
            PadButton::DPadRight => Button::DPadRight,
            PadButton::South => Button::South,
            PadButton::East => Button::East,
            PadButton::Start => Button::Start,
            PadButton::Select => Button::Select,
            PadButton::LeftBumper => Button::LeftTrigger,
            PadButton::RightBumper => Button::RightTrigger,
        }
    }
}

impl PadSource for GilrsSource {
    fn read(&mut self) -> Option<RawPadState> {
        // Drain events so gilrs keeps its cached state current
        while let Some(ev) = self.gilrs.next_event() {
            match ev.event {
                EventType::Connected => {
                    debug!(id = %ev.id, "Gamepad connected");
                    self.active.get_or_insert(ev.id);
                }
                EventType::Disconnected if self.active == Some(ev.id) => {
                    debug!(id = %ev.id, "Active gamepad disconnected");
                    self.active = None;
                }
                _ => {}
            }
        }

        let id = match self.active {
            Some(id) => id,
            None => {
                let (id, _) = self.gilrs.gamepads().next()?;
                self.active = Some(id);
                id
            }
        };
        let pad = self.gilrs.connected_gamepad(id)?;

        let buttons = PadButton::ALL
            .into_iter()
            .filter(|b| pad.is_pressed(Self::button(*b)))
            .collect();

        Some(RawPadState {
            buttons,
            left_stick: StickPos::new(pad.value(Axis::LeftStickX), pad.value(Axis::LeftStickY)),
            right_stick: StickPos::new(pad.value(Axis::RightStickX), pad.value(Axis::RightStickY)),
        })
    }

    fn rescan(&mut self) {
        self.active = None;
    }
}
