//! Side-effect ports: visual focus and haptic feedback

use super::types::{FocusHandle, HapticPattern, RegionKey};

/// Maps cursor positions to render nodes and moves visual focus
pub trait FocusRegistry {
    fn register(&mut self, region: RegionKey, index: usize) -> FocusHandle;
    /// Bring the element into view, centered
    fn scroll_into_view(&mut self, handle: FocusHandle);
    fn request_focus(&mut self, handle: FocusHandle);
}

/// Best-effort controller rumble
pub trait Haptics {
    fn vibrate(&self, pattern: HapticPattern, intensity: f32);
}

/// Registry for headless use: hands out handles, draws nothing
#[derive(Debug, Default)]
pub struct NullFocusRegistry;

impl FocusRegistry for NullFocusRegistry {
    fn register(&mut self, region: RegionKey, index: usize) -> FocusHandle {
        FocusHandle { region, index }
    }

    fn scroll_into_view(&mut self, _handle: FocusHandle) {}

    fn request_focus(&mut self, _handle: FocusHandle) {}
}

#[derive(Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self, _pattern: HapticPattern, _intensity: f32) {}
}

/// Ports handed to a screen machine for one input
pub struct NavPorts<'a> {
    pub focus: &'a mut dyn FocusRegistry,
    pub haptics: &'a dyn Haptics,
}

impl<'a> NavPorts<'a> {
    pub fn new(focus: &'a mut dyn FocusRegistry, haptics: &'a dyn Haptics) -> Self {
        Self { focus, haptics }
    }

    /// Scroll to and focus the element at `region[index]`
    pub fn focus_element(&mut self, region: RegionKey, index: usize) {
        let handle = self.focus.register(region, index);
        self.focus.scroll_into_view(handle);
        self.focus.request_focus(handle);
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::cell::RefCell;

    /// Records every focus request
    #[derive(Debug, Default)]
    pub(crate) struct RecordingFocus {
        pub focused: Vec<FocusHandle>,
        pub scrolled: Vec<FocusHandle>,
    }

    impl RecordingFocus {
        pub fn last(&self) -> Option<FocusHandle> {
            self.focused.last().copied()
        }
    }

    impl FocusRegistry for RecordingFocus {
        fn register(&mut self, region: RegionKey, index: usize) -> FocusHandle {
            FocusHandle { region, index }
        }

        fn scroll_into_view(&mut self, handle: FocusHandle) {
            self.scrolled.push(handle);
        }

        fn request_focus(&mut self, handle: FocusHandle) {
            self.focused.push(handle);
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingHaptics {
        pub pulses: RefCell<Vec<HapticPattern>>,
    }

    impl Haptics for RecordingHaptics {
        fn vibrate(&self, pattern: HapticPattern, _intensity: f32) {
            self.pulses.borrow_mut().push(pattern);
        }
    }
}
