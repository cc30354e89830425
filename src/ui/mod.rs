//! User interface subsystem - physical buttons + status LEDs.
//!
//! ## Components
//!
//! - **Buttons**: 4 tactile switches with debouncing; each press becomes a
//!   button notification through the [`input::InputAdapter`].
//! - **LEDs**: LED1 blinks while the firmware runs, LED2 shows whether a
//!   central is connected.

pub mod input;

#[cfg(feature = "embedded")]
pub mod buttons;
#[cfg(feature = "embedded")]
pub mod leds;

/// Output showing whether a central is connected.
pub trait StatusIndicator {
    fn set_connected(&self, connected: bool);
}

/// Debounced button state change as reported by the input driver.
///
/// Bit `n` of each mask stands for button `n + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonChange {
    /// Buttons currently held down.
    pub state: u32,
    /// Buttons whose state changed in this event.
    pub changed: u32,
}
